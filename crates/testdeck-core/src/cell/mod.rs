//! Cell-related types
//!
//! This module contains:
//! - [`CellValue`] - The typed value stored in a cell
//! - [`CellAddress`] - A cell's location (e.g., "A1")
//! - [`Cell`] - A value together with the number format it is displayed with

mod address;
mod value;

pub use address::CellAddress;
pub use value::{Cell, CellValue};
