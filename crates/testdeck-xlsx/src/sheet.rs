//! Parsed worksheet contents

use std::collections::BTreeMap;

use testdeck_core::{Cell, CellValue};

/// A worksheet: the rows present in its `sheetData`, keyed by 0-based index.
///
/// Rows and cells that never appeared in the file are absent, not empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    name: String,
    rows: BTreeMap<u32, Row>,
}

impl Sheet {
    /// Create an empty sheet
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            rows: BTreeMap::new(),
        }
    }

    /// Sheet name as listed in the workbook
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a row by 0-based index
    pub fn row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Get a row, creating it if absent
    pub fn row_mut(&mut self, index: u32) -> &mut Row {
        self.rows.entry(index).or_insert_with(|| Row::new(index))
    }

    /// Present rows in ascending order
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.values()
    }

    /// Index of the last present row, `None` for a sheet without rows
    pub fn last_row_index(&self) -> Option<u32> {
        self.rows.keys().next_back().copied()
    }

    /// Number of present rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get a cell by 0-based coordinates
    pub fn cell(&self, row: u32, col: u16) -> Option<&Cell> {
        self.row(row).and_then(|r| r.cell(col))
    }

    /// Set a cell value, creating the row if needed
    pub fn set_cell(&mut self, row: u32, col: u16, cell: Cell) {
        self.row_mut(row).set_cell(col, cell);
    }
}

/// A present row and its present cells
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    index: u32,
    cells: BTreeMap<u16, Cell>,
}

impl Row {
    /// Create an empty row
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: BTreeMap::new(),
        }
    }

    /// 0-based row index
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Get a cell by 0-based column index
    pub fn cell(&self, col: u16) -> Option<&Cell> {
        self.cells.get(&col)
    }

    /// Get a cell value by column, `Empty` when the cell is absent
    pub fn value(&self, col: u16) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.cells.get(&col).map(|c| &c.value).unwrap_or(&EMPTY)
    }

    /// Present cells in column order
    pub fn cells(&self) -> impl Iterator<Item = (u16, &Cell)> {
        self.cells.iter().map(|(col, cell)| (*col, cell))
    }

    /// Index of the last present cell
    pub fn last_col_index(&self) -> Option<u16> {
        self.cells.keys().next_back().copied()
    }

    /// True when the row element carried no cells
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Set a cell
    pub fn set_cell(&mut self, col: u16, cell: Cell) {
        self.cells.insert(col, cell);
    }
}
