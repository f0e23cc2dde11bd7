//! Spreadsheet serial dates
//!
//! Workbooks store dates as serial numbers: whole days since a base date plus
//! a fractional day for the time. The 1900 system keeps Lotus 1-2-3's
//! fictional 1900-02-29 at serial 60.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Base date system of a workbook (`workbookPr/@date1904`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateSystem {
    /// Serial 1 is 1900-01-01
    #[default]
    V1900,
    /// Serial 0 is 1904-01-01
    V1904,
}

impl DateSystem {
    /// Convert a serial number to a date-time.
    ///
    /// Returns `None` for negative or non-finite serials and for values past
    /// the end of chrono's range. The time of day is rounded to the nearest
    /// millisecond.
    pub fn to_datetime(self, serial: f64) -> Option<NaiveDateTime> {
        if !serial.is_finite() || serial < 0.0 {
            return None;
        }

        let whole_days = serial.trunc() as i64;
        let millis = ((serial - serial.trunc()) * MILLIS_PER_DAY).round() as i64;

        let base = match self {
            DateSystem::V1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
            // Serials below 61 sit before the phantom leap day
            DateSystem::V1900 if whole_days < 61 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
            DateSystem::V1900 => NaiveDate::from_ymd_opt(1899, 12, 30)?,
        };

        let date = base.checked_add_signed(Duration::days(whole_days))?;
        date.and_hms_opt(0, 0, 0)?
            .checked_add_signed(Duration::milliseconds(millis))
    }
}
