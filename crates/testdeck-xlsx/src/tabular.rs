//! Header-keyed access to sheet data for data-driven tests
//!
//! Every call opens the workbook, reads what it needs and closes the file
//! again; nothing is cached between calls.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use log::{error, warn};
use testdeck_core::{CellFormatter, TabularRow, DEFAULT_DATE_FORMAT};

use crate::error::{XlsxError, XlsxResult};
use crate::reader::XlsxWorkbook;
use crate::sheet::Sheet;

/// Options for reading tabular data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// chrono format string for date-formatted numeric cells
    pub date_format: String,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl ReadOptions {
    /// Set the date format
    pub fn with_date_format<S: Into<String>>(mut self, format: S) -> Self {
        self.date_format = format.into();
        self
    }
}

/// Reads sheets of an `.xlsx` file as rows of strings keyed by the header row.
#[derive(Debug, Clone)]
pub struct TabularDataReader {
    path: PathBuf,
    options: ReadOptions,
}

impl TabularDataReader {
    /// Reader for the workbook at `path` with default options
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self::with_options(path, ReadOptions::default())
    }

    /// Reader for the workbook at `path`
    pub fn with_options<P: Into<PathBuf>>(path: P, options: ReadOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Workbook path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read options
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> XlsxResult<Vec<String>> {
        Ok(XlsxWorkbook::open(&self.path)?.sheet_names())
    }

    /// Read every data row of `sheet_name`.
    ///
    /// Never fails: an unreadable file or a missing sheet is logged and
    /// yields an empty vector. Use [`try_read_sheet`](Self::try_read_sheet)
    /// to see the error.
    pub fn read_sheet(&self, sheet_name: &str) -> Vec<TabularRow> {
        match self.try_read_sheet(sheet_name) {
            Ok(Some(rows)) => rows,
            Ok(None) => {
                warn!(
                    "Sheet '{}' not found in '{}'",
                    sheet_name,
                    self.path.display()
                );
                Vec::new()
            }
            Err(e) => {
                error!("Error reading Excel file '{}': {}", self.path.display(), e);
                Vec::new()
            }
        }
    }

    /// Read every data row of `sheet_name`, surfacing errors.
    ///
    /// `Ok(None)` means the workbook has no sheet with that name.
    pub fn try_read_sheet(&self, sheet_name: &str) -> XlsxResult<Option<Vec<TabularRow>>> {
        let mut workbook = XlsxWorkbook::open(&self.path)?;
        let formatter = self.formatter(&workbook);

        Ok(workbook
            .read_sheet(sheet_name)?
            .map(|sheet| rows_from_sheet(&sheet, &formatter)))
    }

    /// Read one cell as a string by 0-based coordinates.
    ///
    /// A workbook that cannot be opened is logged and reads as `""`, as does
    /// an absent cell inside a present row. A missing sheet or row is an
    /// error.
    pub fn read_cell(&self, sheet_name: &str, row: u32, col: u16) -> XlsxResult<String> {
        let mut workbook = match XlsxWorkbook::open(&self.path) {
            Ok(workbook) => workbook,
            Err(e) => {
                error!("Error reading cell from '{}': {}", self.path.display(), e);
                return Ok(String::new());
            }
        };
        let formatter = self.formatter(&workbook);

        let sheet = workbook
            .read_sheet(sheet_name)?
            .ok_or_else(|| XlsxError::SheetNotFound(sheet_name.to_string()))?;
        let row_data = sheet.row(row).ok_or_else(|| XlsxError::RowNotFound {
            sheet: sheet_name.to_string(),
            row,
        })?;

        Ok(formatter.format_opt(row_data.cell(col)))
    }

    fn formatter<R: Read + Seek>(&self, workbook: &XlsxWorkbook<R>) -> CellFormatter {
        CellFormatter::new(workbook.date_system())
            .with_date_format(self.options.date_format.clone())
    }
}

/// Turn a parsed sheet into header-keyed rows.
///
/// Row 0 is the header. Each present header cell names its column; data
/// cells are matched to headers by column position, and a data row without a
/// cell in a header's column gets `""` there. Rows absent from the sheet
/// produce nothing.
pub fn rows_from_sheet(sheet: &Sheet, formatter: &CellFormatter) -> Vec<TabularRow> {
    let Some(header_row) = sheet.row(0) else {
        warn!("No header row found in sheet '{}'", sheet.name());
        return Vec::new();
    };

    let headers: Vec<(u16, String)> = header_row
        .cells()
        .map(|(col, cell)| (col, formatter.format(cell)))
        .collect();

    sheet
        .rows()
        .filter(|row| row.index() > 0)
        .map(|row| {
            let mut record = TabularRow::with_capacity(headers.len());
            for (col, header) in &headers {
                record.insert(header.clone(), formatter.format_opt(row.cell(*col)));
            }
            record
        })
        .collect()
}
