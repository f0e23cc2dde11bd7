//! Worksheet part parsing (`xl/worksheets/sheetN.xml`)

use std::collections::HashMap;
use std::io::{BufReader, Read};

use log::{debug, warn};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use testdeck_core::{Cell, CellAddress, CellValue, NumberFormat};

use super::decode_excel_escapes;
use crate::error::{XlsxError, XlsxResult};
use crate::formula::shift_formula;
use crate::sheet::Sheet;

/// Attributes and collected text of the `<c>` element being parsed
#[derive(Default)]
struct PendingCell {
    row: u32,
    col: u16,
    cell_type: Option<String>,
    style: Option<u32>,
    value: Option<String>,
    formula: Option<String>,
    shared_index: Option<u32>,
    shared_anchor: bool,
}

/// The anchor of a shared formula block
struct SharedFormula {
    text: String,
    row: u32,
    col: u16,
}

/// Parse one worksheet part into a [`Sheet`]
pub(super) fn read_worksheet<R: Read>(
    reader: R,
    name: String,
    shared_strings: &[String],
    cell_formats: &[NumberFormat],
) -> XlsxResult<Sheet> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));

    let mut sheet = Sheet::new(name);
    let mut buf = Vec::new();
    let mut shared_formulas: HashMap<u32, SharedFormula> = HashMap::new();

    // Position bookkeeping for rows/cells that omit their `r` attribute
    let mut next_row: u32 = 0;
    let mut current_row: u32 = 0;
    let mut next_col: u16 = 0;

    let mut pending: Option<PendingCell> = None;
    let mut in_value = false;
    let mut in_formula = false;
    let mut in_inline_str = false;
    let mut in_inline_text = false;
    let mut in_phonetic = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = row_index(&e)?.unwrap_or(next_row);
                    next_row = current_row + 1;
                    next_col = 0;
                    sheet.row_mut(current_row);
                }
                b"c" => {
                    let cell = start_cell(&e, current_row, next_col)?;
                    next_col = cell.col.saturating_add(1);
                    pending = Some(cell);
                }
                b"v" if pending.is_some() => in_value = true,
                b"f" => {
                    if let Some(cell) = pending.as_mut() {
                        read_formula_attrs(&e, cell);
                        in_formula = true;
                    }
                }
                b"is" if pending.is_some() => in_inline_str = true,
                b"rPh" if in_inline_str => in_phonetic = true,
                b"t" if in_inline_str && !in_phonetic => in_inline_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    current_row = row_index(&e)?.unwrap_or(next_row);
                    next_row = current_row + 1;
                    sheet.row_mut(current_row);
                }
                b"c" => {
                    let cell = start_cell(&e, current_row, next_col)?;
                    next_col = cell.col.saturating_add(1);
                    finish_cell(
                        &mut sheet,
                        cell,
                        shared_strings,
                        cell_formats,
                        &mut shared_formulas,
                    )?;
                }
                b"f" => {
                    if let Some(cell) = pending.as_mut() {
                        read_formula_attrs(&e, cell);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(cell) = pending.take() {
                        finish_cell(
                            &mut sheet,
                            cell,
                            shared_strings,
                            cell_formats,
                            &mut shared_formulas,
                        )?;
                    }
                    in_value = false;
                    in_formula = false;
                    in_inline_str = false;
                }
                b"v" => in_value = false,
                b"f" => in_formula = false,
                b"is" => in_inline_str = false,
                b"rPh" => in_phonetic = false,
                b"t" => in_inline_text = false,
                _ => {}
            },
            Ok(Event::Text(e)) if in_value || in_formula || in_inline_text => {
                let text = e.unescape()?;
                if let Some(cell) = pending.as_mut() {
                    let slot = if in_formula {
                        &mut cell.formula
                    } else {
                        &mut cell.value
                    };
                    slot.get_or_insert_with(String::new).push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheet)
}

/// 0-based index from a `<row r="N">` attribute, if present
fn row_index(e: &BytesStart<'_>) -> XlsxResult<Option<u32>> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"r" {
            let value = attr.unescape_value()?;
            let r: u32 = value
                .parse()
                .map_err(|_| XlsxError::Parse(format!("Invalid row number '{}'", value)))?;
            if r == 0 {
                return Err(XlsxError::Parse("Row number 0".into()));
            }
            return Ok(Some(r - 1));
        }
    }
    Ok(None)
}

fn start_cell(e: &BytesStart<'_>, current_row: u32, next_col: u16) -> XlsxResult<PendingCell> {
    let mut cell = PendingCell {
        row: current_row,
        col: next_col,
        ..Default::default()
    };

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"r" => {
                let cell_ref = attr.unescape_value()?;
                let addr = CellAddress::parse(&cell_ref).map_err(|e| {
                    XlsxError::Parse(format!("Invalid cell reference '{}': {}", cell_ref, e))
                })?;
                cell.row = addr.row;
                cell.col = addr.col;
            }
            b"t" => {
                cell.cell_type = attr.unescape_value().ok().map(|s| s.to_string());
            }
            b"s" => {
                cell.style = attr.unescape_value().ok().and_then(|s| s.parse().ok());
            }
            _ => {}
        }
    }

    Ok(cell)
}

fn read_formula_attrs(e: &BytesStart<'_>, cell: &mut PendingCell) {
    let mut is_shared = false;
    let mut has_ref = false;
    let mut si = None;

    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"t" => is_shared = attr.unescape_value().map_or(false, |v| v == "shared"),
            b"ref" => has_ref = true,
            b"si" => si = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            _ => {}
        }
    }

    if is_shared {
        cell.shared_index = si;
        cell.shared_anchor = has_ref;
    }
}

fn finish_cell(
    sheet: &mut Sheet,
    cell: PendingCell,
    shared_strings: &[String],
    cell_formats: &[NumberFormat],
    shared_formulas: &mut HashMap<u32, SharedFormula>,
) -> XlsxResult<()> {
    let formula = resolve_formula(&cell, shared_formulas);

    let value = match formula {
        Some(text) => CellValue::formula(text),
        None => match cell.value.as_deref() {
            Some(raw) => convert_value(cell.cell_type.as_deref(), raw, shared_strings)?,
            None => CellValue::Empty,
        },
    };

    let format = match cell.style {
        Some(idx) => cell_formats.get(idx as usize).cloned().unwrap_or_else(|| {
            debug!("Style index {} out of bounds, using General", idx);
            NumberFormat::General
        }),
        None => NumberFormat::General,
    };

    sheet.set_cell(cell.row, cell.col, Cell::with_format(value, format));
    Ok(())
}

/// Formula text for the cell, expanding shared formulas
fn resolve_formula(
    cell: &PendingCell,
    shared_formulas: &mut HashMap<u32, SharedFormula>,
) -> Option<String> {
    let text = cell.formula.as_deref().filter(|f| !f.is_empty());

    match (cell.shared_index, text) {
        (Some(si), Some(text)) if cell.shared_anchor => {
            shared_formulas.insert(
                si,
                SharedFormula {
                    text: text.to_string(),
                    row: cell.row,
                    col: cell.col,
                },
            );
            Some(text.to_string())
        }
        (Some(si), None) => match shared_formulas.get(&si) {
            Some(anchor) => Some(shift_formula(
                &anchor.text,
                cell.row as i64 - anchor.row as i64,
                cell.col as i64 - anchor.col as i64,
            )),
            None => {
                warn!(
                    "Shared formula {} referenced at {} before its anchor",
                    si,
                    CellAddress::new(cell.row, cell.col)
                );
                None
            }
        },
        (_, text) => text.map(str::to_string),
    }
}

/// Convert a `<v>` / inline string payload according to the cell type
fn convert_value(
    cell_type: Option<&str>,
    raw: &str,
    shared_strings: &[String],
) -> XlsxResult<CellValue> {
    let value = match cell_type {
        // Shared string
        Some("s") => {
            let idx: usize = raw.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("Invalid shared string index: {}", raw))
            })?;
            let s = shared_strings.get(idx).ok_or_else(|| {
                XlsxError::Parse(format!("Shared string index {} out of bounds", idx))
            })?;
            CellValue::Text(s.clone())
        }

        Some("b") => {
            let raw = raw.trim();
            CellValue::Boolean(raw == "1" || raw.eq_ignore_ascii_case("true"))
        }

        Some("e") => CellValue::Error(raw.trim().to_string()),

        Some("inlineStr") | Some("str") => CellValue::Text(decode_excel_escapes(raw)),

        // Number (default type or explicit "n")
        None | Some("n") => match raw.trim().parse::<f64>() {
            Ok(n) => CellValue::Number(n),
            Err(_) => CellValue::Text(raw.to_string()),
        },

        // ISO 8601 dates ("d") and unknown types - keep the text
        Some(_) => CellValue::Text(raw.to_string()),
    };

    Ok(value)
}
