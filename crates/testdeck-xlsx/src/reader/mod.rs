//! XLSX reader
//!
//! [`XlsxWorkbook::open`] reads the workbook-level parts (shared strings,
//! styles, sheet list, relationships) up front and keeps the archive open so
//! that individual sheets can be parsed on request. Dropping the workbook
//! closes the file.

mod worksheet;

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::warn;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use testdeck_core::{DateSystem, NumberFormat};
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::sheet::Sheet;
use crate::styles::read_styles_xml;

/// Undo the `_xHHHH_` escaping Excel applies to control characters in
/// string parts, e.g. `_x000d_` for CR and `_x005f_` for a literal `_`.
///
/// Sequences that are truncated or name no valid char are kept verbatim.
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(start) = rest.find("_x") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match escaped_char(tail) {
            Some(ch) => {
                out.push(ch);
                rest = &tail[7..];
            }
            None => {
                out.push_str("_x");
                rest = &tail[2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// `tail` starts with `_x`; the char it encodes when it is a full `_xHHHH_`
fn escaped_char(tail: &str) -> Option<char> {
    let hex = tail.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) || tail.as_bytes().get(6) != Some(&b'_') {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

/// Unescaped value of the attribute whose local name is `key`
fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// A sheet listed in `xl/workbook.xml`, resolved to its archive path
#[derive(Debug, Clone)]
struct SheetEntry {
    name: String,
    path: String,
}

/// An open XLSX workbook
pub struct XlsxWorkbook<R: Read + Seek = File> {
    archive: ZipArchive<R>,
    shared_strings: Vec<String>,
    cell_formats: Vec<NumberFormat>,
    sheets: Vec<SheetEntry>,
    date_system: DateSystem,
}

impl XlsxWorkbook<File> {
    /// Open a workbook from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }
}

impl<R: Read + Seek> XlsxWorkbook<R> {
    /// Open a workbook from a reader
    pub fn from_reader(reader: R) -> XlsxResult<Self> {
        let mut archive = ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let cell_formats = Self::read_styles(&mut archive)?;
        let (sheet_info, date_system) = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let sheets = sheet_info
            .into_iter()
            .filter_map(|(name, r_id)| match sheet_paths.get(&r_id) {
                Some(path) => Some(SheetEntry {
                    name,
                    path: path.clone(),
                }),
                None => {
                    warn!("Sheet '{}' has no worksheet relationship '{}'", name, r_id);
                    None
                }
            })
            .collect();

        Ok(Self {
            archive,
            shared_strings,
            cell_formats,
            sheets,
            date_system,
        })
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    /// Number of sheets
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Date system declared by `workbookPr/@date1904`
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    /// Parse the sheet called `name`.
    ///
    /// Names compare case-insensitively, as Excel treats them; the first
    /// match in workbook order wins. Returns `Ok(None)` when no sheet matches.
    pub fn read_sheet(&mut self, name: &str) -> XlsxResult<Option<Sheet>> {
        let Some(entry) = self
            .sheets
            .iter()
            .find(|s| sheet_name_matches(&s.name, name))
            .cloned()
        else {
            return Ok(None);
        };

        let file = self
            .archive
            .by_name(&entry.path)
            .map_err(|_| XlsxError::MissingPart(entry.path.clone()))?;

        let sheet = worksheet::read_worksheet(
            file,
            entry.name,
            &self.shared_strings,
            &self.cell_formats,
        )?;
        Ok(Some(sheet))
    }

    /// Parse the sheet at `index` in workbook order
    pub fn read_sheet_at(&mut self, index: usize) -> XlsxResult<Option<Sheet>> {
        match self.sheets.get(index).map(|s| s.name.clone()) {
            Some(name) => self.read_sheet(&name),
            None => Ok(None),
        }
    }

    /// Read the shared strings table
    fn read_shared_strings(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        // Leading/trailing spaces inside <t> are data

        let mut buf = Vec::new();
        let mut current_string = String::new();
        let mut in_si = false;
        let mut in_t = false;
        let mut in_phonetic = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current_string.clear();
                    }
                    b"rPh" => in_phonetic = true,
                    b"t" if in_si && !in_phonetic => in_t = true,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                    strings.push(String::new());
                }
                Ok(Event::End(e)) => match e.local_name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current_string));
                        current_string.clear();
                        in_si = false;
                    }
                    b"rPh" => in_phonetic = false,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t => {
                    current_string.push_str(&e.unescape()?);
                }
                Ok(Event::CData(e)) if in_t => {
                    current_string.push_str(&String::from_utf8_lossy(&e));
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    fn read_styles(archive: &mut ZipArchive<R>) -> XlsxResult<Vec<NumberFormat>> {
        match archive.by_name("xl/styles.xml") {
            Ok(file) => read_styles_xml(file),
            Err(_) => Ok(vec![NumberFormat::General]),
        }
    }

    /// Read workbook.xml to get sheet names, rIds and the date system
    fn read_workbook_xml(
        archive: &mut ZipArchive<R>,
    ) -> XlsxResult<(Vec<(String, String)>, DateSystem)> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut sheets = Vec::new();
        let mut date_system = DateSystem::V1900;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"sheet" => {
                        // r:id, whatever prefix the relationships namespace got
                        let r_id = e
                            .attributes()
                            .flatten()
                            .find(|attr| {
                                attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id"
                            })
                            .and_then(|attr| attr.unescape_value().ok())
                            .map(|v| v.into_owned());

                        match (attr_value(&e, b"name"), r_id) {
                            (Some(name), Some(r_id)) => sheets.push((name, r_id)),
                            _ => warn!("Skipping <sheet> without name or r:id"),
                        }
                    }
                    b"workbookPr" => {
                        if matches!(attr_value(&e, b"date1904").as_deref(), Some("1" | "true")) {
                            date_system = DateSystem::V1904;
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok((sheets, date_system))
    }

    /// Read workbook.xml.rels to get sheet file paths
    fn read_workbook_rels(archive: &mut ZipArchive<R>) -> XlsxResult<HashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut rels = HashMap::new();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    // styles, sharedStrings and themes live here too
                    let is_worksheet = attr_value(&e, b"Type")
                        .map_or(false, |t| t.ends_with("/worksheet"));
                    let id = attr_value(&e, b"Id");
                    let target = attr_value(&e, b"Target");

                    if let (true, Some(id), Some(target)) = (is_worksheet, id, target) {
                        rels.insert(id, resolve_target(&target));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(rels)
    }
}

fn sheet_name_matches(sheet: &str, wanted: &str) -> bool {
    sheet
        .chars()
        .flat_map(char::to_lowercase)
        .eq(wanted.chars().flat_map(char::to_lowercase))
}

/// Resolve a relationship target relative to the `xl/` folder
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = vec!["xl"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}
