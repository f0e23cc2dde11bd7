//! Fixture builder for reader tests.
//!
//! Writes a minimal but well-formed `.xlsx` into a temp directory: content
//! types, workbook, relationships, shared strings, a styles part with one
//! date style (index 1) and one worksheet part per sheet.

#![allow(dead_code)]

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

/// A cell to write into a fixture sheet
pub enum FixtureCell {
    Str(&'static str),
    Num(f64),
    Date(f64),
    Bool(bool),
    Formula(&'static str, f64),
    Blank,
}

/// A fixture row: 1-based row number plus cells starting at column A.
/// No cells writes a self-closing `<row/>`.
pub struct FixtureRow {
    pub number: u32,
    pub cells: Vec<FixtureCell>,
}

pub fn row(number: u32, cells: Vec<FixtureCell>) -> FixtureRow {
    FixtureRow { number, cells }
}

/// Write a workbook with the given sheets and return its path.
///
/// The returned [`TempDir`] must outlive the path.
pub fn write_workbook(sheets: &[(&str, Vec<FixtureRow>)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fixture.xlsx");
    let file = std::fs::File::create(&path).unwrap();

    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    let mut shared: Vec<String> = Vec::new();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/></Types>"#).unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#).unwrap();

    let mut workbook = String::from(
        r#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut rels = String::from(
        r#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );

    for (idx, (name, rows)) in sheets.iter().enumerate() {
        let n = idx + 1;
        workbook.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            name, n, n
        ));
        rels.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            n, n
        ));

        let mut xml = String::from(
            r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for fixture_row in rows {
            if fixture_row.cells.is_empty() {
                xml.push_str(&format!(r#"<row r="{}"/>"#, fixture_row.number));
                continue;
            }
            xml.push_str(&format!(r#"<row r="{}">"#, fixture_row.number));
            for (col, cell) in fixture_row.cells.iter().enumerate() {
                let r = format!("{}{}", column_letter(col), fixture_row.number);
                xml.push_str(&cell_xml(&r, cell, &mut shared));
            }
            xml.push_str("</row>");
        }
        xml.push_str("</sheetData></worksheet>");

        zip.start_file(format!("xl/worksheets/sheet{}.xml", n), options)
            .unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
    }

    workbook.push_str("</sheets></workbook>");
    rels.push_str(&format!(
        r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#,
        sheets.len() + 1
    ));

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(workbook.as_bytes()).unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(rels.as_bytes()).unwrap();

    zip.start_file("xl/styles.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><numFmts count="1"><numFmt numFmtId="164" formatCode="yyyy-mm-dd"/></numFmts><cellXfs count="2"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/><xf numFmtId="164" fontId="0" fillId="0" borderId="0" applyNumberFormat="1"/></cellXfs></styleSheet>"#).unwrap();

    let mut sst = String::from(
        r#"<?xml version="1.0"?><sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );
    for s in &shared {
        sst.push_str(&format!("<si><t>{}</t></si>", s));
    }
    sst.push_str("</sst>");
    zip.start_file("xl/sharedStrings.xml", options).unwrap();
    zip.write_all(sst.as_bytes()).unwrap();

    zip.finish().unwrap();
    (dir, path)
}

fn column_letter(col: usize) -> char {
    (b'A' + col as u8) as char
}

fn cell_xml(r: &str, cell: &FixtureCell, shared: &mut Vec<String>) -> String {
    match cell {
        FixtureCell::Str(s) => {
            shared.push(s.to_string());
            format!(r#"<c r="{}" t="s"><v>{}</v></c>"#, r, shared.len() - 1)
        }
        FixtureCell::Num(n) => format!(r#"<c r="{}"><v>{}</v></c>"#, r, n),
        FixtureCell::Date(serial) => format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, r, serial),
        FixtureCell::Bool(b) => format!(r#"<c r="{}" t="b"><v>{}</v></c>"#, r, u8::from(*b)),
        FixtureCell::Formula(f, cached) => {
            format!(r#"<c r="{}"><f>{}</f><v>{}</v></c>"#, r, f, cached)
        }
        FixtureCell::Blank => String::new(),
    }
}
