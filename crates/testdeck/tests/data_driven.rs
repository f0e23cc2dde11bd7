//! A data-driven run: rows from a sheet feed tests whose outcomes land in the report.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use tempfile::TempDir;
use testdeck::prelude::*;
use testdeck::report::{ReportSink, Status};

fn inline(r: &str, text: &str) -> String {
    format!(r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#, r, text)
}

fn write_logins(dir: &Path) -> PathBuf {
    let path = dir.join("logins.xlsx");
    let mut zip = zip::ZipWriter::new(fs::File::create(&path).unwrap());
    let options = zip::write::SimpleFileOptions::default();

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Logins" sheetId="1" r:id="rId1"/></sheets></workbook>"#).unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#).unwrap();

    let sheet = format!(
        r#"<?xml version="1.0"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData><row r="1">{}{}{}</row><row r="2">{}{}<c r="C2" t="b"><v>1</v></c></row><row r="3">{}<c r="C3" t="b"><v>0</v></c></row></sheetData></worksheet>"#,
        inline("A1", "username"),
        inline("B1", "password"),
        inline("C1", "enabled"),
        inline("A2", "alice"),
        inline("B2", "s3cret"),
        inline("A3", "bob"),
    );
    zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    zip.write_all(sheet.as_bytes()).unwrap();

    zip.finish().unwrap();
    path
}

#[test]
fn test_rows_drive_report() {
    let dir = TempDir::new().unwrap();
    let data = write_logins(dir.path());
    let report_dir = dir.path().join("report");

    let reader = TabularDataReader::new(&data);
    let rows = reader.read_sheet("Logins");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("password"), Some(""));
    assert_eq!(rows[1].get("enabled"), Some("false"));

    let mut recorder = TestLifecycleRecorder::new(ReportConfig::new(&report_dir));
    recorder.on_suite_start().unwrap();

    for row in &rows {
        let ctx = recorder
            .on_test_start(&format!("login_{}", &row["username"]))
            .unwrap();
        let outcome = if row["password"].is_empty() {
            TestOutcome::failed(format!("{} has no password", &row["username"]))
        } else {
            TestOutcome::Passed
        };
        recorder
            .on_test_end(ctx, outcome, || Ok(b"png".to_vec()))
            .unwrap();
    }
    recorder.on_suite_end().unwrap();

    let statuses: Vec<Status> = recorder
        .sink()
        .unwrap()
        .entries()
        .iter()
        .map(|e| e.status())
        .collect();
    assert_eq!(statuses, vec![Status::Pass, Status::Fail]);
    assert!(report_dir.join("screenshots/login_bob.png").is_file());
    assert!(!report_dir.join("screenshots/login_alice.png").exists());

    let html = fs::read_to_string(report_dir.join("index.html")).unwrap();
    assert!(html.contains("login_alice"));
    assert!(html.contains("bob has no password"));
}
