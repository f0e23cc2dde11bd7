//! `xl/styles.xml`: number formats per cell style
//!
//! Only the parts that decide how a value is rendered are kept: the custom
//! `numFmts` table and the `numFmtId` of each `cellXfs` entry. A cell's `s`
//! attribute indexes the returned vector.

use std::collections::HashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use testdeck_core::NumberFormat;

use crate::error::{XlsxError, XlsxResult};

/// Parse styles.xml into one [`NumberFormat`] per `cellXfs` entry
pub(crate) fn read_styles_xml<R: Read>(reader: R) -> XlsxResult<Vec<NumberFormat>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"numFmt" => {
                    if let Some((id, code)) = parse_num_fmt(&e) {
                        custom_formats.insert(id, code);
                    }
                }
                b"cellXfs" => in_cell_xfs = true,
                // cellStyleXfs holds xf elements too; only cellXfs is indexed by cells
                b"xf" if in_cell_xfs => {
                    let num_fmt_id = e
                        .attributes()
                        .flatten()
                        .find(|attr| attr.key.local_name().as_ref() == b"numFmtId")
                        .and_then(|attr| attr.unescape_value().ok()?.parse::<u32>().ok())
                        .unwrap_or(0);
                    xf_format_ids.push(num_fmt_id);
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    if xf_format_ids.is_empty() {
        return Ok(vec![NumberFormat::General]);
    }

    Ok(xf_format_ids
        .into_iter()
        .map(|id| match custom_formats.get(&id) {
            Some(code) => NumberFormat::from_string(code.clone()),
            None => NumberFormat::from_id(id),
        })
        .collect())
}

fn parse_num_fmt(e: &BytesStart<'_>) -> Option<(u32, String)> {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"numFmtId" => id = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"formatCode" => code = attr.unescape_value().ok().map(|s| s.to_string()),
            _ => {}
        }
    }
    Some((id?, code?))
}
