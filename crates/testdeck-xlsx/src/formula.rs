//! Shared formula expansion
//!
//! A shared formula is stored once on its anchor cell; every other cell in
//! the block carries only `<f t="shared" si="N"/>`. The text for those cells
//! is the anchor's text with relative references moved by the cell's offset
//! from the anchor.

use once_cell::sync::Lazy;
use regex::Regex;
use testdeck_core::CellAddress;

static CELL_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$?[A-Za-z]{1,3}\$?[0-9]+$").expect("cell reference pattern"));

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$')
}

/// Shift the relative references in `formula` by the given offsets.
///
/// String literals, quoted sheet names, structured references, function
/// names and sheet prefixes are copied untouched. A reference pushed off the
/// sheet becomes `#REF!`.
pub(crate) fn shift_formula(formula: &str, row_delta: i64, col_delta: i64) -> String {
    if row_delta == 0 && col_delta == 0 {
        return formula.to_string();
    }

    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' | '\'' => {
                out.push(c);
                i += 1;
                while i < chars.len() {
                    out.push(chars[i]);
                    if chars[i] == c {
                        // doubled quote is an escape, not the end
                        if chars.get(i + 1) == Some(&c) {
                            out.push(c);
                            i += 2;
                            continue;
                        }
                        i += 1;
                        break;
                    }
                    i += 1;
                }
            }
            '[' => {
                while i < chars.len() {
                    out.push(chars[i]);
                    i += 1;
                    if chars[i - 1] == ']' {
                        break;
                    }
                }
            }
            c if is_token_char(c) => {
                let start = i;
                while i < chars.len() && is_token_char(chars[i]) {
                    i += 1;
                }
                let token: String = chars[start..i].iter().collect();
                let next = chars.get(i).copied();
                if matches!(next, Some('(') | Some('!')) {
                    out.push_str(&token);
                } else {
                    out.push_str(&shift_token(&token, row_delta, col_delta));
                }
            }
            _ => {
                out.push(c);
                i += 1;
            }
        }
    }

    out
}

fn shift_token(token: &str, row_delta: i64, col_delta: i64) -> String {
    if !CELL_REF.is_match(token) {
        return token.to_string();
    }
    match CellAddress::parse(token) {
        Ok(addr) => match addr.shifted(row_delta, col_delta) {
            Some(moved) => moved.to_a1_string(),
            None => "#REF!".to_string(),
        },
        // Looks like a reference but lies past XFD: a defined name
        Err(_) => token.to_string(),
    }
}
