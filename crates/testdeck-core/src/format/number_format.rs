//! Number format types

/// Number format attached to a cell through its style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// Custom format from its code, e.g. `yyyy-mm-dd`
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        NumberFormat::Custom(format.into())
    }

    /// Format for a `numFmtId` with no custom code; id 0 is General
    pub fn from_id(id: u32) -> Self {
        if id == 0 {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// Whether numbers in this format display as a date or time.
    ///
    /// Built-in ids 14-22 and 45-47 are the date/time formats.
    /// Custom codes count as dates when a date or time token appears outside
    /// quoted literals, escaped characters and bracketed sections. Elapsed-time
    /// brackets (`[h]`, `[mm]`, `[ss]`) count as time tokens.
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => custom_code_is_date(code),
            NumberFormat::General => false,
        }
    }
}

fn custom_code_is_date(code: &str) -> bool {
    // Only the first section (positive numbers) decides
    let mut chars = code.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                in_quotes = false;
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '\\' | '_' | '*' => {
                chars.next();
            }
            ';' => return false,
            '[' => {
                let mut inner = String::new();
                for ch in chars.by_ref() {
                    if ch == ']' {
                        break;
                    }
                    inner.push(ch.to_ascii_lowercase());
                }
                if !inner.is_empty() && inner.chars().all(|ch| matches!(ch, 'h' | 'm' | 's')) {
                    return true;
                }
            }
            'y' | 'Y' | 'm' | 'M' | 'd' | 'D' | 'h' | 'H' | 's' | 'S' => return true,
            _ => {}
        }
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_dates() {
        assert!(NumberFormat::BuiltIn(14).is_date_format());
        assert!(NumberFormat::BuiltIn(22).is_date_format());
        assert!(NumberFormat::BuiltIn(46).is_date_format());
        assert!(!NumberFormat::BuiltIn(2).is_date_format());
        assert!(!NumberFormat::General.is_date_format());
        assert_eq!(NumberFormat::from_id(0), NumberFormat::General);
    }

    #[test]
    fn test_custom_dates() {
        assert!(NumberFormat::from_string("yyyy-mm-dd").is_date_format());
        assert!(NumberFormat::from_string("[$-409]d/m/yy h:mm AM/PM").is_date_format());
        assert!(NumberFormat::from_string("[h]:mm").is_date_format());
    }

    #[test]
    fn test_custom_non_dates() {
        assert!(!NumberFormat::from_string("0.00").is_date_format());
        assert!(!NumberFormat::from_string("#,##0 \"days\"").is_date_format());
        assert!(!NumberFormat::from_string("[Red]0.00").is_date_format());
        assert!(!NumberFormat::from_string("[$EUR-407] #,##0.00").is_date_format());
        assert!(!NumberFormat::from_string("0.00E+00").is_date_format());
        assert!(!NumberFormat::from_string("@").is_date_format());
    }
}
