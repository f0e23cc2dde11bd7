//! Tabular rows: header-keyed, column-ordered string records

use std::fmt;

use ahash::AHashMap;

/// One data row of a sheet keyed by the sheet's header row.
///
/// Iteration follows column order. Inserting a header that is already present
/// replaces its value but keeps its original position, so a sheet with
/// duplicate headers yields the right-most column's value under the
/// left-most column's slot.
#[derive(Clone, Default)]
pub struct TabularRow {
    fields: Vec<(String, String)>,
    index: AHashMap<String, usize>,
}

impl TabularRow {
    /// Create an empty row
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty row with room for `capacity` fields
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
            index: AHashMap::with_capacity(capacity),
        }
    }

    /// Insert a field, returning the value it replaced
    pub fn insert<K, V>(&mut self, header: K, value: V) -> Option<String>
    where
        K: Into<String>,
        V: Into<String>,
    {
        let header = header.into();
        let value = value.into();

        if let Some(&pos) = self.index.get(&header) {
            return Some(std::mem::replace(&mut self.fields[pos].1, value));
        }

        self.index.insert(header.clone(), self.fields.len());
        self.fields.push((header, value));
        None
    }

    /// Look up a value by header
    pub fn get(&self, header: &str) -> Option<&str> {
        self.index
            .get(header)
            .map(|&pos| self.fields[pos].1.as_str())
    }

    /// Check whether a header is present
    pub fn contains_key(&self, header: &str) -> bool {
        self.index.contains_key(header)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the row has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Headers in column order
    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    /// Values in column order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }

    /// `(header, value)` pairs in column order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v.as_str()))
    }
}

impl std::ops::Index<&str> for TabularRow {
    type Output = str;

    fn index(&self, header: &str) -> &str {
        match self.get(header) {
            Some(v) => v,
            None => panic!("no column named '{}'", header),
        }
    }
}

impl PartialEq for TabularRow {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for TabularRow {}

impl fmt::Debug for TabularRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TabularRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = TabularRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl IntoIterator for TabularRow {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TabularRow {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (k, v) in self.iter() {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_order_preserved() {
        let row: TabularRow = [("user", "alice"), ("age", "30"), ("city", "Oslo")]
            .into_iter()
            .collect();

        assert_eq!(row.headers().collect::<Vec<_>>(), vec!["user", "age", "city"]);
        assert_eq!(row.get("age"), Some("30"));
        assert_eq!(&row["city"], "Oslo");
        assert_eq!(row.get("missing"), None);
    }

    #[test]
    fn test_duplicate_header_later_value_wins() {
        let mut row = TabularRow::new();
        assert_eq!(row.insert("id", "1"), None);
        row.insert("name", "x");
        assert_eq!(row.insert("id", "2"), Some("1".to_string()));

        assert_eq!(row.len(), 2);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("id", "2"), ("name", "x")]);
    }

    #[test]
    fn test_debug_renders_as_map() {
        let row: TabularRow = [("user", "alice")].into_iter().collect();
        assert_eq!(format!("{:?}", row), r#"{"user": "alice"}"#);
    }
}
