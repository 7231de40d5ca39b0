use serde::{Deserialize, Serialize};

use crate::error::FieldError;

/// A typed CSV data row.
///
/// Implementors are created with [`Default`] by the readers, filled column by column through
/// [`CsvRow::set_field`] and, when read by the indexed reader, stamped with the 1-based source
/// line via [`CsvRow::set_index`]. Writers read them back through [`CsvRow::field`] and the
/// two `row_values` entry points.
pub trait CsvRow {
    /// 1-based source line of this row, header being line 1. `0` when never indexed.
    fn index(&self) -> u64;

    fn set_index(&mut self, index: u64);

    /// Populates one logical field. `None` is an empty cell.
    fn set_field(&mut self, field: &str, value: Option<String>) -> Result<(), FieldError>;

    /// Reads one logical field back.
    fn field(&self, field: &str) -> Result<Option<String>, FieldError>;

    /// All fields in canonical order, each trimmed, absent ones as empty strings.
    fn row_values(&self) -> Vec<String>;

    /// The fields named in `fields`, kept in canonical order and normalized like
    /// [`CsvRow::row_values`].
    fn row_values_filtered(&self, fields: &[String]) -> Vec<String>;
}

/// Trims a field value for serialization; absent becomes empty.
pub fn trim_to_empty(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

/// A schemaless row keeping its fields in insertion order.
///
/// Accepts any field name, which makes it usable with any [`CsvSchema`](crate::core::schema::CsvSchema).
///
/// # Examples
///
/// ```
/// use warehouse_csv::core::row::{CsvRow, GenericRow};
///
/// let mut row = GenericRow::default();
/// row.set_field("name", Some(" hod001 ".to_string())).unwrap();
/// row.set_field("article", None).unwrap();
///
/// assert_eq!(row.get("name"), Some(" hod001 "));
/// assert_eq!(row.row_values(), vec!["hod001", ""]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericRow {
    index: u64,
    fields: Vec<(String, Option<String>)>,
}

impl GenericRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion.
    pub fn with(mut self, field: &str, value: Option<&str>) -> Self {
        self.insert(field, value.map(str::to_string));
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    fn insert(&mut self, field: &str, value: Option<String>) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field.to_string(), value)),
        }
    }
}

impl CsvRow for GenericRow {
    fn index(&self) -> u64 {
        self.index
    }

    fn set_index(&mut self, index: u64) {
        self.index = index;
    }

    fn set_field(&mut self, field: &str, value: Option<String>) -> Result<(), FieldError> {
        self.insert(field, value);
        Ok(())
    }

    fn field(&self, field: &str) -> Result<Option<String>, FieldError> {
        Ok(self.get(field).map(str::to_string))
    }

    fn row_values(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(_, value)| trim_to_empty(value.as_deref()))
            .collect()
    }

    fn row_values_filtered(&self, fields: &[String]) -> Vec<String> {
        self.fields
            .iter()
            .filter(|(name, _)| fields.contains(name))
            .map(|(_, value)| trim_to_empty(value.as_deref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_keeps_insertion_order_and_overwrites() {
        let mut row = GenericRow::new();
        row.set_field("b", Some("1".to_string())).unwrap();
        row.set_field("a", Some("2".to_string())).unwrap();
        row.set_field("b", Some("3".to_string())).unwrap();

        assert_eq!(row.names().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(row.row_values(), vec!["3", "2"]);
    }

    #[test]
    fn filtered_values_follow_canonical_order() {
        let row = GenericRow::new()
            .with("name", Some("name "))
            .with("productGroup", Some("7Z46"))
            .with("salePrice", None);

        let fields = vec!["salePrice".to_string(), "name".to_string()];
        assert_eq!(row.row_values_filtered(&fields), vec!["name", ""]);
    }

    #[test]
    fn unknown_field_reads_as_absent() {
        let row = GenericRow::new().with("name", Some("x"));
        assert_eq!(row.field("other").unwrap(), None);
        assert_eq!(row.index(), 0);
    }

    #[test]
    fn trim_to_empty_handles_absent() {
        assert_eq!(trim_to_empty(None), "");
        assert_eq!(trim_to_empty(Some("  a b ")), "a b");
    }
}
