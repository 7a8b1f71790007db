//! Result shaping
//!
//! Turns raw rows into the shape a caller asked for. Two independent switches
//! drive it:
//!
//! | `key_field` | `key_value` | output                                   |
//! |-------------|-------------|------------------------------------------|
//! | none        | none        | list of full rows                        |
//! | none        | one column  | list of that column's values             |
//! | none        | columns     | list of partial rows                     |
//! | columns     | none        | composite key → full row                 |
//! | columns     | one column  | composite key → that column's value      |
//! | columns     | columns     | composite key → partial row              |
//!
//! The composite key is the key columns' text concatenated in the given order
//! with no separator, so `("ab", "c")` and `("a", "bc")` collide. Rows that
//! share a key overwrite the earlier entry in place.

use super::error::{DatabaseError, Result};
use super::value::{DatabaseRow, DatabaseValue};
use indexmap::IndexMap;
use serde::Serialize;

/// Column selection for a shaping switch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FieldSpec {
    /// Switch off
    #[default]
    None,
    /// Exactly one column
    Single(String),
    /// An ordered list of columns
    Multiple(Vec<String>),
}

impl FieldSpec {
    /// Build from a column list; an empty list is [`FieldSpec::None`]
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            FieldSpec::None
        } else {
            FieldSpec::Multiple(columns)
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, FieldSpec::None)
    }

    /// Column names in order
    pub fn names(&self) -> &[String] {
        match self {
            FieldSpec::None => &[],
            FieldSpec::Single(name) => std::slice::from_ref(name),
            FieldSpec::Multiple(names) => names,
        }
    }
}

impl From<&str> for FieldSpec {
    fn from(name: &str) -> Self {
        FieldSpec::Single(name.to_string())
    }
}

impl From<String> for FieldSpec {
    fn from(name: String) -> Self {
        FieldSpec::Single(name)
    }
}

impl From<Option<&str>> for FieldSpec {
    fn from(name: Option<&str>) -> Self {
        name.map(FieldSpec::from).unwrap_or_default()
    }
}

impl From<Vec<String>> for FieldSpec {
    fn from(names: Vec<String>) -> Self {
        FieldSpec::columns(names)
    }
}

impl From<Vec<&str>> for FieldSpec {
    fn from(names: Vec<&str>) -> Self {
        FieldSpec::columns(names)
    }
}

impl From<&[&str]> for FieldSpec {
    fn from(names: &[&str]) -> Self {
        FieldSpec::columns(names.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for FieldSpec {
    fn from(names: [&str; N]) -> Self {
        FieldSpec::columns(names)
    }
}

/// One shaped row: a full or partial row, or a bare value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ShapedRecord {
    Row(DatabaseRow),
    Scalar(DatabaseValue),
}

impl ShapedRecord {
    pub fn as_row(&self) -> Option<&DatabaseRow> {
        match self {
            ShapedRecord::Row(row) => Some(row),
            ShapedRecord::Scalar(_) => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&DatabaseValue> {
        match self {
            ShapedRecord::Scalar(value) => Some(value),
            ShapedRecord::Row(_) => None,
        }
    }

    /// Field of a row record; `None` for scalars and missing columns
    pub fn get(&self, column: &str) -> Option<&DatabaseValue> {
        self.as_row().and_then(|row| row.get(column))
    }
}

/// Composite key → record, in first-insertion order
pub type KeyedCollection = IndexMap<String, ShapedRecord>;

/// Output of a shaping pass
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Shaped {
    List(Vec<ShapedRecord>),
    Keyed(KeyedCollection),
}

impl Shaped {
    pub fn len(&self) -> usize {
        match self {
            Shaped::List(records) => records.len(),
            Shaped::Keyed(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_list(&self) -> Option<&[ShapedRecord]> {
        match self {
            Shaped::List(records) => Some(records),
            Shaped::Keyed(_) => None,
        }
    }

    pub fn as_keyed(&self) -> Option<&KeyedCollection> {
        match self {
            Shaped::Keyed(records) => Some(records),
            Shaped::List(_) => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<ShapedRecord>> {
        match self {
            Shaped::List(records) => Some(records),
            Shaped::Keyed(_) => None,
        }
    }

    pub fn into_keyed(self) -> Option<KeyedCollection> {
        match self {
            Shaped::Keyed(records) => Some(records),
            Shaped::List(_) => None,
        }
    }
}

/// Shapes rows according to a key and a value selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultShaper {
    key_field: FieldSpec,
    key_value: FieldSpec,
}

impl ResultShaper {
    pub fn new(key_field: impl Into<FieldSpec>, key_value: impl Into<FieldSpec>) -> Self {
        Self {
            key_field: key_field.into(),
            key_value: key_value.into(),
        }
    }

    pub fn key_field(&self) -> &FieldSpec {
        &self.key_field
    }

    pub fn key_value(&self) -> &FieldSpec {
        &self.key_value
    }

    pub fn is_keyed(&self) -> bool {
        !self.key_field.is_none()
    }

    /// Empty output in the layout this shaper produces
    pub fn empty(&self) -> Shaped {
        if self.is_keyed() {
            Shaped::Keyed(KeyedCollection::new())
        } else {
            Shaped::List(Vec::new())
        }
    }

    /// Composite key for a row, or `None` when the shaper is unkeyed
    pub fn composite_key(&self, row: &DatabaseRow) -> Option<String> {
        if !self.is_keyed() {
            return None;
        }
        let mut key = String::new();
        for column in self.key_field.names() {
            if let Some(value) = row.get(column) {
                key.push_str(&value.to_key_fragment());
            }
        }
        Some(key)
    }

    /// Value part of a row
    pub fn shape_record(&self, mut row: DatabaseRow) -> ShapedRecord {
        match &self.key_value {
            FieldSpec::None => ShapedRecord::Row(row),
            FieldSpec::Single(column) => ShapedRecord::Scalar(
                row.swap_remove(column.as_str())
                    .unwrap_or(DatabaseValue::Null),
            ),
            FieldSpec::Multiple(columns) => ShapedRecord::Row(
                columns
                    .iter()
                    .map(|column| {
                        let value = row.get(column.as_str()).cloned().unwrap_or(DatabaseValue::Null);
                        (column.clone(), value)
                    })
                    .collect(),
            ),
        }
    }

    /// Shape a whole result set
    pub fn shape<I>(&self, rows: I) -> Shaped
    where
        I: IntoIterator<Item = DatabaseRow>,
    {
        if self.is_keyed() {
            let mut map = KeyedCollection::new();
            self.insert_keyed(rows, &mut map);
            Shaped::Keyed(map)
        } else {
            Shaped::List(rows.into_iter().map(|row| self.shape_record(row)).collect())
        }
    }

    /// Append a result set to output from an earlier pass of this shaper
    ///
    /// Keyed output keeps overwriting on key collisions across calls. Output
    /// in the other layout is refused and left as it was.
    pub fn shape_into<I>(&self, rows: I, out: &mut Shaped) -> Result<()>
    where
        I: IntoIterator<Item = DatabaseRow>,
    {
        match out {
            Shaped::List(list) if !self.is_keyed() => {
                list.extend(rows.into_iter().map(|row| self.shape_record(row)));
                Ok(())
            }
            Shaped::Keyed(map) if self.is_keyed() => {
                self.insert_keyed(rows, map);
                Ok(())
            }
            _ => Err(DatabaseError::unsupported(format!(
                "cannot append {} rows to {} output",
                if self.is_keyed() { "keyed" } else { "listed" },
                if self.is_keyed() { "list" } else { "keyed" },
            ))),
        }
    }

    fn insert_keyed<I>(&self, rows: I, map: &mut KeyedCollection)
    where
        I: IntoIterator<Item = DatabaseRow>,
    {
        for row in rows {
            let key = self.composite_key(&row).unwrap_or_default();
            map.insert(key, self.shape_record(row));
        }
    }
}
