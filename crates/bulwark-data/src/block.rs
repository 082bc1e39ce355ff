//! Data blocks: a coordinate plus named field values.

use std::collections::BTreeMap;

use bulwark_spatial::Coord;

use crate::ScalarValue;

/// Handle to a data block inside its manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DataBlockId(pub(crate) u64);

impl DataBlockId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Metadata attached to one block.
///
/// The coordinate is owned by the manager: a block is only ever moved by
/// removing it from the index and reinserting it, never mutated in place
/// while indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct DataBlock {
    id: DataBlockId,
    pub(crate) coord: Coord,
    fields: BTreeMap<String, ScalarValue>,
}

impl DataBlock {
    pub(crate) const fn new(id: DataBlockId, coord: Coord, fields: BTreeMap<String, ScalarValue>) -> Self {
        Self { id, coord, fields }
    }

    #[must_use]
    pub const fn id(&self) -> DataBlockId {
        self.id
    }

    #[must_use]
    pub const fn coord(&self) -> &Coord {
        &self.coord
    }

    /// Every field, ordered by name.
    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, ScalarValue> {
        &self.fields
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.keys().map(String::as_str)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ScalarValue> {
        self.fields.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Set a field, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ScalarValue>) -> Option<ScalarValue> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<ScalarValue> {
        self.fields.remove(key)
    }

    pub fn clear(&mut self) {
        self.fields.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ScalarValue::as_str)
    }

    #[must_use]
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(ScalarValue::as_i64)
    }

    #[must_use]
    pub fn get_float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(ScalarValue::as_f64)
    }

    #[must_use]
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(ScalarValue::as_bool)
    }

    #[must_use]
    pub fn get_list(&self, key: &str) -> Option<&[ScalarValue]> {
        self.get(key).and_then(ScalarValue::as_list)
    }
}
