//! Record model.
//!
//! A record is one input row: an ordered mapping from column name to a
//! scalar value. Column order follows the source header.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of key-value data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Sets a field, keeping first-insertion order.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Returns the value of a field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Field names in column order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keys_keep_insertion_order() {
        let record: Record = [("zeta", json!(1)), ("alpha", json!(2)), ("mid", json!(3))]
            .into_iter()
            .collect();
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let mut record = Record::new();
        record.insert("name", "Acme, Inc");
        record.insert("amount", 100);
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"name":"Acme, Inc","amount":100}"#
        );
    }
}
