use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Field the node stamps onto every accepted transaction. Two pending
/// entries with the same timestamp value are the same transaction.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// An opaque record of named fields, e.g. who moved money where and why.
/// The node enforces no schema beyond the boundary-level required fields;
/// serde_json's sorted-key map backing keeps the serialized form canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transaction {
    fields: Map<String, Value>,
}

impl Transaction {
    pub fn from_fields(fields: Map<String, Value>) -> Transaction {
        Transaction { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// True when the field is present and carries a non-empty value.
    pub fn has_value(&self, field: &str) -> bool {
        match self.fields.get(field) {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    /// Assign the server-side receipt time.
    pub fn stamp(&mut self, timestamp: f64) {
        if let Some(number) = Number::from_f64(timestamp) {
            self.fields
                .insert(String::from(TIMESTAMP_FIELD), Value::Number(number));
        }
    }

    pub fn timestamp(&self) -> Option<f64> {
        self.fields.get(TIMESTAMP_FIELD).and_then(Value::as_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_fields() -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert("Organisation".to_string(), json!("X"));
        fields.insert("Money".to_string(), json!(10));
        fields.insert("Description".to_string(), json!("test"));
        fields
    }

    #[test]
    fn test_stamp_sets_timestamp() {
        let mut tx = Transaction::from_fields(sample_fields());
        assert!(tx.timestamp().is_none());

        tx.stamp(1700000000.25);
        assert_eq!(tx.timestamp(), Some(1700000000.25));
    }

    #[test]
    fn test_has_value_rejects_empty_and_missing() {
        let mut fields = sample_fields();
        fields.insert("Description".to_string(), json!(""));
        fields.insert("Note".to_string(), Value::Null);
        let tx = Transaction::from_fields(fields);

        assert!(tx.has_value("Organisation"));
        assert!(tx.has_value("Money"));
        assert!(!tx.has_value("Description"));
        assert!(!tx.has_value("Note"));
        assert!(!tx.has_value("Absent"));
    }

    #[test]
    fn test_serialization_is_key_sorted() {
        // Insertion order must not leak into the wire form.
        let mut forward = Map::new();
        forward.insert("a".to_string(), json!(1));
        forward.insert("b".to_string(), json!(2));
        let mut reverse = Map::new();
        reverse.insert("b".to_string(), json!(2));
        reverse.insert("a".to_string(), json!(1));

        let left = serde_json::to_string(&Transaction::from_fields(forward)).unwrap();
        let right = serde_json::to_string(&Transaction::from_fields(reverse)).unwrap();
        assert_eq!(left, right);
    }
}
