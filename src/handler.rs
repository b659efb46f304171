//! Raw data access.
//!
//! A [`DataHandler`] yields the seven flat tables of the client schema as
//! rows of loosely-typed JSON maps, plus a dataset version string. The
//! generator normalizes and cross-links them into a [`crate::SourceData`].

use serde_json::{Map, Value};

/// One flat table row: column name to JSON value.
pub type Row = Map<String, Value>;

/// Access to the seven flat source tables.
///
/// Implementations may be backed by anything (a database, archive files,
/// in-memory fixtures); the generator only consumes rows.
pub trait DataHandler {
    /// `invtypes` rows: item types.
    fn get_invtypes(&self) -> Vec<Row>;
    /// `invgroups` rows: item groups.
    fn get_invgroups(&self) -> Vec<Row>;
    /// `dgmattribs` rows: attribute metadata.
    fn get_dgmattribs(&self) -> Vec<Row>;
    /// `dgmtypeattribs` rows: per-type attribute values.
    fn get_dgmtypeattribs(&self) -> Vec<Row>;
    /// `dgmeffects` rows: effects.
    fn get_dgmeffects(&self) -> Vec<Row>;
    /// `dgmtypeeffects` rows: type-to-effect links.
    fn get_dgmtypeeffects(&self) -> Vec<Row>;
    /// `dgmexpressions` rows: raw modifier expressions.
    fn get_dgmexpressions(&self) -> Vec<Row>;
    /// Dataset version, when the source carries one.
    fn get_version(&self) -> Option<String>;
}

/// Read a column as an unsigned integer id.
pub fn row_u32(row: &Row, column: &str) -> Option<u32> {
    row.get(column)?.as_u64().and_then(|v| u32::try_from(v).ok())
}

/// Read a column as a float, accepting integer-encoded values.
pub fn row_f64(row: &Row, column: &str) -> Option<f64> {
    row.get(column)?.as_f64()
}

/// Read a column as a boolean, accepting 0/1 integer encodings.
pub fn row_bool(row: &Row, column: &str) -> Option<bool> {
    match row.get(column)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    }
}

/// In-memory handler for tests and embedded datasets.
///
/// Tables are plain public vectors; push rows directly. The version is
/// looked up from the `metadata` table like the client database does:
/// the row whose `field_name` is `client_build` supplies `field_value`.
#[derive(Debug, Default)]
pub struct MemoryDataHandler {
    pub invtypes: Vec<Row>,
    pub invgroups: Vec<Row>,
    pub dgmattribs: Vec<Row>,
    pub dgmtypeattribs: Vec<Row>,
    pub dgmeffects: Vec<Row>,
    pub dgmtypeeffects: Vec<Row>,
    pub dgmexpressions: Vec<Row>,
    pub metadata: Vec<Row>,
}

impl MemoryDataHandler {
    /// Create a handler with all tables empty.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataHandler for MemoryDataHandler {
    fn get_invtypes(&self) -> Vec<Row> {
        self.invtypes.clone()
    }

    fn get_invgroups(&self) -> Vec<Row> {
        self.invgroups.clone()
    }

    fn get_dgmattribs(&self) -> Vec<Row> {
        self.dgmattribs.clone()
    }

    fn get_dgmtypeattribs(&self) -> Vec<Row> {
        self.dgmtypeattribs.clone()
    }

    fn get_dgmeffects(&self) -> Vec<Row> {
        self.dgmeffects.clone()
    }

    fn get_dgmtypeeffects(&self) -> Vec<Row> {
        self.dgmtypeeffects.clone()
    }

    fn get_dgmexpressions(&self) -> Vec<Row> {
        self.dgmexpressions.clone()
    }

    fn get_version(&self) -> Option<String> {
        self.metadata
            .iter()
            .find(|row| row.get("field_name").and_then(Value::as_str) == Some("client_build"))
            .and_then(|row| match row.get("field_value")? {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_row_bool_accepts_integers() {
        let r = row(json!({"published": 1, "hidden": 0, "flag": true}));
        assert_eq!(row_bool(&r, "published"), Some(true));
        assert_eq!(row_bool(&r, "hidden"), Some(false));
        assert_eq!(row_bool(&r, "flag"), Some(true));
        assert_eq!(row_bool(&r, "missing"), None);
    }

    #[test]
    fn test_version_from_metadata() {
        let mut handler = MemoryDataHandler::new();
        handler.metadata.push(row(json!({
            "field_name": "client_build", "field_value": 561755
        })));
        assert_eq!(handler.get_version(), Some("561755".to_owned()));
    }

    #[test]
    fn test_version_absent() {
        let handler = MemoryDataHandler::new();
        assert_eq!(handler.get_version(), None);
    }
}
