use crate::core::{
    data_type::DataType,
    value::{FieldValue, Value},
};
use serde::{Deserialize, Serialize};

/// Name and type of one result-set column, in select order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowData {
    pub entity: String,
    pub field_values: Vec<FieldValue>,
}

impl RowData {
    pub fn new(entity: &str, field_values: Vec<FieldValue>) -> Self {
        RowData {
            entity: entity.to_string(),
            field_values,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.field_values
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(field))
    }

    pub fn get_value(&self, field: &str) -> Value {
        self.get(field)
            .and_then(|f| f.value.clone())
            .unwrap_or(Value::Null)
    }

    /// Removes every field whose name matches one of `names`
    /// (case-insensitive), preserving the order of the rest.
    pub fn drop_fields(&mut self, names: &[&str]) {
        self.field_values
            .retain(|f| !names.iter().any(|n| f.name.eq_ignore_ascii_case(n)));
    }

    pub fn push_field(&mut self, field: FieldValue) {
        self.field_values.push(field);
    }
}

/// The fully materialized result of one query: ordered rows plus the
/// column descriptors the driver reported for them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowSet {
    pub entity: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RowData>,
}

impl RowSet {
    pub fn new(entity: &str, columns: Vec<ColumnDescriptor>, rows: Vec<RowData>) -> Self {
        RowSet {
            entity: entity.to_string(),
            columns,
            rows,
        }
    }

    pub fn empty(entity: &str) -> Self {
        RowSet::new(entity, Vec::new(), Vec::new())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name.eq_ignore_ascii_case(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> RowData {
        RowData::new(
            "sensors",
            vec![
                FieldValue::new("id", Value::Int(1)),
                FieldValue::new("LON", Value::Float(13.4)),
                FieldValue::new("lat", Value::Float(52.5)),
            ],
        )
    }

    #[test]
    fn get_is_case_insensitive() {
        let row = row();
        assert_eq!(row.get_value("lon"), Value::Float(13.4));
        assert_eq!(row.get_value("missing"), Value::Null);
    }

    #[test]
    fn drop_fields_preserves_remaining_order() {
        let mut row = row();
        row.drop_fields(&["lon", "LAT"]);
        let names: Vec<_> = row.field_values.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id"]);
    }
}
