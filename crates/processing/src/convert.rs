use crate::{
    error::ConvertError,
    stamp::{EXPORTED_BY, EXPORTED_DATE, Stamp},
};
use geo_types::Point;
use model::{
    core::{
        data_type::DataType,
        value::{FieldValue, Value},
    },
    records::{
        feature::{FeatureSet, PlainRecords, PointFeature, WGS84_SRID},
        row::{ColumnDescriptor, RowSet},
    },
};
use tracing::debug;

/// Aliases the query builder attaches to the coordinate pair.
const X_ALIAS: &str = "x";
const Y_ALIAS: &str = "y";

/// Turns the geometry-bearing subset into a WGS84 point feature
/// collection: one point per row from the aliased x/y cells, the alias
/// columns dropped, and the export stamps appended.
///
/// Coordinates are taken as-is. There is no reprojection and no range
/// check; out-of-range lon/lat values pass through unchanged.
pub fn to_feature_set(rowset: &RowSet, stamp: &Stamp) -> Result<FeatureSet, ConvertError> {
    if rowset.is_empty() {
        return Err(ConvertError::NoData);
    }
    for alias in [X_ALIAS, Y_ALIAS] {
        if !rowset.has_column(alias) {
            return Err(ConvertError::MissingColumn(alias.to_string()));
        }
    }

    let mut features = Vec::with_capacity(rowset.len());
    for (idx, row) in rowset.rows.iter().enumerate() {
        let x = coordinate(row.get_value(X_ALIAS), idx, X_ALIAS)?;
        let y = coordinate(row.get_value(Y_ALIAS), idx, Y_ALIAS)?;

        let mut attributes = row.clone();
        attributes.drop_fields(&[X_ALIAS, Y_ALIAS]);
        stamp_row_fields(&mut attributes.field_values, stamp);

        features.push(PointFeature {
            point: Point::new(x, y),
            attributes: attributes.field_values,
        });
    }

    debug!(
        "Converted {} rows from '{}' into point features",
        features.len(),
        rowset.entity
    );

    Ok(FeatureSet {
        entity: rowset.entity.clone(),
        srid: WGS84_SRID,
        columns: stamped_columns(rowset),
        features,
    })
}

/// Reshapes the null-coordinate subset for the tabular sinks: the alias
/// columns are dropped and the same stamps appended. An empty subset is
/// not an error; the caller simply skips the sink.
pub fn to_plain_records(rowset: &RowSet, stamp: &Stamp) -> PlainRecords {
    let rows = rowset
        .rows
        .iter()
        .map(|row| {
            let mut plain = row.clone();
            plain.drop_fields(&[X_ALIAS, Y_ALIAS]);
            stamp_row_fields(&mut plain.field_values, stamp);
            plain
        })
        .collect();

    PlainRecords {
        entity: rowset.entity.clone(),
        columns: stamped_columns(rowset),
        rows,
    }
}

fn coordinate(value: Value, row: usize, column: &str) -> Result<f64, ConvertError> {
    value.as_f64().ok_or_else(|| ConvertError::BadCoordinate {
        row,
        column: column.to_string(),
    })
}

fn stamp_row_fields(fields: &mut Vec<FieldValue>, stamp: &Stamp) {
    fields.push(FieldValue::new(
        EXPORTED_BY,
        Value::String(stamp.exported_by.clone()),
    ));
    fields.push(FieldValue::new(
        EXPORTED_DATE,
        Value::Date(stamp.exported_date),
    ));
}

fn stamped_columns(rowset: &RowSet) -> Vec<ColumnDescriptor> {
    let mut columns: Vec<ColumnDescriptor> = rowset
        .columns
        .iter()
        .filter(|c| {
            !c.name.eq_ignore_ascii_case(X_ALIAS) && !c.name.eq_ignore_ascii_case(Y_ALIAS)
        })
        .cloned()
        .collect();
    columns.push(ColumnDescriptor {
        name: EXPORTED_BY.to_string(),
        data_type: DataType::VarChar,
    });
    columns.push(ColumnDescriptor {
        name: EXPORTED_DATE.to_string(),
        data_type: DataType::Date,
    });
    columns
}
