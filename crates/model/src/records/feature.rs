use crate::{
    core::value::FieldValue,
    records::row::{ColumnDescriptor, RowData},
};
use geo_types::Point;

/// The only coordinate reference system this tool produces. Sources carry
/// plain lon/lat column pairs with no CRS of their own, so the exported
/// collections are tagged WGS84 without reprojection.
pub const WGS84_SRID: i32 = 4326;

/// One exported row with its derived point geometry. The attributes never
/// contain the raw coordinate columns; those are consumed when the point
/// is built.
#[derive(Debug, Clone)]
pub struct PointFeature {
    pub point: Point<f64>,
    pub attributes: Vec<FieldValue>,
}

impl PointFeature {
    pub fn attribute(&self, name: &str) -> Option<&FieldValue> {
        self.attributes
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

/// A geometry-bearing record collection ready for a spatial sink.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    pub entity: String,
    pub srid: i32,
    pub columns: Vec<ColumnDescriptor>,
    pub features: Vec<PointFeature>,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }
}

/// The null-coordinate subset after the coordinate columns were dropped
/// and the export stamps added. Same row shape as a query result, but the
/// invariant above already holds.
#[derive(Debug, Clone)]
pub struct PlainRecords {
    pub entity: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RowData>,
}

impl PlainRecords {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
