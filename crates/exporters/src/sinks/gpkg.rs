use crate::{encode, error::ExportError};
use geo_traits::to_geo::ToGeoGeometry;
use geo_types::Point;
use model::{
    core::{data_type::DataType, value::Value},
    records::feature::{FeatureSet, PlainRecords},
};
use rusqlite::{Connection, params_from_iter, types::Value as SqlValue};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// GeoPackage application id, "GPKG" as a big-endian u32.
const GPKG_APPLICATION_ID: i64 = 0x4750_4B47;
const GPKG_USER_VERSION: i64 = 10300;

const WGS84_DEFINITION: &str = "GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\",\
SPHEROID[\"WGS 84\",6378137,298.257223563,AUTHORITY[\"EPSG\",\"7030\"]],\
AUTHORITY[\"EPSG\",\"6326\"]],PRIMEM[\"Greenwich\",0,AUTHORITY[\"EPSG\",\"8901\"]],\
UNIT[\"degree\",0.0174532925199433,AUTHORITY[\"EPSG\",\"9122\"]],\
AUTHORITY[\"EPSG\",\"4326\"]]";

/// One GeoPackage container. Both the feature layer and the
/// null-coordinate attribute table of a run live in the same file.
///
/// Layer writes are replace-by-name: a previous table of the same name is
/// dropped and deregistered inside the same transaction, so re-running an
/// export never appends or duplicates.
pub struct GeoPackage {
    conn: Connection,
    path: PathBuf,
}

impl GeoPackage {
    pub fn create_or_open(path: &Path) -> Result<Self, ExportError> {
        let conn = Connection::open(path)?;
        let gpkg = GeoPackage {
            conn,
            path: path.to_path_buf(),
        };
        gpkg.ensure_core_tables()?;
        Ok(gpkg)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_core_tables(&self) -> Result<(), ExportError> {
        self.conn.execute_batch(&format!(
            "PRAGMA application_id = {GPKG_APPLICATION_ID};\n\
             PRAGMA user_version = {GPKG_USER_VERSION};\n\
             CREATE TABLE IF NOT EXISTS gpkg_spatial_ref_sys (\n\
                 srs_name TEXT NOT NULL,\n\
                 srs_id INTEGER PRIMARY KEY,\n\
                 organization TEXT NOT NULL,\n\
                 organization_coordsys_id INTEGER NOT NULL,\n\
                 definition TEXT NOT NULL,\n\
                 description TEXT\n\
             );\n\
             CREATE TABLE IF NOT EXISTS gpkg_contents (\n\
                 table_name TEXT NOT NULL PRIMARY KEY,\n\
                 data_type TEXT NOT NULL,\n\
                 identifier TEXT UNIQUE,\n\
                 description TEXT DEFAULT '',\n\
                 last_change DATETIME NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),\n\
                 min_x DOUBLE,\n\
                 min_y DOUBLE,\n\
                 max_x DOUBLE,\n\
                 max_y DOUBLE,\n\
                 srs_id INTEGER,\n\
                 CONSTRAINT fk_gc_r_srs_id FOREIGN KEY (srs_id)\n\
                     REFERENCES gpkg_spatial_ref_sys(srs_id)\n\
             );\n\
             CREATE TABLE IF NOT EXISTS gpkg_geometry_columns (\n\
                 table_name TEXT NOT NULL,\n\
                 column_name TEXT NOT NULL,\n\
                 geometry_type_name TEXT NOT NULL,\n\
                 srs_id INTEGER NOT NULL,\n\
                 z TINYINT NOT NULL,\n\
                 m TINYINT NOT NULL,\n\
                 CONSTRAINT pk_geom_cols PRIMARY KEY (table_name, column_name),\n\
                 CONSTRAINT fk_gc_tn FOREIGN KEY (table_name)\n\
                     REFERENCES gpkg_contents(table_name),\n\
                 CONSTRAINT fk_gc_srs FOREIGN KEY (srs_id)\n\
                     REFERENCES gpkg_spatial_ref_sys(srs_id)\n\
             );"
        ))?;

        self.conn.execute(
            "INSERT OR IGNORE INTO gpkg_spatial_ref_sys VALUES\n\
             ('Undefined Cartesian SRS', -1, 'NONE', -1, 'undefined', NULL),\n\
             ('Undefined Geographic SRS', 0, 'NONE', 0, 'undefined', NULL),\n\
             ('WGS 84 geodetic', 4326, 'EPSG', 4326, ?1, 'longitude/latitude in decimal degrees')",
            [WGS84_DEFINITION],
        )?;
        Ok(())
    }

    /// Drops and rewrites the named feature layer from the feature set.
    pub fn replace_feature_layer(
        &mut self,
        layer: &str,
        features: &FeatureSet,
    ) -> Result<(), ExportError> {
        if features.is_empty() {
            return Err(ExportError::NoData);
        }

        let tx = self.conn.transaction()?;
        deregister(&tx, layer)?;

        let mut ddl: Vec<String> = vec![
            "\"fid\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
            "\"geom\" POINT".to_string(),
        ];
        ddl.extend(
            features
                .columns
                .iter()
                .map(|c| format!("\"{}\" {}", c.name, sqlite_type(&c.data_type))),
        );
        tx.execute_batch(&format!(
            "CREATE TABLE \"{layer}\" ({});",
            ddl.join(", ")
        ))?;

        let bbox = bounding_box(features);
        tx.execute(
            "INSERT INTO gpkg_contents\n\
             (table_name, data_type, identifier, min_x, min_y, max_x, max_y, srs_id)\n\
             VALUES (?1, 'features', ?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![layer, bbox.0, bbox.1, bbox.2, bbox.3, features.srid],
        )?;
        tx.execute(
            "INSERT INTO gpkg_geometry_columns VALUES (?1, 'geom', 'POINT', ?2, 0, 0)",
            rusqlite::params![layer, features.srid],
        )?;

        let column_list = std::iter::once("\"geom\"".to_string())
            .chain(features.columns.iter().map(|c| format!("\"{}\"", c.name)))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=features.columns.len() + 1)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!("INSERT INTO \"{layer}\" ({column_list}) VALUES ({placeholders})");

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for feature in &features.features {
                let mut params: Vec<SqlValue> =
                    vec![SqlValue::Blob(geometry_blob(&feature.point, features.srid)?)];
                for column in &features.columns {
                    let value = feature
                        .attribute(&column.name)
                        .and_then(|f| f.value.as_ref());
                    params.push(sqlite_value(value));
                }
                stmt.execute(params_from_iter(params))?;
            }
        }
        tx.commit()?;

        info!(
            "Wrote {} features to layer '{layer}' in {}",
            features.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Drops and rewrites the null-coordinate attribute table.
    pub fn replace_attribute_table(
        &mut self,
        table: &str,
        records: &PlainRecords,
    ) -> Result<(), ExportError> {
        let tx = self.conn.transaction()?;
        deregister(&tx, table)?;

        let mut ddl: Vec<String> = vec!["\"fid\" INTEGER PRIMARY KEY AUTOINCREMENT".to_string()];
        ddl.extend(
            records
                .columns
                .iter()
                .map(|c| format!("\"{}\" {}", c.name, sqlite_type(&c.data_type))),
        );
        tx.execute_batch(&format!(
            "CREATE TABLE \"{table}\" ({});",
            ddl.join(", ")
        ))?;
        tx.execute(
            "INSERT INTO gpkg_contents (table_name, data_type, identifier, srs_id)\n\
             VALUES (?1, 'attributes', ?1, NULL)",
            [table],
        )?;

        let column_list = records
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = (1..=records.columns.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let insert_sql = format!("INSERT INTO \"{table}\" ({column_list}) VALUES ({placeholders})");

        {
            let mut stmt = tx.prepare(&insert_sql)?;
            for row in &records.rows {
                let params: Vec<SqlValue> = records
                    .columns
                    .iter()
                    .map(|column| {
                        sqlite_value(row.get(&column.name).and_then(|f| f.value.as_ref()))
                    })
                    .collect();
                stmt.execute(params_from_iter(params))?;
            }
        }
        tx.commit()?;

        debug!(
            "Wrote {} attribute rows to table '{table}' in {}",
            records.len(),
            self.path.display()
        );
        Ok(())
    }

    pub fn has_table(&self, name: &str) -> Result<bool, ExportError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn row_count(&self, table: &str) -> Result<usize, ExportError> {
        let count: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| {
                row.get(0)
            })?;
        Ok(count as usize)
    }

    /// Decodes every geometry of a feature layer, in fid order.
    pub fn read_points(&self, layer: &str) -> Result<Vec<Point<f64>>, ExportError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT \"geom\" FROM \"{layer}\" ORDER BY \"fid\""))?;
        let blobs = stmt
            .query_map([], |row| row.get::<_, Vec<u8>>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        blobs.iter().map(|blob| decode_point(blob)).collect()
    }

    /// Closes the container, releasing the file handle deterministically.
    pub fn close(self) -> Result<(), ExportError> {
        self.conn.close().map_err(|(_, err)| ExportError::Sqlite(err))
    }
}

fn deregister(tx: &rusqlite::Transaction<'_>, table: &str) -> Result<(), ExportError> {
    tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{table}\";"))?;
    tx.execute(
        "DELETE FROM gpkg_geometry_columns WHERE table_name = ?1",
        [table],
    )?;
    tx.execute("DELETE FROM gpkg_contents WHERE table_name = ?1", [table])?;
    Ok(())
}

fn bounding_box(features: &FeatureSet) -> (f64, f64, f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for feature in &features.features {
        min_x = min_x.min(feature.point.x());
        min_y = min_y.min(feature.point.y());
        max_x = max_x.max(feature.point.x());
        max_y = max_y.max(feature.point.y());
    }
    (min_x, min_y, max_x, max_y)
}

fn sqlite_type(data_type: &DataType) -> &'static str {
    match data_type {
        DataType::TinyInt
        | DataType::SmallInt
        | DataType::Int
        | DataType::BigInt
        | DataType::BigIntUnsigned
        | DataType::Year
        | DataType::Boolean => "INTEGER",
        DataType::Float | DataType::Double => "REAL",
        DataType::Date => "DATE",
        DataType::DateTime | DataType::Timestamp => "DATETIME",
        DataType::Blob | DataType::Geometry | DataType::Bit => "BLOB",
        _ => "TEXT",
    }
}

fn sqlite_value(value: Option<&Value>) -> SqlValue {
    let Some(value) = value else {
        return SqlValue::Null;
    };
    match value {
        Value::Null => SqlValue::Null,
        Value::Int(v) => SqlValue::Integer(*v),
        Value::Uint(v) => i64::try_from(*v)
            .map(SqlValue::Integer)
            .unwrap_or_else(|_| SqlValue::Text(v.to_string())),
        Value::Float(v) => SqlValue::Real(*v),
        Value::Boolean(v) => SqlValue::Integer(i64::from(*v)),
        Value::Bytes(v) => SqlValue::Blob(v.clone()),
        other => SqlValue::Text(encode::text_cell(Some(other))),
    }
}

/// Standard GeoPackage binary: "GP" magic, version 0, little-endian flags
/// without an envelope, the srs id, then the WKB geometry.
fn geometry_blob(point: &Point<f64>, srid: i32) -> Result<Vec<u8>, ExportError> {
    let mut blob = Vec::with_capacity(8 + 21);
    blob.extend_from_slice(b"GP");
    blob.push(0x00);
    blob.push(0x01);
    blob.extend_from_slice(&srid.to_le_bytes());
    wkb::writer::write_geometry(&mut blob, point, &wkb::writer::WriteOptions::default())
        .map_err(|e| ExportError::Wkb(e.to_string()))?;
    Ok(blob)
}

fn decode_point(blob: &[u8]) -> Result<Point<f64>, ExportError> {
    if blob.len() < 8 || &blob[0..2] != b"GP" {
        return Err(ExportError::Wkb("not a GeoPackage geometry blob".into()));
    }
    let envelope_len = match (blob[3] >> 1) & 0b111 {
        0 => 0,
        1 => 32,
        2 | 3 => 48,
        4 => 64,
        other => {
            return Err(ExportError::Wkb(format!(
                "invalid envelope indicator: {other}"
            )));
        }
    };
    let wkb_start = 8 + envelope_len;
    let geometry = wkb::reader::read_wkb(&blob[wkb_start..])
        .map_err(|e| ExportError::Wkb(e.to_string()))?
        .to_geometry();
    match geometry {
        geo_types::Geometry::Point(point) => Ok(point),
        other => Err(ExportError::Wkb(format!(
            "expected a point geometry, got {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use model::{
        core::value::FieldValue,
        records::{
            feature::{PointFeature, WGS84_SRID},
            row::{ColumnDescriptor, RowData},
        },
    };

    fn descriptor(name: &str, data_type: DataType) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type,
        }
    }

    fn feature_set() -> FeatureSet {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let points = [(13.4, 52.5), (2.35, 48.85), (-0.12, 51.5)];
        FeatureSet {
            entity: "sensors".into(),
            srid: WGS84_SRID,
            columns: vec![
                descriptor("id", DataType::Int),
                descriptor("exported_by", DataType::VarChar),
                descriptor("exported_date", DataType::Date),
            ],
            features: points
                .iter()
                .enumerate()
                .map(|(idx, (x, y))| PointFeature {
                    point: Point::new(*x, *y),
                    attributes: vec![
                        FieldValue::new("id", Value::Int(idx as i64 + 1)),
                        FieldValue::new("exported_by", Value::String("gis".into())),
                        FieldValue::new("exported_date", Value::Date(date)),
                    ],
                })
                .collect(),
        }
    }

    fn plain_records() -> PlainRecords {
        PlainRecords {
            entity: "sensors".into(),
            columns: vec![
                descriptor("id", DataType::Int),
                descriptor("exported_by", DataType::VarChar),
            ],
            rows: vec![RowData::new(
                "sensors",
                vec![
                    FieldValue::new("id", Value::Int(9)),
                    FieldValue::new("exported_by", Value::String("gis".into())),
                ],
            )],
        }
    }

    #[test]
    fn feature_layer_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut gpkg = GeoPackage::create_or_open(&dir.path().join("sensors.gpkg")).unwrap();

        gpkg.replace_feature_layer("sensors_points", &feature_set())
            .unwrap();

        assert!(gpkg.has_table("sensors_points").unwrap());
        assert_eq!(gpkg.row_count("sensors_points").unwrap(), 3);

        let points = gpkg.read_points("sensors_points").unwrap();
        assert!((points[0].x() - 13.4).abs() < 1e-9);
        assert!((points[0].y() - 52.5).abs() < 1e-9);

        let by: String = gpkg
            .conn
            .query_row(
                "SELECT exported_by FROM sensors_points WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(by, "gis");
    }

    #[test]
    fn rewriting_a_layer_replaces_it() {
        let dir = tempfile::tempdir().unwrap();
        let mut gpkg = GeoPackage::create_or_open(&dir.path().join("sensors.gpkg")).unwrap();

        gpkg.replace_feature_layer("sensors_points", &feature_set())
            .unwrap();
        gpkg.replace_feature_layer("sensors_points", &feature_set())
            .unwrap();

        assert_eq!(gpkg.row_count("sensors_points").unwrap(), 3);
        let registered: i64 = gpkg
            .conn
            .query_row(
                "SELECT COUNT(*) FROM gpkg_contents WHERE table_name = 'sensors_points'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(registered, 1, "layer must be registered exactly once");
    }

    #[test]
    fn attribute_table_is_registered_without_geometry() {
        let dir = tempfile::tempdir().unwrap();
        let mut gpkg = GeoPackage::create_or_open(&dir.path().join("sensors.gpkg")).unwrap();

        gpkg.replace_attribute_table("sensors_null_geom", &plain_records())
            .unwrap();
        gpkg.replace_attribute_table("sensors_null_geom", &plain_records())
            .unwrap();

        assert_eq!(gpkg.row_count("sensors_null_geom").unwrap(), 1);
        let data_type: String = gpkg
            .conn
            .query_row(
                "SELECT data_type FROM gpkg_contents WHERE table_name = 'sensors_null_geom'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(data_type, "attributes");
        let geom_rows: i64 = gpkg
            .conn
            .query_row(
                "SELECT COUNT(*) FROM gpkg_geometry_columns WHERE table_name = 'sensors_null_geom'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(geom_rows, 0);
    }

    #[test]
    fn empty_feature_set_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let mut gpkg = GeoPackage::create_or_open(&dir.path().join("sensors.gpkg")).unwrap();
        let mut features = feature_set();
        features.features.clear();

        assert!(matches!(
            gpkg.replace_feature_layer("sensors_points", &features),
            Err(ExportError::NoData)
        ));
    }
}
