use crate::{artifact::ArtifactPaths, encode, error::ExportError, sinks::dbf_field_names};
use chrono::Datelike;
use model::{
    core::{data_type::DataType, value::Value},
    records::feature::FeatureSet,
};
use shapefile::dbase::{self, FieldName, Record, TableWriterBuilder};
use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
};
use tracing::{debug, info};

/// The CRS sidecar content for every file this sink writes.
const WGS84_PRJ: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",\
SPHEROID[\"WGS_84\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],\
UNIT[\"Degree\",0.0174532925199433]]";

const SIDECAR_EXTENSIONS: [&str; 4] = ["shp", "shx", "dbf", "prj"];

/// Writes the feature set as an ESRI shapefile at `{dir}/{table}.shp`.
///
/// Any pre-existing file of the set is deleted first; the format driver
/// would otherwise append into stale sidecars. The call returns only
/// after every sidecar handle has been flushed and synced, so completion
/// itself is the release signal downstream loaders wait on.
pub fn write_features(paths: &ArtifactPaths, features: &FeatureSet) -> Result<PathBuf, ExportError> {
    if features.is_empty() {
        return Err(ExportError::NoData);
    }

    let shp_path = paths.shapefile();
    remove_existing(&shp_path)?;

    let names: Vec<String> = features.columns.iter().map(|c| c.name.clone()).collect();
    let short_names = dbf_field_names(&names);

    let mut builder = TableWriterBuilder::new();
    for (column, short) in features.columns.iter().zip(&short_names) {
        let field_name = FieldName::try_from(short.as_str())
            .map_err(|e| ExportError::FieldName(format!("{short}: {e:?}")))?;
        builder = add_field(builder, field_name, &column.data_type);
    }

    let mut writer = shapefile::Writer::from_path(&shp_path, builder)?;
    for feature in &features.features {
        let mut record = Record::default();
        for (column, short) in features.columns.iter().zip(&short_names) {
            let value = feature
                .attribute(&column.name)
                .and_then(|f| f.value.as_ref());
            record.insert(short.clone(), dbase_value(value, &column.data_type));
        }
        let shape = shapefile::Point::new(feature.point.x(), feature.point.y());
        writer.write_shape_and_record(&shape, &record)?;
    }
    drop(writer);

    fs::write(shp_path.with_extension("prj"), WGS84_PRJ)?;
    sync_sidecars(&shp_path)?;

    info!(
        "Wrote {} features to {}",
        features.len(),
        shp_path.display()
    );
    Ok(shp_path)
}

fn add_field(
    builder: TableWriterBuilder,
    name: FieldName,
    data_type: &DataType,
) -> TableWriterBuilder {
    match data_type {
        DataType::TinyInt
        | DataType::SmallInt
        | DataType::Int
        | DataType::BigInt
        | DataType::BigIntUnsigned
        | DataType::Year => builder.add_numeric_field(name, 18, 0),
        DataType::Decimal | DataType::Float | DataType::Double => {
            builder.add_numeric_field(name, 24, 10)
        }
        DataType::Boolean => builder.add_logical_field(name),
        DataType::Date => builder.add_date_field(name),
        _ => builder.add_character_field(name, 254),
    }
}

fn dbase_value(value: Option<&Value>, data_type: &DataType) -> dbase::FieldValue {
    match data_type {
        DataType::TinyInt
        | DataType::SmallInt
        | DataType::Int
        | DataType::BigInt
        | DataType::BigIntUnsigned
        | DataType::Year
        | DataType::Decimal
        | DataType::Float
        | DataType::Double => dbase::FieldValue::Numeric(value.and_then(Value::as_f64)),
        DataType::Boolean => dbase::FieldValue::Logical(value.and_then(|v| match v {
            Value::Boolean(b) => Some(*b),
            Value::Int(i) => Some(*i != 0),
            _ => None,
        })),
        DataType::Date => dbase::FieldValue::Date(value.and_then(|v| match v {
            Value::Date(d) => Some(dbase::Date::new(d.day(), d.month(), d.year() as u32)),
            _ => None,
        })),
        _ => {
            let text = encode::text_cell(value);
            if text.is_empty() {
                dbase::FieldValue::Character(None)
            } else {
                dbase::FieldValue::Character(Some(text))
            }
        }
    }
}

fn remove_existing(shp_path: &Path) -> Result<(), ExportError> {
    for ext in SIDECAR_EXTENSIONS {
        let sidecar = shp_path.with_extension(ext);
        if sidecar.exists() {
            debug!("Removing stale artifact {}", sidecar.display());
            fs::remove_file(&sidecar)?;
        }
    }
    Ok(())
}

fn sync_sidecars(shp_path: &Path) -> Result<(), ExportError> {
    for ext in SIDECAR_EXTENSIONS {
        let sidecar = shp_path.with_extension(ext);
        if sidecar.exists() {
            OpenOptions::new().write(true).open(&sidecar)?.sync_all()?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use geo_types::Point;
    use model::{
        core::value::FieldValue,
        records::{
            feature::{PointFeature, WGS84_SRID},
            row::ColumnDescriptor,
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
        let features = points
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
            .collect();
        FeatureSet {
            entity: "sensors".into(),
            srid: WGS84_SRID,
            columns: vec![
                descriptor("id", DataType::Int),
                descriptor("exported_by", DataType::VarChar),
                descriptor("exported_date", DataType::Date),
            ],
            features,
        }
    }

    #[test]
    fn round_trips_count_positions_and_stamps() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");

        let written = write_features(&paths, &feature_set()).unwrap();
        assert!(written.with_extension("prj").exists());

        let shapes = shapefile::read_as::<_, shapefile::Point, Record>(&written).unwrap();
        assert_eq!(shapes.len(), 3);

        let (point, record) = &shapes[0];
        assert!((point.x - 13.4).abs() < 1e-9);
        assert!((point.y - 52.5).abs() < 1e-9);

        // Field names live under their 10-byte dBase truncation.
        match record.get("exported_b") {
            Some(dbase::FieldValue::Character(Some(by))) => assert_eq!(by, "gis"),
            other => panic!("unexpected exported_by field: {other:?}"),
        }
        match record.get("exported_d") {
            Some(dbase::FieldValue::Date(Some(date))) => {
                assert_eq!((date.year(), date.month(), date.day()), (2024, 3, 9));
            }
            other => panic!("unexpected exported_date field: {other:?}"),
        }
    }

    #[test]
    fn rewrites_replace_the_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");

        write_features(&paths, &feature_set()).unwrap();
        write_features(&paths, &feature_set()).unwrap();

        let shapes =
            shapefile::read_as::<_, shapefile::Point, Record>(paths.shapefile()).unwrap();
        assert_eq!(shapes.len(), 3, "second write must replace, not append");
    }

    #[test]
    fn empty_set_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");
        let mut features = feature_set();
        features.features.clear();

        assert!(matches!(
            write_features(&paths, &features),
            Err(ExportError::NoData)
        ));
        assert!(!paths.shapefile().exists());
    }
}
