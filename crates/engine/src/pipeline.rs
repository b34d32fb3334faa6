use crate::{
    error::ExportRunError,
    loader,
    report::{RunReport, Step},
    session::{ExportOptions, ExportSession},
};
use connectors::sql::{mysql::adapter::MySqlAdapter, query::SelectSplit};
use exporters::{
    artifact::ArtifactPaths,
    error::ExportError,
    sinks::{csv as csv_sink, gpkg::GeoPackage, shapefile as shapefile_sink},
};
use model::records::feature::{FeatureSet, PlainRecords};
use processing::{convert, stamp::Stamp};
use project::host::ProjectHost;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Runs one full export: fetch both subsets, convert, write the selected
/// sinks, load the artifacts into the project. Only incomplete input (and
/// a connector that cannot be built at all) aborts; every later failure
/// is recorded in the report and the remaining independent steps run.
pub async fn run(
    session: &ExportSession,
    host: &mut dyn ProjectHost,
) -> Result<RunReport, ExportRunError> {
    session.validate()?;

    let table = session.table.table.as_str();
    info!(
        "Exporting table '{table}' from {}",
        session.connection.endpoint()
    );

    let adapter = MySqlAdapter::new(&session.connection)?;
    let split = SelectSplit::new(&session.table);
    let paths = ArtifactPaths::new(&session.options.output_dir, table);
    let stamp = Stamp::today(session.exporter_identity());
    let mut report = RunReport::new(table);

    // Geometry-bearing track: fetch, convert, spatial sinks.
    let with_coords = match adapter.fetch_rowset(table, &split.with_coordinates()).await {
        Ok(rowset) => {
            report.rows_with_geometry = Some(rowset.len());
            report.step_ok(Step::FetchGeometry, Some(format!("{} rows", rowset.len())));
            Some(rowset)
        }
        Err(err) => {
            error!("Fetching the geometry subset failed: {err}");
            report.step_failed(Step::FetchGeometry, &err);
            None
        }
    };

    let features = with_coords.and_then(|rowset| {
        match convert::to_feature_set(&rowset, &stamp) {
            Ok(features) => {
                report.step_ok(Step::Convert, Some(format!("{} features", features.len())));
                Some(features)
            }
            Err(err) => {
                warn!("Geometry conversion produced no data: {err}");
                report.step_failed(Step::Convert, &err);
                None
            }
        }
    });

    if let Some(features) = &features {
        write_spatial(features, &paths, &session.options, &mut report);
    }

    // Null-coordinate track, always after the spatial one.
    let without_coords = match adapter
        .fetch_rowset(table, &split.without_coordinates())
        .await
    {
        Ok(rowset) => {
            report.rows_without_geometry = Some(rowset.len());
            report.step_ok(Step::FetchNull, Some(format!("{} rows", rowset.len())));
            Some(rowset)
        }
        Err(err) => {
            error!("Fetching the null-coordinate subset failed: {err}");
            report.step_failed(Step::FetchNull, &err);
            None
        }
    };

    if let Some(rowset) = &without_coords {
        if rowset.is_empty() {
            skip_null_sinks(&session.options, &mut report);
        } else {
            let plain = convert::to_plain_records(rowset, &stamp);
            write_null(&plain, &paths, &session.options, &mut report);
        }
    }

    let plans = loader::layer_plans(&paths, &session.options);
    loader::load_layers(host, plans, &mut report);

    info!("Export of '{table}' finished");
    Ok(report)
}

/// Spatial sinks for the geometry-bearing subset, per format flag.
/// Failures are loud, recorded, and do not stop the other sink.
pub(crate) fn write_spatial(
    features: &FeatureSet,
    paths: &ArtifactPaths,
    options: &ExportOptions,
    report: &mut RunReport,
) {
    if options.shapefile {
        match shapefile_sink::write_features(paths, features) {
            Ok(path) => {
                report.step_ok(Step::WriteShapefile, None);
                report.artifact(path.display().to_string());
            }
            Err(err) => {
                error!("Shapefile export failed: {err}");
                report.step_failed(Step::WriteShapefile, &err);
            }
        }
    }
    if options.geopackage {
        match write_gpkg_features(paths, features) {
            Ok(path) => {
                report.step_ok(Step::WriteGeopackageLayer, Some(paths.points_layer()));
                report.artifact(format!("{}|layername={}", path.display(), paths.points_layer()));
            }
            Err(err) => {
                error!("GeoPackage export failed: {err}");
                report.step_failed(Step::WriteGeopackageLayer, &err);
            }
        }
    }
}

/// Tabular sinks for the null-coordinate subset, per format flag. Only
/// called when the subset is non-empty.
pub(crate) fn write_null(
    records: &PlainRecords,
    paths: &ArtifactPaths,
    options: &ExportOptions,
    report: &mut RunReport,
) {
    if options.shapefile {
        let path = paths.null_csv();
        match csv_sink::write_plain_records(&path, records) {
            Ok(()) => {
                report.step_ok(Step::WriteNullCsv, None);
                report.artifact(path.display().to_string());
            }
            Err(err) => {
                error!("CSV export failed: {err}");
                report.step_failed(Step::WriteNullCsv, &err);
            }
        }
    }
    if options.geopackage {
        match write_gpkg_attributes(paths, records) {
            Ok(path) => {
                report.step_ok(Step::WriteNullTable, Some(paths.null_table()));
                report.artifact(format!("{}|layername={}", path.display(), paths.null_table()));
            }
            Err(err) => {
                error!("GeoPackage attribute export failed: {err}");
                report.step_failed(Step::WriteNullTable, &err);
            }
        }
    }
}

fn skip_null_sinks(options: &ExportOptions, report: &mut RunReport) {
    if options.shapefile {
        report.step_skipped(Step::WriteNullCsv, "no rows without coordinates");
    }
    if options.geopackage {
        report.step_skipped(Step::WriteNullTable, "no rows without coordinates");
    }
}

fn write_gpkg_features(paths: &ArtifactPaths, features: &FeatureSet) -> Result<PathBuf, ExportError> {
    let mut gpkg = GeoPackage::create_or_open(&paths.geopackage())?;
    gpkg.replace_feature_layer(&paths.points_layer(), features)?;
    gpkg.close()?;
    Ok(paths.geopackage())
}

fn write_gpkg_attributes(
    paths: &ArtifactPaths,
    records: &PlainRecords,
) -> Result<PathBuf, ExportError> {
    let mut gpkg = GeoPackage::create_or_open(&paths.geopackage())?;
    gpkg.replace_attribute_table(&paths.null_table(), records)?;
    gpkg.close()?;
    Ok(paths.geopackage())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Status;
    use chrono::NaiveDate;
    use model::{
        core::{
            data_type::DataType,
            value::{FieldValue, Value},
        },
        records::row::{ColumnDescriptor, RowData, RowSet},
    };
    use project::registry::MapProject;
    use std::path::Path;

    fn descriptor(name: &str, data_type: DataType) -> ColumnDescriptor {
        ColumnDescriptor {
            name: name.to_string(),
            data_type,
        }
    }

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            descriptor("id", DataType::Int),
            descriptor("lon", DataType::Double),
            descriptor("lat", DataType::Double),
            descriptor("x", DataType::Double),
            descriptor("y", DataType::Double),
        ]
    }

    fn coord_row(id: i64, lon: f64, lat: f64) -> RowData {
        RowData::new(
            "sensors",
            vec![
                FieldValue::new("id", Value::Int(id)),
                FieldValue::new("lon", Value::Float(lon)),
                FieldValue::new("lat", Value::Float(lat)),
                FieldValue::new("x", Value::Float(lon)),
                FieldValue::new("y", Value::Float(lat)),
            ],
        )
    }

    fn null_row(id: i64) -> RowData {
        RowData::new(
            "sensors",
            vec![
                FieldValue::new("id", Value::Int(id)),
                FieldValue {
                    name: "lon".into(),
                    value: None,
                    data_type: DataType::Double,
                },
                FieldValue::new("lat", Value::Float(48.2)),
                FieldValue {
                    name: "x".into(),
                    value: None,
                    data_type: DataType::Double,
                },
                FieldValue::new("y", Value::Float(48.2)),
            ],
        )
    }

    fn stamp() -> Stamp {
        Stamp::on("gis", NaiveDate::from_ymd_opt(2024, 3, 9).unwrap())
    }

    fn options(dir: &Path, shapefile: bool, geopackage: bool) -> ExportOptions {
        ExportOptions {
            output_dir: dir.to_path_buf(),
            shapefile,
            geopackage,
            exported_by: Some("gis".into()),
        }
    }

    /// Table `sensors`, 3 rows with coordinates and 1 without: expect a
    /// shapefile with 3 features and a one-row null CSV, both stamped,
    /// plus both layers in the project.
    #[test]
    fn sensors_scenario_produces_both_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");
        let options = options(dir.path(), true, false);
        let mut report = RunReport::new("sensors");
        let mut project = MapProject::in_memory();

        let with_coords = RowSet::new(
            "sensors",
            columns(),
            vec![
                coord_row(1, 13.4, 52.5),
                coord_row(2, 2.35, 48.85),
                coord_row(3, -0.12, 51.5),
            ],
        );
        let without_coords = RowSet::new("sensors", columns(), vec![null_row(4)]);

        let features = convert::to_feature_set(&with_coords, &stamp()).unwrap();
        write_spatial(&features, &paths, &options, &mut report);
        let plain = convert::to_plain_records(&without_coords, &stamp());
        write_null(&plain, &paths, &options, &mut report);
        loader::load_layers(&mut project, loader::layer_plans(&paths, &options), &mut report);

        let shapes = shapefile::read_as::<_, shapefile::Point, shapefile::dbase::Record>(
            paths.shapefile(),
        )
        .unwrap();
        assert_eq!(shapes.len(), 3);

        let mut reader = csv::Reader::from_path(paths.null_csv()).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(rows.len(), 1);

        assert!(!report.has_failures());
        assert_eq!(project.len(), 2);
        let names: Vec<_> = project.layers().map(|l| l.name.clone()).collect();
        assert_eq!(names, vec!["sensors Geometry", "sensors No Geometry"]);
    }

    #[test]
    fn all_rows_with_coordinates_produce_no_tabular_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");
        let options = options(dir.path(), true, false);
        let mut report = RunReport::new("sensors");

        skip_null_sinks(&options, &mut report);

        assert!(!paths.null_csv().exists());
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.steps[0].status, Status::Skipped);
    }

    #[test]
    fn repeated_runs_replace_artifacts_and_layers() {
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "sensors");
        let options = options(dir.path(), true, true);
        let mut project = MapProject::in_memory();

        let with_coords = RowSet::new(
            "sensors",
            columns(),
            vec![coord_row(1, 13.4, 52.5), coord_row(2, 2.35, 48.85)],
        );
        let features = convert::to_feature_set(&with_coords, &stamp()).unwrap();

        for _ in 0..2 {
            let mut report = RunReport::new("sensors");
            write_spatial(&features, &paths, &options, &mut report);
            loader::load_layers(&mut project, loader::layer_plans(&paths, &options), &mut report);
            assert!(!report.has_failures());
        }

        let shapes = shapefile::read_as::<_, shapefile::Point, shapefile::dbase::Record>(
            paths.shapefile(),
        )
        .unwrap();
        assert_eq!(shapes.len(), 2, "shapefile must be replaced, not appended");

        // With both formats on, the two spatial plans share a display
        // name, so replace-by-name leaves the last one loaded plus the
        // skipped null entries.
        assert_eq!(project.len(), 1);
    }

    #[test]
    fn write_failures_are_recorded_not_fatal() {
        let missing = Path::new("/nonexistent-output-dir");
        let paths = ArtifactPaths::new(missing, "sensors");
        let options = options(missing, true, true);
        let mut report = RunReport::new("sensors");

        let with_coords = RowSet::new("sensors", columns(), vec![coord_row(1, 13.4, 52.5)]);
        let features = convert::to_feature_set(&with_coords, &stamp()).unwrap();
        write_spatial(&features, &paths, &options, &mut report);

        assert!(report.has_failures());
        assert_eq!(report.steps.len(), 2, "both sinks attempted");
    }
}
