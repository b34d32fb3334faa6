use crate::{error::ProjectError, layer::LayerSource};
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

/// Whether the artifact behind a source was produced at all. Conditional
/// outputs (the null-subset CSV, the GeoPackage null table) are checked
/// with this before a load is even attempted; for a table inside a
/// container, presence means the table itself exists.
pub fn artifact_present(source: &LayerSource) -> bool {
    match source {
        LayerSource::Shapefile(path) | LayerSource::Csv(path) => path.exists(),
        LayerSource::GeoPackage { path, layer } => {
            path.exists() && gpkg_has_table(path, layer).unwrap_or(false)
        }
    }
}

fn gpkg_has_table(path: &std::path::Path, layer: &str) -> Result<bool, ProjectError> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [layer],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Checks that a layer source actually opens before it is added to the
/// project, the way the host validates a layer on load. An artifact that
/// was written moments ago can still be invalid (truncated write, wrong
/// table name); the loader reports that per layer instead of aborting.
pub fn validate(source: &LayerSource) -> Result<(), ProjectError> {
    match source {
        LayerSource::Shapefile(path) => {
            let shapes = shapefile::read_shapes(path)?;
            debug!("Validated {} with {} shapes", path.display(), shapes.len());
            Ok(())
        }
        LayerSource::GeoPackage { path, layer } => {
            if !path.exists() {
                return Err(ProjectError::InvalidLayer(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            if !gpkg_has_table(path, layer)? {
                return Err(ProjectError::InvalidLayer(format!(
                    "{} has no layer '{layer}'",
                    path.display()
                )));
            }
            Ok(())
        }
        LayerSource::Csv(path) => {
            let mut reader = csv::Reader::from_path(path)?;
            reader.headers()?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{fs, path::PathBuf};

    #[test]
    fn missing_shapefile_is_invalid() {
        let source = LayerSource::Shapefile(PathBuf::from("/nonexistent/gone.shp"));
        assert!(validate(&source).is_err());
    }

    #[test]
    fn csv_with_headers_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensors_null.csv");
        fs::write(&path, "id,exported_by\n4,gis\n").unwrap();

        assert!(validate(&LayerSource::Csv(path)).is_ok());
    }

    #[test]
    fn geopackage_without_the_layer_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sensors.gpkg");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("CREATE TABLE other (id INTEGER);").unwrap();
        drop(conn);

        let source = LayerSource::GeoPackage {
            path,
            layer: "sensors_points".into(),
        };
        assert!(matches!(
            validate(&source),
            Err(ProjectError::InvalidLayer(_))
        ));
    }
}
