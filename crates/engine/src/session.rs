use crate::error::ExportRunError;
use model::spec::{ConnectionConfig, TableSpec};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which sinks to run and where the artifacts land.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub shapefile: bool,
    pub geopackage: bool,
    /// Exporter identity stamped into every record. Defaults to the
    /// database user when unset.
    pub exported_by: Option<String>,
}

/// Everything one export run needs, built per invocation and discarded
/// afterwards. There is no shared state between runs; re-running with the
/// same session values reproduces the same artifacts.
#[derive(Debug, Clone)]
pub struct ExportSession {
    pub connection: ConnectionConfig,
    pub table: TableSpec,
    pub options: ExportOptions,
}

impl ExportSession {
    /// Presence-only validation, the only abort-class check. Values are
    /// not interpreted here; a wrong password surfaces later as a fetch
    /// failure, not an input error.
    pub fn validate(&self) -> Result<(), ExportRunError> {
        let required: [(&'static str, &str); 7] = [
            ("host", &self.connection.host),
            ("user", &self.connection.user),
            ("password", &self.connection.password),
            ("database", &self.connection.database),
            ("table", &self.table.table),
            ("x-column", &self.table.x_column),
            ("y-column", &self.table.y_column),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(ExportRunError::MissingField(field));
            }
        }
        if self.options.output_dir.as_os_str().is_empty() {
            return Err(ExportRunError::MissingField("output-dir"));
        }
        Ok(())
    }

    pub fn exporter_identity(&self) -> &str {
        self.options
            .exported_by
            .as_deref()
            .unwrap_or(&self.connection.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ExportSession {
        ExportSession {
            connection: ConnectionConfig {
                host: "localhost".into(),
                port: 3306,
                user: "gis".into(),
                password: "secret".into(),
                database: "telemetry".into(),
            },
            table: TableSpec::new("sensors", "lon", "lat"),
            options: ExportOptions {
                output_dir: PathBuf::from("/tmp/out"),
                shapefile: true,
                geopackage: false,
                exported_by: None,
            },
        }
    }

    #[test]
    fn complete_session_validates() {
        assert!(session().validate().is_ok());
    }

    #[test]
    fn blank_field_aborts() {
        let mut session = session();
        session.connection.host = "  ".into();
        assert!(matches!(
            session.validate(),
            Err(ExportRunError::MissingField("host"))
        ));
    }

    #[test]
    fn identity_falls_back_to_db_user() {
        let mut session = session();
        assert_eq!(session.exporter_identity(), "gis");
        session.options.exported_by = Some("surveyor".into());
        assert_eq!(session.exporter_identity(), "surveyor");
    }
}
