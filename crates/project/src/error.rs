use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The project registry file could not be read or written.
    #[error("Project file error: {0}")]
    Json(#[from] serde_json::Error),

    /// The layer source does not point at a loadable artifact.
    #[error("Invalid layer: {0}")]
    InvalidLayer(String),

    /// The GeoPackage container could not be opened.
    #[error("GeoPackage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The shapefile could not be opened.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// The delimited file could not be opened.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
