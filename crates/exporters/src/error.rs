use thiserror::Error;

/// All errors coming from the file sinks. Writes fail loudly and are
/// never retried; the pipeline decides what still runs afterwards.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Low-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The ESRI format driver rejected the write.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// An attribute name could not be turned into a dBase field name.
    #[error("Invalid dBase field name: {0}")]
    FieldName(String),

    /// The GeoPackage container rejected the write.
    #[error("GeoPackage error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Geometry could not be encoded as WKB.
    #[error("WKB encoding error: {0}")]
    Wkb(String),

    /// The CSV writer rejected the write.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// There is nothing to write.
    #[error("No data available to write")]
    NoData,
}
