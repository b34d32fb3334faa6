use std::string::FromUtf8Error;
use thiserror::Error;

/// All errors coming from the database/query layer.
#[derive(Debug, Error)]
pub enum DbError {
    /// Any MySQL/MariaDB driver error.
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// UTF-8 decoding failed on some byte data.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] FromUtf8Error),

    /// A cell could not be decoded into a model value.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The driver returned a result set without column descriptors.
    #[error("Query '{0}' produced no column metadata")]
    NoColumns(String),
}

/// Errors happening during connection setup.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The driver rejected the connection options.
    #[error("MySQL connector creation failed: {0}")]
    MySql(#[from] mysql_async::Error),
}
