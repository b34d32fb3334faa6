use connectors::error::ConnectorError;
use thiserror::Error;

/// Errors that abort a run outright. Fetch, conversion, write and load
/// failures are not here: they degrade into run-report entries so the
/// remaining independent steps still execute.
#[derive(Debug, Error)]
pub enum ExportRunError {
    /// A required input field is empty. Raised before any I/O happens.
    #[error("Missing required field '{0}'; fill in all fields and try again")]
    MissingField(&'static str),

    /// The connector could not even be constructed from the inputs.
    #[error("Connector error: {0}")]
    Connector(#[from] ConnectorError),
}
