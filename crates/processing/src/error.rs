use thiserror::Error;

/// Errors raised while reshaping fetched rows into exportable records.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The geometry-bearing subset came back empty; there is nothing to
    /// convert and no spatial artifact to produce.
    #[error("No data available to convert")]
    NoData,

    /// The result set is missing one of the aliased coordinate columns.
    #[error("Result set must contain the '{0}' column")]
    MissingColumn(String),

    /// A coordinate cell could not be read as a number.
    #[error("Row {row}: column '{column}' is not a numeric coordinate")]
    BadCoordinate { row: usize, column: String },
}
