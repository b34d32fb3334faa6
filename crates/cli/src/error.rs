use connectors::error::DbError;
use engine::error::ExportRunError;
use project::error::ProjectError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to run the export: {0}")]
    Run(#[from] ExportRunError),

    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
