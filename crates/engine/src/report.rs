use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::{self, Display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    FetchGeometry,
    FetchNull,
    Convert,
    WriteShapefile,
    WriteGeopackageLayer,
    WriteNullCsv,
    WriteNullTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Failed,
    Skipped,
}

impl Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Step::FetchGeometry => "fetch geometry subset",
            Step::FetchNull => "fetch null subset",
            Step::Convert => "convert to features",
            Step::WriteShapefile => "write shapefile",
            Step::WriteGeopackageLayer => "write geopackage layer",
            Step::WriteNullCsv => "write null csv",
            Step::WriteNullTable => "write null table",
        };
        f.write_str(label)
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Status::Ok => "ok",
            Status::Failed => "failed",
            Status::Skipped => "skipped",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub step: Step,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerOutcome {
    pub name: String,
    pub source: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// What one run did, step by step. This is the user-visible surface of
/// the degradation taxonomy: failed steps land here instead of aborting
/// the run, and the CLI prints the whole thing at the end.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub table: String,
    pub started: DateTime<Utc>,
    pub rows_with_geometry: Option<usize>,
    pub rows_without_geometry: Option<usize>,
    pub steps: Vec<StepOutcome>,
    pub artifacts: Vec<String>,
    pub layers: Vec<LayerOutcome>,
}

impl RunReport {
    pub fn new(table: &str) -> Self {
        RunReport {
            table: table.to_string(),
            started: Utc::now(),
            rows_with_geometry: None,
            rows_without_geometry: None,
            steps: Vec::new(),
            artifacts: Vec::new(),
            layers: Vec::new(),
        }
    }

    pub fn step_ok(&mut self, step: Step, detail: Option<String>) {
        self.steps.push(StepOutcome {
            step,
            status: Status::Ok,
            detail,
        });
    }

    pub fn step_skipped(&mut self, step: Step, detail: &str) {
        self.steps.push(StepOutcome {
            step,
            status: Status::Skipped,
            detail: Some(detail.to_string()),
        });
    }

    pub fn step_failed(&mut self, step: Step, err: &dyn Display) {
        self.steps.push(StepOutcome {
            step,
            status: Status::Failed,
            detail: Some(err.to_string()),
        });
    }

    pub fn artifact(&mut self, path: impl Into<String>) {
        self.artifacts.push(path.into());
    }

    pub fn layer_loaded(&mut self, name: &str, source: &str) {
        self.layers.push(LayerOutcome {
            name: name.to_string(),
            source: source.to_string(),
            status: Status::Ok,
            detail: None,
        });
    }

    pub fn layer_skipped(&mut self, name: &str, source: &str, detail: &str) {
        self.layers.push(LayerOutcome {
            name: name.to_string(),
            source: source.to_string(),
            status: Status::Skipped,
            detail: Some(detail.to_string()),
        });
    }

    pub fn layer_failed(&mut self, name: &str, source: &str, err: &dyn Display) {
        self.layers.push(LayerOutcome {
            name: name.to_string(),
            source: source.to_string(),
            status: Status::Failed,
            detail: Some(err.to_string()),
        });
    }

    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(|s| s.status == Status::Failed)
            || self.layers.iter().any(|l| l.status == Status::Failed)
    }
}
