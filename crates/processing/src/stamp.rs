use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Column holding the exporter identity in every exported record.
pub const EXPORTED_BY: &str = "exported_by";
/// Column holding the export date (calendar date, no time component).
pub const EXPORTED_DATE: &str = "exported_date";

/// Export provenance added to every record of both subsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stamp {
    pub exported_by: String,
    pub exported_date: NaiveDate,
}

impl Stamp {
    /// Stamp for a run happening now: today's calendar date.
    pub fn today(exported_by: &str) -> Self {
        Stamp {
            exported_by: exported_by.to_string(),
            exported_date: Utc::now().date_naive(),
        }
    }

    pub fn on(exported_by: &str, exported_date: NaiveDate) -> Self {
        Stamp {
            exported_by: exported_by.to_string(),
            exported_date,
        }
    }
}
