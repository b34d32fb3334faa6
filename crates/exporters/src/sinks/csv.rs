use crate::{encode, error::ExportError};
use model::records::feature::PlainRecords;
use std::path::Path;
use tracing::info;

/// Writes the null-coordinate subset as a flat delimited file. The caller
/// only invokes this when the subset is non-empty; an empty set here is
/// still refused so the artifact never exists without rows.
pub fn write_plain_records(path: &Path, records: &PlainRecords) -> Result<(), ExportError> {
    if records.is_empty() {
        return Err(ExportError::NoData);
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(records.columns.iter().map(|c| c.name.as_str()))?;
    for row in &records.rows {
        let cells: Vec<String> = records
            .columns
            .iter()
            .map(|column| encode::text_cell(row.get(&column.name).and_then(|f| f.value.as_ref())))
            .collect();
        writer.write_record(&cells)?;
    }
    writer.flush()?;
    drop(writer);

    info!("Wrote {} rows to {}", records.len(), path.display());
    Ok(())
}
