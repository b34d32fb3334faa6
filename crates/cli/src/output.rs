use crate::error::CliError;
use engine::report::RunReport;

pub fn print_report(report: &RunReport, as_json: bool) -> Result<(), CliError> {
    if as_json {
        let json = serde_json::to_string_pretty(report).map_err(CliError::JsonSerialize)?;
        println!("{json}");
        return Ok(());
    }
    print_report_table(report);
    Ok(())
}

fn print_report_table(report: &RunReport) {
    println!("Export report for table '{}':", report.table);
    println!("-----------------------------");
    if let Some(count) = report.rows_with_geometry {
        println!("{:<24} {count}", "Rows with geometry");
    }
    if let Some(count) = report.rows_without_geometry {
        println!("{:<24} {count}", "Rows without geometry");
    }

    if !report.steps.is_empty() {
        println!("Steps:");
        for step in &report.steps {
            let detail = step.detail.as_deref().unwrap_or("");
            println!("  {:<26} {:<8} {detail}", step.step.to_string(), step.status.to_string());
        }
    }

    if !report.artifacts.is_empty() {
        println!("Artifacts:");
        for artifact in &report.artifacts {
            println!("  {artifact}");
        }
    }

    if !report.layers.is_empty() {
        println!("Layers:");
        for layer in &report.layers {
            let detail = layer.detail.as_deref().unwrap_or("");
            println!(
                "  {:<26} {:<8} {} {detail}",
                layer.name,
                layer.status.to_string(),
                layer.source
            );
        }
    }
}
