use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::info;

use crate::report::DomainResults;
use crate::store::OsClass;

const DATE_DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const SHEET_COLUMNS: [&str; 5] = ["OS", "Domain", "Agent Name", "Status", "Last Available Date"];

#[derive(Debug, Serialize)]
struct SheetRow<'a> {
    os: &'a str,
    domain: &'a str,
    agent_name: &'a str,
    status: &'a str,
    last_available: String,
}

fn format_last_seen(timestamp: Option<&NaiveDateTime>) -> String {
    timestamp
        .map(|ts| ts.format(DATE_DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Write one spreadsheet-style CSV per OS class.
///
/// Columns follow [`SHEET_COLUMNS`]; available rows come first, then the
/// not-available rows, each group sorted by agent name. The `Status` column
/// is the flag that marks unavailable rows.
pub fn write_sheet_reports(
    reports_dir: &Path,
    base_name: &str,
    sections: &[(OsClass, &DomainResults)],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    for (os, results) in sections {
        let path = reports_dir.join(format!("{base_name}_{}.csv", os.slug()));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .with_context(|| format!("Failed to create sheet report at {}", path.display()))?;

        writer.write_record(SHEET_COLUMNS)?;

        for (domain, result) in results.iter() {
            for agent in &result.available {
                writer.serialize(SheetRow {
                    os: os.label(),
                    domain,
                    agent_name: agent,
                    status: "Available",
                    last_available: format_last_seen(result.last_seen.get(agent)),
                })?;
            }
            for agent in &result.not_available {
                writer.serialize(SheetRow {
                    os: os.label(),
                    domain,
                    agent_name: agent,
                    status: "Not Available",
                    last_available: format_last_seen(result.last_seen.get(agent)),
                })?;
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to write sheet report at {}", path.display()))?;

        info!(action = "write", component = "sheet_report", os = os.label(), path = ?path, "Sheet report written");
        written.push(path);
    }

    Ok(written)
}

/// Write the Markdown document report: one section per OS/domain pair with
/// the unavailable-host table and the availability percentage.
pub fn write_document_report(
    reports_dir: &Path,
    base_name: &str,
    sections: &[(OsClass, &DomainResults)],
    generated_at: NaiveDateTime,
) -> Result<PathBuf> {
    let mut out = String::new();

    out.push_str("# AGENT AVAILABILITY REPORT\n\n");
    out.push_str(&format!(
        "Generated: {}\n",
        generated_at.format(DATE_DISPLAY_FORMAT)
    ));

    for (os, results) in sections {
        for (domain, result) in results.iter() {
            out.push_str(&format!("\n## {} - {}\n\n", os.label(), domain));

            if result.not_available.is_empty() {
                out.push_str("No unavailable hosts.\n");
            } else {
                out.push_str("Unavailable Hosts:\n\n");
                out.push_str("| Agent Name | Last Available Date |\n");
                out.push_str("| --- | --- |\n");
                for agent in &result.not_available {
                    out.push_str(&format!(
                        "| {} | {} |\n",
                        agent,
                        format_last_seen(result.last_seen.get(agent))
                    ));
                }
            }

            out.push_str(&format!(
                "\n**Availability:** {:.1}%\n",
                result.percentage()
            ));
        }
    }

    let path = reports_dir.join(format!("{base_name}.md"));
    fs::write(&path, out)
        .with_context(|| format!("Failed to write document report at {}", path.display()))?;

    info!(action = "write", component = "document_report", path = ?path, "Document report written");
    Ok(path)
}
