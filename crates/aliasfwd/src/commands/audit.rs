//! Audit command handler.

use std::fmt::Write;

use tabled::Tabled;

use aliasfwd_core::{AuditFinding, AuditReport, RecordId};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::App;

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&AuditFinding> for FindingRow {
    fn from(f: &AuditFinding) -> Self {
        let detail = match f {
            AuditFinding::MissingRecord { user, .. } => {
                format!("user '{user}' has no forwarding record")
            }
            AuditFinding::StaleCache {
                user,
                cached,
                actual,
                ..
            } => format!("user '{user}' caches {cached}, provider has {actual}"),
            AuditFinding::Uncached {
                user, record_id, ..
            } => format!("user '{user}' has no cached id ({record_id})"),
            AuditFinding::DuplicateRecords { record_ids, .. } => {
                let ids: Vec<&str> = record_ids.iter().map(RecordId::as_str).collect();
                format!("records {}", ids.join(", "))
            }
            AuditFinding::TargetDrift {
                user,
                local,
                provider,
                ..
            } => format!(
                "user '{user}' saved {}, provider forwards to {}",
                local.as_deref().unwrap_or("(none)"),
                provider.as_deref().unwrap_or("(none)")
            ),
            AuditFinding::Orphan { record_id, .. } => {
                format!("record {record_id} has no owner")
            }
        };
        Self {
            kind: f.kind(),
            alias: f.alias().to_owned(),
            detail,
        }
    }
}

fn summary(report: &AuditReport) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        "Checked {} profiles against {} records: ",
        report.profiles_checked, report.records_scanned
    );
    if report.is_clean() {
        out.push_str("no findings");
    } else {
        let _ = write!(out, "{} finding(s)", report.findings.len());
    }
    out
}

pub async fn handle(app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    let report = app.audit().await?;

    match global.output {
        OutputFormat::Table => {
            if !report.is_clean() {
                let table = output::render_list(
                    &global.output,
                    &report.findings,
                    |f| FindingRow::from(f),
                    |f| f.alias().to_owned(),
                );
                output::print_output(&table, global.quiet);
            }
            output::print_output(&summary(&report), global.quiet);
        }
        OutputFormat::Plain => {
            let lines: Vec<String> = report
                .findings
                .iter()
                .map(|f| format!("{}\t{}", f.kind(), f.alias()))
                .collect();
            output::print_output(&lines.join("\n"), global.quiet);
        }
        _ => {
            let out = output::render_single(&global.output, &report, summary, summary);
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
