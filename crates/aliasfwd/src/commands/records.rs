//! Records command handlers.

use tabled::Tabled;

use aliasfwd_core::ForwardingRecord;

use crate::cli::{GlobalOpts, RecordsArgs, RecordsCommand};
use crate::error::CliError;
use crate::output;

use super::{App, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecordRow {
    #[tabled(rename = "Record ID")]
    id: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Forward To")]
    target: String,
    #[tabled(rename = "Modified")]
    modified: String,
}

impl From<&ForwardingRecord> for RecordRow {
    fn from(r: &ForwardingRecord) -> Self {
        Self {
            id: r.record_id.to_string(),
            alias: r.alias.clone(),
            target: util::or_dash(r.target.as_deref()),
            modified: r.modified_on.map_or_else(
                || "-".into(),
                |t| t.format("%Y-%m-%d %H:%M").to_string(),
            ),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: RecordsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        RecordsCommand::List => {
            let records = app.list_forwarding_records().await?;
            let out = output::render_list(
                &global.output,
                &records,
                |r| RecordRow::from(r),
                |r| r.record_id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
