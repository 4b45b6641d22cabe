//! Forwarding command handlers.

use std::fmt::Write;

use aliasfwd_core::{AliasStatus, ForwardTarget, ForwardingChange, Outcome, RecordId};

use crate::cli::{ForwardArgs, ForwardCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::{App, util};

fn change_detail(c: &ForwardingChange) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", c.message);
    let _ = writeln!(out, "  Alias:       {}", c.alias);
    let _ = writeln!(out, "  DNS record:  {}", c.record_id);
    let _ = write!(out, "  TXT content: {}", c.content);
    out
}

fn status_detail(s: &AliasStatus) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User:        {}", s.user_id);
    let _ = writeln!(out, "Address:     {}", s.address);
    let _ = writeln!(
        out,
        "Forward to:  {}",
        s.forward_to.as_ref().map_or("(local delivery)", ForwardTarget::as_str)
    );
    let _ = write!(
        out,
        "DNS record:  {}",
        s.dns_record_id
            .as_ref()
            .map_or("(not cached)", RecordId::as_str)
    );
    out
}

fn emit_change(outcome: &Outcome<ForwardingChange>, global: &GlobalOpts) {
    util::emit_outcome(outcome, global, change_detail, |c| c.record_id.to_string());
}

pub async fn handle(app: &App, args: ForwardArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ForwardCommand::Set { user, target } => {
            let user = util::parse_user(&user)?;
            let target = util::parse_target(Some(&target))?;
            let outcome = app.set_forwarding(&user, target).await?;
            emit_change(&outcome, global);
            Ok(())
        }

        ForwardCommand::Clear { user } => {
            let user = util::parse_user(&user)?;
            let outcome = app.set_forwarding(&user, None).await?;
            emit_change(&outcome, global);
            Ok(())
        }

        ForwardCommand::Show { user } => {
            let user = util::parse_user(&user)?;
            let status = app.status(&user).await?;
            let out = output::render_single(&global.output, &status, status_detail, |s| {
                s.forward_to
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
