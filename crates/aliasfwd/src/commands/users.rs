//! User command handlers.

use tabled::Tabled;

use aliasfwd_core::{Deprovisioned, ForwardTarget, RecordId, UserProfile};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::{App, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "User")]
    user: String,
    #[tabled(rename = "Alias")]
    alias: String,
    #[tabled(rename = "Forward To")]
    forward_to: String,
    #[tabled(rename = "DNS Record")]
    record_id: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&UserProfile> for UserRow {
    fn from(p: &UserProfile) -> Self {
        Self {
            user: p.user_id.to_string(),
            alias: p.alias.to_string(),
            forward_to: util::or_dash(p.forward_to.as_ref().map(ForwardTarget::as_str)),
            record_id: util::or_dash(p.dns_record_id.as_ref().map(RecordId::as_str)),
            created: p.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

fn deleted_detail(d: &Deprovisioned) -> String {
    if d.dns_deleted {
        format!(
            "User '{}' removed; DNS record {} deleted",
            d.user_id,
            d.dns_record_id.as_ref().map_or("-", RecordId::as_str)
        )
    } else {
        format!("User '{}' removed", d.user_id)
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(app: &App, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        UsersCommand::List => {
            let profiles = app.list_profiles().await?;
            let out = output::render_list(
                &global.output,
                &profiles,
                |p| UserRow::from(p),
                |p| p.user_id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Delete { user } => {
            let user = util::parse_user(&user)?;
            if !util::confirm(
                &format!("Delete user '{user}' and their forwarding record?"),
                global.yes,
                "users delete",
            )? {
                return Ok(());
            }
            let outcome = app.deprovision(&user).await?;
            util::emit_outcome(&outcome, global, deleted_detail, |d| d.user_id.to_string());
            Ok(())
        }
    }
}
