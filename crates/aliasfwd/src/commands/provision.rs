//! Provision command handler.

use std::fmt::Write;

use aliasfwd_core::{ForwardTarget, Provisioned};

use crate::cli::{GlobalOpts, ProvisionArgs};
use crate::error::CliError;

use super::{App, util};

fn detail(p: &Provisioned) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "User:        {}", p.user_id);
    let _ = writeln!(out, "Address:     {}", p.address);
    let _ = writeln!(
        out,
        "Forward to:  {}",
        p.forward_to.as_ref().map_or("(local delivery)", ForwardTarget::as_str)
    );
    let _ = write!(out, "DNS record:  {}", p.record.id);
    out
}

pub async fn handle(app: &App, args: ProvisionArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user = util::parse_user(&args.user)?;
    let alias = util::parse_alias(&args.alias)?;
    let target = util::parse_target(args.forward_to.as_deref())?;

    tracing::info!(%user, %alias, "provisioning alias");
    let outcome = app.provision(user, alias, target).await?;

    util::emit_outcome(&outcome, global, detail, |p| p.record.id.to_string());
    Ok(())
}
