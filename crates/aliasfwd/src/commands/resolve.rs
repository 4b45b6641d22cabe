//! Resolve command handler.

use aliasfwd_core::{CoreError, ProfileStore, Resolution};

use crate::cli::{GlobalOpts, ResolveArgs};
use crate::error::CliError;

use super::{App, util};

fn detail(r: &Resolution) -> String {
    format!("{} (from {})", r.record_id, r.source)
}

pub async fn handle(app: &App, args: ResolveArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let user = util::parse_user(&args.user)?;
    let profile = app.store().get(&user).await.map_err(CoreError::from)?;

    let cached = if args.rescan {
        None
    } else {
        profile.dns_record_id.as_ref()
    };
    let outcome = app.resolve(&user, &profile.alias, cached).await?;

    util::emit_outcome(&outcome, global, detail, |r| r.record_id.to_string());
    Ok(())
}
