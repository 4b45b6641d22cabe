//! Command dispatch: bridges CLI args -> reconciler calls -> output formatting.

pub mod audit;
pub mod config_cmd;
pub mod forward;
pub mod provision;
pub mod records;
pub mod resolve;
pub mod users;
pub mod util;

use aliasfwd_core::{CloudflareProvider, FileProfileStore, Reconciler};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// The reconciler every provider-bound command runs against.
pub type App = Reconciler<CloudflareProvider, FileProfileStore>;

/// Dispatch a provider-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, app: &App, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Provision(args) => provision::handle(app, args, global).await,
        Command::Forward(args) => forward::handle(app, args, global).await,
        Command::Resolve(args) => resolve::handle(app, args, global).await,
        Command::Records(args) => records::handle(app, args, global).await,
        Command::Users(args) => users::handle(app, args, global).await,
        Command::Audit => audit::handle(app, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
