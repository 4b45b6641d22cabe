//! Shared helpers for command handlers.

use std::io::IsTerminal;

use serde::Serialize;

use aliasfwd_core::{Alias, ForwardTarget, Outcome, UserId};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn parse_user(raw: &str) -> Result<UserId, CliError> {
    Ok(UserId::parse(raw)?)
}

pub fn parse_alias(raw: &str) -> Result<Alias, CliError> {
    Ok(Alias::parse(raw)?)
}

pub fn parse_target(raw: Option<&str>) -> Result<Option<ForwardTarget>, CliError> {
    Ok(ForwardTarget::parse_optional(raw)?)
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, a destructive action needs `--yes`.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Render an operation's result and surface its warnings.
///
/// Structured formats serialize the whole outcome, warnings included, so
/// scripts see them on stdout; every format also reports them on stderr.
pub fn emit_outcome<T: Serialize>(
    outcome: &Outcome<T>,
    global: &GlobalOpts,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) {
    let out = if output::is_structured(&global.output) {
        output::render_single(&global.output, outcome, |_| String::new(), |_| String::new())
    } else {
        output::render_single(&global.output, &outcome.value, detail_fn, id_fn)
    };
    output::print_output(&out, global.quiet);
    output::print_warnings(&outcome.warnings, &global.color);
}

/// `-` for an absent value in table cells.
pub fn or_dash(value: Option<&str>) -> String {
    value.map_or_else(|| "-".into(), str::to_owned)
}
