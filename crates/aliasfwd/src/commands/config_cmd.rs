//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const VALID_KEYS: &str = "apex_domain, zone_id, api_url, auth_mode, api_token, \
    api_token_env, email, api_key, store_path, ca_cert, insecure, timeout, ttl";

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in sorted_profiles(cfg) {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "apex_domain = \"{}\"", p.apex_domain);
        let _ = writeln!(out, "zone_id = \"{}\"", p.zone_id);
        let _ = writeln!(out, "auth_mode = \"{}\"", p.auth_mode);
        if let Some(ref url) = p.api_url {
            let _ = writeln!(out, "api_url = \"{url}\"");
        }
        if p.api_token.is_some() {
            let _ = writeln!(out, "api_token = \"****\"");
        }
        if let Some(ref env) = p.api_token_env {
            let _ = writeln!(out, "api_token_env = \"{env}\"");
        }
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if p.api_key.is_some() {
            let _ = writeln!(out, "api_key = \"****\"");
        }
        if let Some(ref path) = p.store_path {
            let _ = writeln!(out, "store_path = \"{}\"", path.display());
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(ttl) = p.ttl {
            let _ = writeln!(out, "ttl = {ttl}");
        }
    }

    out
}

fn sorted_profiles(cfg: &Config) -> Vec<(&String, &Profile)> {
    let mut profiles: Vec<_> = cfg.profiles.iter().collect();
    profiles.sort_by(|a, b| a.0.cmp(b.0));
    profiles
}

/// Copy of `cfg` with secrets masked, for structured output.
fn redacted(cfg: &Config) -> Config {
    let mask = |s: &Option<String>| s.as_ref().map(|_| "****".to_string());
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: aliasfwd_config::Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            timeout: cfg.defaults.timeout,
        },
        profiles: cfg
            .profiles
            .iter()
            .map(|(name, p)| {
                let mut p = p.clone();
                p.api_token = mask(&p.api_token);
                p.api_key = mask(&p.api_key);
                (name.clone(), p)
            })
            .collect(),
    }
}

fn available_profiles(cfg: &Config) -> String {
    let names: Vec<&str> = sorted_profiles(cfg)
        .into_iter()
        .map(|(n, _)| n.as_str())
        .collect();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str, field: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Offer to store a secret in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: &str,
    profile_name: &str,
    item: &str,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        config::store_secret(profile_name, item, secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret.to_owned()))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: key.into(),
        reason: hint.into(),
    })
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("aliasfwd configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let apex_domain: String = Input::new()
                .with_prompt("Apex domain (aliases live at <alias>@<apex>)")
                .interact_text()
                .map_err(prompt_err)?;

            let zone_id: String = Input::new()
                .with_prompt("Zone ID")
                .interact_text()
                .map_err(prompt_err)?;

            let auth_choices = &["API token (recommended)", "Account email + global API key"];
            let auth_selection = Select::new()
                .with_prompt("Authentication method")
                .items(auth_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let mut profile = Profile {
                apex_domain,
                zone_id,
                ..Profile::default()
            };

            if auth_selection == 0 {
                let token = prompt_secret("API token: ", "api_token")?;
                profile.auth_mode = "token".into();
                profile.api_token =
                    prompt_keyring_storage(&token, &profile_name, "api-token", "API token")?;
            } else {
                let email: String = Input::new()
                    .with_prompt("Account email")
                    .interact_text()
                    .map_err(prompt_err)?;
                let key = prompt_secret("Global API key: ", "api_key")?;
                profile.auth_mode = "global-key".into();
                profile.email = Some(email);
                profile.api_key =
                    prompt_keyring_storage(&key, &profile_name, "api-key", "API key")?;
            }

            // Validate before writing anything
            config::profile_to_reconciler_config(&profile, &profile_name)?;

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(profile_name.clone(), profile);
            cfg.default_profile = Some(profile_name.clone());
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: aliasfwd records list");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg
                .profiles
                .entry(profile_name.clone())
                .or_insert_with(|| Profile {
                    auth_mode: "token".into(),
                    ..Profile::default()
                });

            match key.as_str() {
                "apex_domain" | "apex-domain" | "apex" => profile.apex_domain = value,
                "zone_id" | "zone-id" | "zone" => profile.zone_id = value,
                "api_url" | "api-url" => profile.api_url = Some(value),
                "auth_mode" | "auth-mode" => {
                    if !matches!(value.as_str(), "token" | "global-key") {
                        return Err(CliError::Validation {
                            field: "auth_mode".into(),
                            reason: "must be 'token' or 'global-key'".into(),
                        });
                    }
                    profile.auth_mode = value;
                }
                "api_token" | "api-token" => profile.api_token = Some(value),
                "api_token_env" | "api-token-env" => profile.api_token_env = Some(value),
                "email" => profile.email = Some(value),
                "api_key" | "api-key" => profile.api_key = Some(value),
                "store_path" | "store-path" => profile.store_path = Some(value.into()),
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "insecure" => {
                    profile.insecure = Some(parse_value(&key, &value, "must be 'true' or 'false'")?);
                }
                "timeout" => {
                    profile.timeout = Some(parse_value(&key, &value, "must be a number (seconds)")?);
                }
                "ttl" => {
                    profile.ttl = Some(parse_value(&key, &value, "must be a number (1 = automatic)")?);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!("unknown config key '{other}'. Valid keys: {VALID_KEYS}"),
                    });
                }
            }

            save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: aliasfwd config init");
            } else {
                for (name, p) in sorted_profiles(&cfg) {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}\t{}", p.apex_domain);
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ────────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            let prof = cfg
                .profiles
                .get(&profile_name)
                .ok_or_else(|| CliError::ProfileNotFound {
                    name: profile_name.clone(),
                    available: available_profiles(&cfg),
                })?;

            let (item, label) = match prof.auth_mode.as_str() {
                "global-key" => ("api-key", "Global API key: "),
                _ => ("api-token", "API token: "),
            };
            let secret = prompt_secret(label, item)?;
            config::store_secret(&profile_name, item, &secret)?;

            eprintln!("✓ Secret stored in system keyring for profile '{profile_name}'");
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}
