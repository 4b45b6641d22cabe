//! CLI configuration: thin wrapper around `aliasfwd_config`.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--apex, --zone, --api-token, ...).

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use aliasfwd_core::{AuthCredentials, ReconcilerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use aliasfwd_config::{
    Config, Profile, config_path, data_dir, load_config_or_default, profile_to_reconciler_config,
    save_config, store_path, store_secret,
};

/// Everything a reconciling command needs: provider config plus store file.
#[derive(Debug)]
pub struct Runtime {
    pub reconciler: ReconcilerConfig,
    pub store_path: PathBuf,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the runtime from the config file, the active profile and CLI overrides.
pub fn resolve_runtime(global: &GlobalOpts) -> Result<Runtime, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, cfg.defaults.timeout);
    }

    // An explicitly requested profile must exist
    if global.profile.is_some() {
        let mut names: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
        names.sort_unstable();
        return Err(CliError::ProfileNotFound {
            name: profile_name,
            available: if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            },
        });
    }

    // No profile: build from CLI flags / env vars alone
    let no_config = |missing: &str| CliError::NoConfig {
        missing: missing.into(),
        path: config_path().display().to_string(),
    };
    let apex = global.apex.as_deref().ok_or_else(|| no_config("apex domain"))?;
    let zone = global.zone.clone().ok_or_else(|| no_config("zone id"))?;
    let token = global
        .api_token
        .clone()
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.clone(),
        })?;

    let mut reconciler = ReconcilerConfig::new(
        zone,
        apex,
        AuthCredentials::ApiToken(SecretString::from(token)),
    )?;
    apply_overrides(&mut reconciler, global, cfg.defaults.timeout)?;

    let store_path = global
        .store
        .clone()
        .unwrap_or_else(|| data_dir().join(format!("{profile_name}.profiles.toml")));

    Ok(Runtime {
        reconciler,
        store_path,
    })
}

/// Translate a `Profile` + global flags into a `Runtime`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<Runtime, CliError> {
    let mut profile = profile.clone();
    if let Some(ref apex) = global.apex {
        profile.apex_domain.clone_from(apex);
    }
    if let Some(ref zone) = global.zone {
        profile.zone_id.clone_from(zone);
    }
    if let Some(ref url) = global.api_url {
        profile.api_url = Some(url.clone());
    }

    // --api-token wins over every stored credential
    let auth = match global.api_token {
        Some(ref token) => AuthCredentials::ApiToken(SecretString::from(token.clone())),
        None => aliasfwd_config::resolve_auth(&profile, profile_name)?,
    };

    let mut reconciler = aliasfwd_config::build_reconciler_config(&profile, auth, default_timeout)?;
    if global.insecure {
        reconciler.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        reconciler.timeout = Duration::from_secs(secs);
    }

    let store_path = global
        .store
        .clone()
        .unwrap_or_else(|| store_path(&profile, profile_name));

    Ok(Runtime {
        reconciler,
        store_path,
    })
}

fn apply_overrides(
    reconciler: &mut ReconcilerConfig,
    global: &GlobalOpts,
    default_timeout: u64,
) -> Result<(), CliError> {
    if let Some(ref raw) = global.api_url {
        reconciler.api_url = raw.parse().map_err(|_| CliError::Validation {
            field: "api-url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    if global.insecure {
        reconciler.tls = TlsVerification::DangerAcceptInvalid;
    }
    reconciler.timeout = Duration::from_secs(global.timeout.unwrap_or(default_timeout));
    Ok(())
}
