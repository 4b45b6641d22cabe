//! Profile configuration for aliasfwd.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation to `aliasfwd_core::ReconcilerConfig`. The CLI layers its
//! flag overrides on top of what this crate resolves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use aliasfwd_core::{AuthCredentials, ReconcilerConfig, TlsVerification};

/// Keyring service name for stored secrets.
pub const KEYRING_SERVICE: &str = "aliasfwd";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named apex-domain profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up `name`, or the default profile when `name` is `None`.
    pub fn profile(&self, name: Option<&str>) -> Result<(&str, &Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named apex-domain profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Domain every alias lives under (e.g. "example.com").
    pub apex_domain: String,

    /// Provider zone id holding the apex records.
    pub zone_id: String,

    /// Provider API root override.
    pub api_url: Option<String>,

    /// Auth mode: "token" or "global-key".
    #[serde(default = "default_auth_mode")]
    pub auth_mode: String,

    /// API token (plaintext; prefer keyring or env var).
    pub api_token: Option<String>,

    /// Environment variable name containing the API token.
    pub api_token_env: Option<String>,

    /// Account email for global-key auth.
    pub email: Option<String>,

    /// Global API key (plaintext; prefer keyring).
    pub api_key: Option<String>,

    /// Profile store file. Defaults to the platform data dir.
    pub store_path: Option<PathBuf>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification (local API mocks only).
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// TXT record TTL; 1 means automatic.
    pub ttl: Option<u32>,
}

fn default_auth_mode() -> String {
    "token".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "aliasfwd", "aliasfwd")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory for profile-store files.
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("aliasfwd");
    p
}

/// Where the profile store for `profile_name` lives.
pub fn store_path(profile: &Profile, profile_name: &str) -> PathBuf {
    profile
        .store_path
        .clone()
        .unwrap_or_else(|| data_dir().join(format!("{profile_name}.profiles.toml")))
}

// ── Config loading ──────────────────────────────────────────────────

fn figment_for(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ALIASFWD_").split("__"))
}

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file; a missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(figment_for(path).extract()?)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

fn keyring_secret(profile_name: &str, item: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}")).ok()?;
    entry.get_password().ok().map(SecretString::from)
}

/// Store a secret (`api-token` or `api-key`) for a profile in the keyring.
pub fn store_secret(profile_name: &str, item: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{item}"))?;
    entry.set_password(secret)?;
    Ok(())
}

/// Resolve an API token from the credential chain (no CLI flag step).
pub fn resolve_api_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_token_env → env var lookup
    if let Some(ref env_name) = profile.api_token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(profile_name, "api-token") {
        return Ok(secret);
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.api_token {
        return Ok(SecretString::from(token.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve global-key credentials (email + key) without CLI flags.
pub fn resolve_global_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let email = profile
        .email
        .clone()
        .or_else(|| std::env::var("ALIASFWD_EMAIL").ok())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    if let Ok(key) = std::env::var("ALIASFWD_API_KEY") {
        return Ok((email, SecretString::from(key)));
    }
    if let Some(key) = keyring_secret(profile_name, "api-key") {
        return Ok((email, key));
    }
    if let Some(ref key) = profile.api_key {
        return Ok((email, SecretString::from(key.clone())));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthCredentials` from a profile's `auth_mode` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    match profile.auth_mode.as_str() {
        "token" => Ok(AuthCredentials::ApiToken(resolve_api_token(
            profile,
            profile_name,
        )?)),
        "global-key" => {
            let (email, key) = resolve_global_key(profile, profile_name)?;
            Ok(AuthCredentials::GlobalKey { email, key })
        }
        other => Err(ConfigError::Validation {
            field: "auth_mode".into(),
            reason: format!("expected 'token' or 'global-key', got '{other}'"),
        }),
    }
}

/// TLS mode a profile asks for.
pub fn tls_for(profile: &Profile) -> TlsVerification {
    if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ReconcilerConfig` from a profile with the given credentials.
pub fn build_reconciler_config(
    profile: &Profile,
    auth: AuthCredentials,
    default_timeout: u64,
) -> Result<ReconcilerConfig, ConfigError> {
    let mut cfg = ReconcilerConfig::new(profile.zone_id.clone(), &profile.apex_domain, auth)
        .map_err(|e| ConfigError::Validation {
            field: "profile".into(),
            reason: e.to_string(),
        })?;

    if let Some(ref raw) = profile.api_url {
        cfg.api_url = raw.parse().map_err(|_| ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("invalid URL: {raw}"),
        })?;
    }
    cfg.tls = tls_for(profile);
    cfg.timeout = Duration::from_secs(profile.timeout.unwrap_or(default_timeout));
    if let Some(ttl) = profile.ttl {
        cfg.ttl = ttl;
    }
    Ok(cfg)
}

/// Build a `ReconcilerConfig` from a profile, no CLI flag overrides.
pub fn profile_to_reconciler_config(
    profile: &Profile,
    profile_name: &str,
) -> Result<ReconcilerConfig, ConfigError> {
    let auth = resolve_auth(profile, profile_name)?;
    build_reconciler_config(profile, auth, default_timeout())
}
