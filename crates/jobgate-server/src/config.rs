//! Runtime configuration, deserialised from `config.toml` and `JOBGATE_*`
//! environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use jobgate_core::claims::IdentityDefaults;
use jobgate_identity::ExternalKeyConfig;
use serde::Deserialize;

/// Environment variables are `JOBGATE_<KEY>`; nested keys use `__`, e.g.
/// `JOBGATE_EXTERNAL__JWT_SECRET`.
pub const ENV_PREFIX: &str = "JOBGATE";

#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  pub store_path:          PathBuf,
  /// Absolute origin used to build published asset URLs.
  pub public_base_url:     String,
  pub upload_dir:          PathBuf,
  /// HS256 secret for organization session tokens.
  pub token_secret:        String,
  #[serde(default = "default_token_ttl_hours")]
  pub token_ttl_hours:     u64,
  #[serde(default)]
  pub placeholder_domain:  Option<String>,
  #[serde(default)]
  pub default_avatar_base: Option<String>,
  #[serde(default)]
  pub external:            ExternalConfig,
}

/// Everything about the external identity provider. All keys are optional;
/// a missing verification key surfaces per request as `Misconfigured`.
#[derive(Deserialize, Clone)]
pub struct ExternalConfig {
  pub jwt_public_key_pem: Option<String>,
  pub jwt_secret:         Option<String>,
  pub issuer:             Option<String>,
  /// Backend API for live profile lookups, e.g. `https://api.idp.example/v1`.
  pub api_base_url:       Option<String>,
  pub api_secret_key:     Option<String>,
  #[serde(default = "default_lookup_timeout_ms")]
  pub lookup_timeout_ms:  u64,
  /// `whsec_…` secret for push events.
  pub webhook_secret:     Option<String>,
  #[serde(default = "default_leeway_secs")]
  pub leeway_secs:        u64,
}

impl Default for ExternalConfig {
  fn default() -> Self {
    Self {
      jwt_public_key_pem: None,
      jwt_secret:         None,
      issuer:             None,
      api_base_url:       None,
      api_secret_key:     None,
      lookup_timeout_ms:  default_lookup_timeout_ms(),
      webhook_secret:     None,
      leeway_secs:        default_leeway_secs(),
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_owned() }
fn default_port() -> u16 { 8080 }
fn default_token_ttl_hours() -> u64 { 168 }
fn default_lookup_timeout_ms() -> u64 { 2000 }
fn default_leeway_secs() -> u64 { 5 }

impl ServerConfig {
  /// Read the TOML file at `path`, if present, with environment overrides
  /// layered on top.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> { Self::load_with(path, environment()) }

  fn load_with(path: &Path, env: config::Environment) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(env)
      .build()?
      .try_deserialize()
  }

  pub fn token_ttl(&self) -> Duration { Duration::from_secs(self.token_ttl_hours.saturating_mul(3600)) }

  pub fn identity_defaults(&self) -> IdentityDefaults {
    let mut defaults = IdentityDefaults::default();
    if let Some(domain) = non_blank(&self.placeholder_domain) {
      defaults.placeholder_domain = domain;
    }
    if let Some(base) = non_blank(&self.default_avatar_base) {
      defaults.default_avatar_base = base;
    }
    defaults
  }
}

impl ExternalConfig {
  pub fn key_config(&self) -> ExternalKeyConfig {
    ExternalKeyConfig {
      jwt_public_key_pem: non_blank(&self.jwt_public_key_pem),
      jwt_secret:         non_blank(&self.jwt_secret),
      issuer:             non_blank(&self.issuer),
      leeway_secs:        self.leeway_secs,
    }
  }

  pub fn lookup_timeout(&self) -> Duration { Duration::from_millis(self.lookup_timeout_ms) }
}

fn environment() -> config::Environment {
  config::Environment::with_prefix(ENV_PREFIX)
    .prefix_separator("_")
    .separator("__")
}

fn non_blank(value: &Option<String>) -> Option<String> {
  value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(str::to_owned)
}
