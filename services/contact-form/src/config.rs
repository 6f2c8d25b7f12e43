// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact form service.
//!
//! Every field has a serde default so a partial document (or an empty
//! environment) still yields a working configuration. [`Config::from_env`]
//! layers environment variables on top of those defaults.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::submission::is_valid_email;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("Admin address is not a valid email: {0:?}")]
    InvalidAdminEmail(String),

    #[error("Unknown mail transport {0:?} (expected \"log\" or \"sendmail\")")]
    UnknownTransport(String),
}

/// Configuration for the contact form service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Site and routing configuration
    #[serde(default)]
    pub site: SiteConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Security token configuration
    #[serde(default)]
    pub security: SecurityConfig,

    /// Mail transport configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Site identity and the paths the form is served on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Display name used in the rendered form page
    #[serde(default = "default_site_name")]
    pub site_name: String,

    /// Recipient of every notification before hooks run
    #[serde(default = "default_admin_email")]
    pub admin_email: String,

    /// Path serving the form and the synchronous submission (default: /contact)
    #[serde(default = "default_form_path")]
    pub form_path: String,

    /// Path of the asynchronous submission endpoint (default: /ajax)
    #[serde(default = "default_ajax_path")]
    pub ajax_path: String,

    /// Honour `Client-IP` / `X-Forwarded-For` when resolving the client
    /// address (default: false). Enable only behind a trusted proxy.
    #[serde(default)]
    pub trust_proxy_headers: bool,
}

/// Per-client submission limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Successful submissions allowed per window (default: 3)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Window length in seconds, counted from the first submission (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Enforce the limit on the synchronous (redirect) path (default: true)
    #[serde(default = "default_true")]
    pub enforce_sync: bool,

    /// Enforce the limit on the asynchronous (JSON) path (default: true)
    #[serde(default = "default_true")]
    pub enforce_async: bool,
}

/// Security token configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Secret the token key is derived from. When unset a random key is
    /// generated at start-up and tokens do not survive a restart.
    #[serde(default)]
    pub nonce_secret: Option<String>,

    /// Token lifetime in seconds (default: 86400)
    #[serde(default = "default_nonce_lifetime_secs")]
    pub nonce_lifetime_secs: u64,
}

/// Which transport delivers outbound mail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Write messages to the log only
    #[default]
    Log,
    /// Pipe messages to a sendmail-compatible binary
    Sendmail,
}

impl FromStr for MailTransport {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "log" => Ok(Self::Log),
            "sendmail" => Ok(Self::Sendmail),
            other => Err(ConfigError::UnknownTransport(other.to_string())),
        }
    }
}

/// Mail transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Transport (default: log)
    #[serde(default)]
    pub transport: MailTransport,

    /// Path to the sendmail binary (default: /usr/sbin/sendmail)
    #[serde(default = "default_sendmail_path")]
    pub sendmail_path: String,

    /// `From` address; sendmail picks one when unset
    #[serde(default)]
    pub from_address: Option<String>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_site_name() -> String {
    "Contact".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_form_path() -> String {
    "/contact".to_string()
}

fn default_ajax_path() -> String {
    "/ajax".to_string()
}

fn default_max_submissions() -> u32 {
    3
}

fn default_window_secs() -> u64 {
    3600
}

fn default_nonce_lifetime_secs() -> u64 {
    86_400
}

fn default_sendmail_path() -> String {
    "/usr/sbin/sendmail".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            site: SiteConfig::default(),
            rate_limit: RateLimitConfig::default(),
            security: SecurityConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_name: default_site_name(),
            admin_email: default_admin_email(),
            form_path: default_form_path(),
            ajax_path: default_ajax_path(),
            trust_proxy_headers: false,
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
            enforce_sync: default_true(),
            enforce_async: default_true(),
        }
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            nonce_secret: None,
            nonce_lifetime_secs: default_nonce_lifetime_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::default(),
            sendmail_path: default_sendmail_path(),
            from_address: None,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl SecurityConfig {
    /// Get the token lifetime
    pub fn nonce_lifetime(&self) -> Duration {
        Duration::from_secs(self.nonce_lifetime_secs)
    }
}

impl Config {
    /// Load configuration from the environment (and a `.env` file if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable source.
    ///
    /// Missing variables keep their defaults; present but unparseable ones
    /// are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let config = Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            site: SiteConfig {
                site_name: lookup("SITE_NAME").unwrap_or(defaults.site.site_name),
                admin_email: lookup("ADMIN_EMAIL")
                    .map(|v| v.trim().to_string())
                    .unwrap_or(defaults.site.admin_email),
                form_path: lookup("FORM_PATH").unwrap_or(defaults.site.form_path),
                ajax_path: lookup("AJAX_PATH").unwrap_or(defaults.site.ajax_path),
                trust_proxy_headers: parse_var(
                    &lookup,
                    "TRUST_PROXY_HEADERS",
                    defaults.site.trust_proxy_headers,
                )?,
            },
            rate_limit: RateLimitConfig {
                max_submissions: parse_var(
                    &lookup,
                    "RATE_LIMIT_MAX",
                    defaults.rate_limit.max_submissions,
                )?,
                window_secs: parse_var(
                    &lookup,
                    "RATE_LIMIT_WINDOW_SECS",
                    defaults.rate_limit.window_secs,
                )?,
                enforce_sync: parse_var(
                    &lookup,
                    "RATE_LIMIT_SYNC",
                    defaults.rate_limit.enforce_sync,
                )?,
                enforce_async: parse_var(
                    &lookup,
                    "RATE_LIMIT_ASYNC",
                    defaults.rate_limit.enforce_async,
                )?,
            },
            security: SecurityConfig {
                nonce_secret: lookup("NONCE_SECRET").filter(|s| !s.is_empty()),
                nonce_lifetime_secs: parse_var(
                    &lookup,
                    "NONCE_LIFETIME_SECS",
                    defaults.security.nonce_lifetime_secs,
                )?,
            },
            mail: MailConfig {
                transport: match lookup("MAIL_TRANSPORT") {
                    Some(value) => value.parse()?,
                    None => defaults.mail.transport,
                },
                sendmail_path: lookup("SENDMAIL_PATH").unwrap_or(defaults.mail.sendmail_path),
                from_address: lookup("MAIL_FROM").filter(|s| !s.is_empty()),
            },
            metrics: MetricsConfig {
                enabled: parse_var(&lookup, "METRICS_ENABLED", defaults.metrics.enabled)?,
                path: lookup("METRICS_PATH").unwrap_or(defaults.metrics.path),
            },
        };

        config.validate()?;
        Ok(config)
    }

    /// Check invariants that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_email(&self.site.admin_email) {
            return Err(ConfigError::InvalidAdminEmail(self.site.admin_email.clone()));
        }
        if self.rate_limit.max_submissions == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RATE_LIMIT_MAX",
                value: self.rate_limit.max_submissions.to_string(),
            });
        }
        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::InvalidValue {
                var: "RATE_LIMIT_WINDOW_SECS",
                value: self.rate_limit.window_secs.to_string(),
            });
        }
        if self.security.nonce_lifetime_secs < 2 {
            return Err(ConfigError::InvalidValue {
                var: "NONCE_LIFETIME_SECS",
                value: self.security.nonce_lifetime_secs.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
        None => Ok(default),
    }
}
