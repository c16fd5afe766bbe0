//! Configuration file loading and resolution.
//!
//! The config file is JSON (`.config.json` in the working directory) or TOML
//! when its name ends in `.toml`:
//!
//! ```json
//! { "username": "me@example.com", "password": "secret" }
//! ```
//!
//! ## File lookup
//!
//! 1. `--config <PATH>`
//! 2. `SUNNY_CONFIG`
//! 3. `./.config.json`, if present
//! 4. `<platform config dir>/sunny-scrape/config.toml`, if present
//!
//! An explicitly named file must exist; the implicit locations are optional.
//!
//! ## Precedence
//!
//! Settings are resolved with the following precedence (highest first):
//! 1. CLI flags
//! 2. Environment variables
//! 3. Config file
//! 4. Built-in defaults
//!
//! ## Environment Variables
//!
//! - `SUNNY_USERNAME`, `SUNNY_PASSWORD`: portal credentials
//! - `SUNNY_TIMEOUT`: per-request timeout in seconds
//! - `SUNNY_RENEWAL_THRESHOLD`: day queries per session in a batch
//! - `SUNNY_NO_COLOR` or `NO_COLOR`: disable colors
//! - `SUNNY_CONFIG`: config file path

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::AppPaths;
use crate::cli::args::{Cli, OutputFormat};
use crate::core::portal::{DEFAULT_LOGIN_URL, DEFAULT_PORTAL_BASE, PortalEndpoints};
use crate::core::scheduler::RenewalPolicy;
use crate::core::session::Credentials;
use crate::error::{Result, SunnyError};
use crate::util::env::{env_flag, non_empty_var};

// =============================================================================
// Environment Variable Names
// =============================================================================

pub const ENV_CONFIG: &str = "SUNNY_CONFIG";
pub const ENV_USERNAME: &str = "SUNNY_USERNAME";
pub const ENV_PASSWORD: &str = "SUNNY_PASSWORD";
pub const ENV_TIMEOUT: &str = "SUNNY_TIMEOUT";
pub const ENV_RENEWAL_THRESHOLD: &str = "SUNNY_RENEWAL_THRESHOLD";
pub const ENV_NO_COLOR: &str = "SUNNY_NO_COLOR";
/// Standard environment variable to disable colors.
pub const ENV_NO_COLOR_STD: &str = "NO_COLOR";

/// Config file looked for in the working directory.
pub const LOCAL_CONFIG_FILE: &str = ".config.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 300;

// =============================================================================
// Resolved Configuration
// =============================================================================

/// Final configuration after merging CLI, env vars, and config file.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub credentials: Credentials,
    pub endpoints: PortalEndpoints,
    /// Per-request timeout.
    pub timeout: Duration,
    pub renewal_policy: RenewalPolicy,
    pub format: OutputFormat,
    pub no_color: bool,
    pub pretty: bool,
}

/// Where each resolved value came from, for the resolution log event.
#[derive(Debug, Clone, Copy, Default)]
struct ConfigSources {
    username: ConfigSource,
    password: ConfigSource,
    timeout: ConfigSource,
    renewal_threshold: ConfigSource,
}

/// Where a configuration value came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// Value from CLI flag.
    Cli,
    /// Value from environment variable.
    Env,
    /// Value from config file.
    ConfigFile,
    /// Built-in default.
    #[default]
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI flag"),
            Self::Env => write!(f, "environment variable"),
            Self::ConfigFile => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

impl ResolvedConfig {
    /// Resolve final configuration from CLI args, environment variables, and config file.
    ///
    /// `renewal_override` is the `history --renewal-threshold` flag, if given.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if an explicitly named file is missing,
    /// `ConfigParse` if the file is malformed, and `ConfigInvalid` if a value
    /// is out of range or credentials are missing.
    pub fn resolve(cli: &Cli, renewal_override: Option<u32>) -> Result<Self> {
        let config_path = locate_config(cli.config.as_deref());
        let config = match &config_path {
            Some(path) => Config::load_from(path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                Config::default()
            }
        };
        config.validate()?;

        let mut sources = ConfigSources::default();

        let username = Self::resolve_secret(
            ENV_USERNAME,
            config.username.as_deref(),
            "username",
            &mut sources.username,
        )?;
        let password = Self::resolve_secret(
            ENV_PASSWORD,
            config.password.as_deref(),
            "password",
            &mut sources.password,
        )?;
        let timeout = Self::resolve_timeout(&config, &mut sources.timeout)?;
        let renewal_policy =
            Self::resolve_renewal(renewal_override, &config, &mut sources.renewal_threshold)?;
        let endpoints = config.portal.endpoints()?;

        // Credentials are secrets: only their sources are logged.
        tracing::debug!(
            path = ?config_path,
            username_source = %sources.username,
            password_source = %sources.password,
            timeout_secs = timeout.as_secs(),
            renewal_threshold = renewal_policy.threshold(),
            "Configuration resolved"
        );

        Ok(Self {
            credentials: Credentials::new(username, password),
            endpoints,
            timeout,
            renewal_policy,
            format: cli.effective_format(),
            no_color: Self::resolve_no_color(cli),
            pretty: cli.pretty,
        })
    }

    fn resolve_secret(
        env_key: &str,
        from_file: Option<&str>,
        key: &str,
        source: &mut ConfigSource,
    ) -> Result<String> {
        // 1. Environment variable
        if let Some(value) = non_empty_var(env_key) {
            *source = ConfigSource::Env;
            return Ok(value);
        }

        // 2. Config file
        if let Some(value) = from_file.filter(|v| !v.trim().is_empty()) {
            *source = ConfigSource::ConfigFile;
            return Ok(value.to_string());
        }

        Err(SunnyError::ConfigInvalid {
            key: key.to_string(),
            message: format!("missing; set it in the config file or {env_key}"),
        })
    }

    fn resolve_timeout(config: &Config, source: &mut ConfigSource) -> Result<Duration> {
        // 1. Environment variable
        if let Some(raw) = non_empty_var(ENV_TIMEOUT) {
            let secs = parse_env_number(ENV_TIMEOUT, &raw)?;
            check_timeout(ENV_TIMEOUT, secs)?;
            *source = ConfigSource::Env;
            return Ok(Duration::from_secs(secs));
        }

        // 2. Config file
        if let Some(secs) = config.batch.timeout_secs {
            *source = ConfigSource::ConfigFile;
            return Ok(Duration::from_secs(secs));
        }

        // 3. Default
        *source = ConfigSource::Default;
        Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    fn resolve_renewal(
        cli_value: Option<u32>,
        config: &Config,
        source: &mut ConfigSource,
    ) -> Result<RenewalPolicy> {
        // 1. CLI --renewal-threshold
        if let Some(threshold) = cli_value {
            *source = ConfigSource::Cli;
            return RenewalPolicy::new(threshold);
        }

        // 2. Environment variable
        if let Some(raw) = non_empty_var(ENV_RENEWAL_THRESHOLD) {
            let threshold = parse_env_number(ENV_RENEWAL_THRESHOLD, &raw)?;
            *source = ConfigSource::Env;
            return RenewalPolicy::new(threshold);
        }

        // 3. Config file
        if let Some(threshold) = config.batch.renewal_threshold {
            *source = ConfigSource::ConfigFile;
            return RenewalPolicy::new(threshold);
        }

        // 4. Default
        *source = ConfigSource::Default;
        Ok(RenewalPolicy::default())
    }

    /// `--no-color`, a truthy `SUNNY_NO_COLOR` or any `NO_COLOR`.
    fn resolve_no_color(cli: &Cli) -> bool {
        cli.no_color || env_flag(ENV_NO_COLOR) || std::env::var_os(ENV_NO_COLOR_STD).is_some()
    }
}

/// A config file that will be read, and how it was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLocation {
    pub path: PathBuf,
    pub source: ConfigSource,
}

impl AsRef<Path> for ConfigLocation {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Pick the config file according to the lookup order.
///
/// Explicit locations are returned even if missing so that loading reports
/// `ConfigNotFound`; implicit ones only when they exist.
#[must_use]
pub fn locate_config(cli_path: Option<&Path>) -> Option<ConfigLocation> {
    if let Some(path) = cli_path {
        return Some(ConfigLocation {
            path: path.to_path_buf(),
            source: ConfigSource::Cli,
        });
    }

    if let Some(path) = non_empty_var(ENV_CONFIG) {
        return Some(ConfigLocation {
            path: PathBuf::from(path),
            source: ConfigSource::Env,
        });
    }

    std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
        .chain(AppPaths::discover().config_file())
        .find(|path| path.is_file())
        .map(|path| ConfigLocation {
            path,
            source: ConfigSource::ConfigFile,
        })
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse().map_err(|_| SunnyError::ConfigInvalid {
        key: key.to_string(),
        message: format!("'{raw}' is not a valid number"),
    })
}

fn check_timeout(key: &str, secs: u64) -> Result<()> {
    if secs == 0 || secs > MAX_TIMEOUT_SECS {
        return Err(SunnyError::ConfigInvalid {
            key: key.to_string(),
            message: format!("must be between 1 and {MAX_TIMEOUT_SECS} seconds"),
        });
    }
    Ok(())
}

// =============================================================================
// File Configuration
// =============================================================================

/// Contents of the config file.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub username: Option<String>,
    pub password: Option<String>,
    pub portal: PortalConfig,
    pub batch: BatchConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("username", &self.username.as_ref().map(|_| "<redacted>"))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("portal", &self.portal)
            .field("batch", &self.batch)
            .finish()
    }
}

/// Where the portal lives.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Portal origin; defaults to the public Sunny Portal.
    pub base_url: Option<String>,
    /// Login entry URL; defaults to the SMA identity provider.
    pub login_url: Option<String>,
}

impl PortalConfig {
    /// Build endpoints from the configured or default URLs.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if either URL does not parse.
    pub fn endpoints(&self) -> Result<PortalEndpoints> {
        PortalEndpoints::new(
            self.base_url.as_deref().unwrap_or(DEFAULT_PORTAL_BASE),
            self.login_url.as_deref().unwrap_or(DEFAULT_LOGIN_URL),
        )
    }
}

/// Batch retrieval settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Day queries per session before logging in again.
    pub renewal_threshold: Option<u32>,
    /// Per-request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a specific path.
    ///
    /// The format follows the extension: `.toml` is TOML, anything else JSON.
    ///
    /// # Errors
    ///
    /// Returns `ConfigNotFound` if the file does not exist and `ConfigParse`
    /// if it cannot be parsed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SunnyError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        tracing::debug!(?path, "Loading config file");
        let content = fs::read_to_string(path)?;
        if is_toml(path) {
            toml::from_str(&content).map_err(|e| SunnyError::ConfigParse {
                path: path.display().to_string(),
                line: e.span().map(|span| line_of(&content, span.start)),
                message: e.message().to_string(),
            })
        } else {
            serde_json::from_str(&content).map_err(|e| SunnyError::ConfigParse {
                path: path.display().to_string(),
                line: Some(e.line()),
                message: e.to_string(),
            })
        }
    }

    /// Validate value ranges and URLs.
    ///
    /// Credentials are checked during resolution, since the environment may
    /// supply them.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the offending key.
    pub fn validate(&self) -> Result<()> {
        if let Some(secs) = self.batch.timeout_secs {
            check_timeout("batch.timeout_secs", secs)?;
        }

        if self.batch.renewal_threshold == Some(0) {
            return Err(SunnyError::ConfigInvalid {
                key: "batch.renewal_threshold".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        self.portal.endpoints()?;
        Ok(())
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"))
}

fn line_of(content: &str, offset: usize) -> usize {
    content
        .get(..offset)
        .map_or(1, |prefix| prefix.matches('\n').count() + 1)
}
