//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vitrine";
const DEFAULT_REMOTE_BASE_URL: &str = "http://127.0.0.1:3001";
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

/// Command-line arguments for the vitrine binary.
#[derive(Debug, Parser)]
#[command(name = "vitrine", version, about = "Vitrine content cache tool")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VITRINE_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: Overrides,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Warm the snapshot cache and print a content summary.
    Warm,
    /// Look up one article by id (snapshot first, remote on a miss).
    Article {
        #[arg(value_name = "ID")]
        id: String,
    },
    /// Look up one product by id.
    Product {
        #[arg(value_name = "ID")]
        id: String,
    },
}

#[derive(Debug, Args, Default, Clone)]
pub struct Overrides {
    /// Override the remote content API base URL.
    #[arg(long = "remote-base-url", value_name = "URL")]
    pub remote_base_url: Option<String>,

    /// Override the admin token sent with write requests.
    #[arg(
        long = "remote-admin-token",
        env = "VITRINE_ADMIN_TOKEN",
        value_name = "TOKEN"
    )]
    pub remote_admin_token: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the remote fetch timeout in milliseconds.
    #[arg(long = "cache-fetch-timeout-ms", value_name = "MS")]
    pub cache_fetch_timeout_ms: Option<u64>,

    /// Toggle keeping stale collections visible after a failed fetch.
    #[arg(
        long = "cache-stale-if-error",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_stale_if_error: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub remote: RemoteSettings,
    pub logging: LoggingSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: Url,
    pub admin_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub fetch_timeout_ms: u64,
    pub stale_if_error: bool,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VITRINE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    remote: RawRemoteSettings,
    logging: RawLoggingSettings,
    cache: RawCacheSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawRemoteSettings {
    base_url: Option<String>,
    admin_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    fetch_timeout_ms: Option<u64>,
    stale_if_error: Option<bool>,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(url) = overrides.remote_base_url.as_ref() {
            self.remote.base_url = Some(url.clone());
        }
        if let Some(token) = overrides.remote_admin_token.as_ref() {
            self.remote.admin_token = Some(token.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(timeout) = overrides.cache_fetch_timeout_ms {
            self.cache.fetch_timeout_ms = Some(timeout);
        }
        if let Some(stale) = overrides.cache_stale_if_error {
            self.cache.stale_if_error = Some(stale);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            remote,
            logging,
            cache,
        } = raw;

        let remote = build_remote_settings(remote)?;
        let logging = build_logging_settings(logging)?;
        let cache = build_cache_settings(cache)?;

        Ok(Self {
            remote,
            logging,
            cache,
        })
    }
}

fn build_remote_settings(remote: RawRemoteSettings) -> Result<RemoteSettings, LoadError> {
    let raw_url = remote
        .base_url
        .unwrap_or_else(|| DEFAULT_REMOTE_BASE_URL.to_string());
    let base_url = Url::parse(raw_url.trim())
        .map_err(|err| LoadError::invalid("remote.base_url", format!("failed to parse: {err}")))?;
    if base_url.cannot_be_a_base() {
        return Err(LoadError::invalid(
            "remote.base_url",
            "url cannot carry path segments",
        ));
    }

    let admin_token = remote.admin_token.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    Ok(RemoteSettings {
        base_url,
        admin_token,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_cache_settings(cache: RawCacheSettings) -> Result<CacheSettings, LoadError> {
    let fetch_timeout_ms = cache.fetch_timeout_ms.unwrap_or(DEFAULT_FETCH_TIMEOUT_MS);
    if fetch_timeout_ms == 0 {
        return Err(LoadError::invalid(
            "cache.fetch_timeout_ms",
            "must be greater than zero",
        ));
    }

    Ok(CacheSettings {
        fetch_timeout_ms,
        stale_if_error: cache.stale_if_error.unwrap_or(true),
    })
}
