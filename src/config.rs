use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

pub const DEFAULT_SEASON: u16 = 2023;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;
pub const DEFAULT_STATS_URL: &str = "https://understat.com/team";
pub const DEFAULT_PROXY_URL: &str = "https://api.allorigins.win/get";
pub const DEFAULT_EXPORT_PATH: &str = "matchpick_predictions.xlsx";

const APP_DIR: &str = "matchpick_terminal";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub season: u16,
    pub http_timeout: Duration,
    pub cache_ttl: Duration,
    pub stats_url: String,
    /// JSON-wrapping proxy in front of the statistics source. `None` fetches directly.
    pub proxy_url: Option<String>,
    pub log_file: Option<PathBuf>,
    pub export_path: PathBuf,
    /// Rejected values seen while loading. Logging is not up yet at that point, so callers replay
    /// them with [`Config::log_warnings`].
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            season: DEFAULT_SEASON,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            stats_url: DEFAULT_STATS_URL.to_string(),
            proxy_url: Some(DEFAULT_PROXY_URL.to_string()),
            log_file: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            warnings: Vec::new(),
        }
    }
}

impl Config {
    /// Load `.env.local`/`.env` if present, then read the environment.
    pub fn load() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_env()
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let mut warnings = Vec::new();
        let season = parse_or(
            "MATCHPICK_SEASON",
            lookup("MATCHPICK_SEASON"),
            defaults.season,
            &mut warnings,
        );
        let timeout_secs = parse_or(
            "MATCHPICK_HTTP_TIMEOUT_SECS",
            lookup("MATCHPICK_HTTP_TIMEOUT_SECS"),
            DEFAULT_HTTP_TIMEOUT_SECS,
            &mut warnings,
        )
        .max(1);
        let ttl_secs = parse_or(
            "MATCHPICK_CACHE_TTL_SECS",
            lookup("MATCHPICK_CACHE_TTL_SECS"),
            DEFAULT_CACHE_TTL_SECS,
            &mut warnings,
        );
        let stats_url = lookup("MATCHPICK_STATS_URL")
            .and_then(|v| non_empty(&v).map(|s| s.trim_end_matches('/').to_string()))
            .unwrap_or(defaults.stats_url);
        let proxy_url = match lookup("MATCHPICK_PROXY_URL") {
            Some(v) => non_empty(&v).map(str::to_string),
            None => defaults.proxy_url,
        };
        let log_file = lookup("MATCHPICK_LOG_FILE")
            .and_then(|v| non_empty(&v).map(PathBuf::from));
        let export_path = lookup("MATCHPICK_EXPORT_PATH")
            .and_then(|v| non_empty(&v).map(PathBuf::from))
            .unwrap_or(defaults.export_path);

        Self {
            season,
            http_timeout: Duration::from_secs(timeout_secs),
            cache_ttl: Duration::from_secs(ttl_secs),
            stats_url,
            proxy_url,
            log_file,
            export_path,
            warnings,
        }
    }

    pub fn log_warnings(&self) {
        for msg in &self.warnings {
            warn!("{msg}");
        }
    }

    pub fn log_file_or_default(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| app_cache_dir().map(|dir| dir.join("matchpick_terminal.log")))
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Ok(base) = env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(APP_DIR));
        }
    }
    let home = env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(APP_DIR))
}

fn parse_or<T: FromStr + Copy + Display>(
    key: &str,
    raw: Option<String>,
    default: T,
    warnings: &mut Vec<String>,
) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(val) => val,
        Err(_) => {
            warnings.push(format!("invalid {key}={raw:?}, using default {default}"));
            default
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed) }
}
