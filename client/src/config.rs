use anyhow::anyhow;
use chrono_tz::Tz;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5001/api";
pub const DEFAULT_GEO_PRIMARY_URL: &str = "https://ipapi.co/json/";
pub const DEFAULT_GEO_FALLBACK_URL: &str = "https://api.ipify.org?format=json";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_HEARTBEAT_SECS: u64 = 30;

/// Whole seconds from an env value. Missing, unparsable or zero values fall back.
fn positive_secs(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub storage_dir: PathBuf,
    pub geo_primary_url: String,
    pub geo_fallback_url: String,
    pub http_timeout: Duration,
    pub heartbeat_interval: Duration,
    pub user_agent: String,
    pub language: String,
    pub time_zone: Tz,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("WARDWATCH_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let storage_dir = env::var("WARDWATCH_STORAGE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./.wardwatch"));

        let geo_primary_url = env::var("WARDWATCH_GEO_PRIMARY_URL")
            .unwrap_or_else(|_| DEFAULT_GEO_PRIMARY_URL.to_string());
        let geo_fallback_url = env::var("WARDWATCH_GEO_FALLBACK_URL")
            .unwrap_or_else(|_| DEFAULT_GEO_FALLBACK_URL.to_string());

        let http_timeout_secs = positive_secs(
            env::var("WARDWATCH_HTTP_TIMEOUT_SECS").ok().as_deref(),
            DEFAULT_HTTP_TIMEOUT_SECS,
        );

        let heartbeat_secs = positive_secs(
            env::var("WARDWATCH_HEARTBEAT_SECS").ok().as_deref(),
            DEFAULT_HEARTBEAT_SECS,
        );

        let user_agent = env::var("WARDWATCH_USER_AGENT")
            .unwrap_or_else(|_| crate::services::device::default_user_agent());

        let language = env::var("WARDWATCH_LANGUAGE").unwrap_or_else(|_| "en-US".to_string());

        let time_zone_name = env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let time_zone: Tz = time_zone_name
            .parse()
            .map_err(|_| anyhow!("Invalid APP_TIMEZONE value: {}", time_zone_name))?;

        Ok(Config {
            api_base_url,
            storage_dir,
            geo_primary_url,
            geo_fallback_url,
            http_timeout: Duration::from_secs(http_timeout_secs),
            heartbeat_interval: Duration::from_secs(heartbeat_secs),
            user_agent,
            language,
            time_zone,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_dir: PathBuf::from("./.wardwatch"),
            geo_primary_url: DEFAULT_GEO_PRIMARY_URL.to_string(),
            geo_fallback_url: DEFAULT_GEO_FALLBACK_URL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            heartbeat_interval: Duration::from_secs(DEFAULT_HEARTBEAT_SECS),
            user_agent: crate::services::device::default_user_agent(),
            language: "en-US".to_string(),
            time_zone: chrono_tz::UTC,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_documented_intervals() {
        let config = Config::default();
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.heartbeat_interval, Duration::from_secs(30));
        assert_eq!(config.geo_primary_url, DEFAULT_GEO_PRIMARY_URL);
        assert_eq!(config.time_zone, chrono_tz::UTC);
    }

    #[test]
    fn zero_or_garbage_seconds_fall_back() {
        assert_eq!(positive_secs(Some("0"), DEFAULT_HTTP_TIMEOUT_SECS), 10);
        assert_eq!(positive_secs(Some("soon"), DEFAULT_HTTP_TIMEOUT_SECS), 10);
        assert_eq!(positive_secs(Some("-3"), DEFAULT_HEARTBEAT_SECS), 30);
        assert_eq!(positive_secs(None, DEFAULT_HEARTBEAT_SECS), 30);
        assert_eq!(positive_secs(Some(" 45 "), DEFAULT_HTTP_TIMEOUT_SECS), 45);
    }
}
