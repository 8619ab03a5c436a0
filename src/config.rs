// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

use crate::error::AppError;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_TICK_MILLIS: u64 = 1000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SUBMIT_GRACE_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Root of the exam REST API, e.g. `http://127.0.0.1:3000`.
    pub api_base_url: Url,
    /// Bearer token the client attaches to every backend call.
    pub api_token: Option<String>,
    /// Secret the reference backend uses to verify bearer tokens.
    pub jwt_secret: Option<String>,
    /// Countdown quantum.
    pub tick_millis: u64,
    pub request_timeout_secs: u64,
    /// How long after an exam's end date the reference backend still accepts a submission.
    pub submit_grace_secs: i64,
    /// JSON file of exams to load into the reference backend at start-up.
    pub seed_file: Option<String>,
    pub listen_addr: SocketAddr,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unparseable numbers fall
    /// back to their defaults; an invalid base URL is an error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("EXAM_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&api_base_url).map_err(|e| {
            AppError::ValidationError(format!(
                "EXAM_API_BASE_URL '{}' is not a valid URL: {}",
                api_base_url, e
            ))
        })?;

        let listen_addr = lookup("LISTEN_ADDR")
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        Ok(Self {
            api_base_url,
            api_token: lookup("EXAM_API_TOKEN").filter(|t| !t.is_empty()),
            jwt_secret: lookup("JWT_SECRET").filter(|s| !s.is_empty()),
            tick_millis: parse_or(&lookup, "EXAM_TICK_MILLIS", DEFAULT_TICK_MILLIS).max(1),
            request_timeout_secs: parse_or(
                &lookup,
                "EXAM_REQUEST_TIMEOUT_SECS",
                DEFAULT_REQUEST_TIMEOUT_SECS,
            ),
            submit_grace_secs: parse_or(&lookup, "EXAM_SUBMIT_GRACE_SECS", DEFAULT_SUBMIT_GRACE_SECS),
            seed_file: lookup("EXAM_SEED_FILE").filter(|p| !p.is_empty()),
            listen_addr,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.api_base_url.as_str(), "http://127.0.0.1:3000/");
        assert_eq!(config.tick(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.submit_grace_secs, 60);
        assert!(config.api_token.is_none());
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.rust_log, "info");
        assert_eq!(config.listen_addr.port(), 3000);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("EXAM_API_BASE_URL", "https://lms.example.org/school"),
            ("EXAM_API_TOKEN", "abc"),
            ("EXAM_TICK_MILLIS", "250"),
            ("LISTEN_ADDR", "127.0.0.1:8080"),
        ]);
        assert_eq!(config.api_base_url.host_str(), Some("lms.example.org"));
        assert_eq!(config.api_token.as_deref(), Some("abc"));
        assert_eq!(config.tick_millis, 250);
        assert_eq!(config.listen_addr.port(), 8080);
    }

    #[test]
    fn test_bad_numbers_fall_back() {
        let config = config_from(&[("EXAM_TICK_MILLIS", "soon"), ("EXAM_API_TOKEN", "")]);
        assert_eq!(config.tick_millis, DEFAULT_TICK_MILLIS);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_invalid_base_url_is_an_error() {
        let result = Config::from_lookup(|key| match key {
            "EXAM_API_BASE_URL" => Some("not a url".to_string()),
            _ => None,
        });
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_zero_tick_is_clamped() {
        let config = config_from(&[("EXAM_TICK_MILLIS", "0")]);
        assert_eq!(config.tick_millis, 1);
    }
}
