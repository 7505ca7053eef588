use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::reflow::debounce::DEFAULT_QUIET_PERIOD;

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values are startup errors.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Quiet period after the last resize signal before the reflow pass runs.
    pub quiet_period: Duration,
    pub viewport_width_px: f32,
    /// Optional JSON page fixture to seed the document with.
    pub page_fixture: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            quiet_period: Duration::from_millis(parse_env(
                "REFLOW_QUIET_PERIOD_MS",
                DEFAULT_QUIET_PERIOD.as_millis() as u64,
            )?),
            viewport_width_px: checked_viewport_width(parse_env("VIEWPORT_WIDTH_PX", 1280.0)?)?,
            page_fixture: std::env::var("PAGE_FIXTURE").ok().map(PathBuf::from),
        })
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// Same rule as `POST /api/v1/viewport`: finite and non-negative.
fn checked_viewport_width(width: f32) -> Result<f32> {
    anyhow::ensure!(
        width.is_finite() && width >= 0.0,
        "VIEWPORT_WIDTH_PX must be a non-negative number, got {width}"
    );
    Ok(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_when_unset() {
        let value: u64 = parse_env("HERO_REFLOW_TEST_UNSET_VAR", 250).unwrap();
        assert_eq!(value, 250);
    }

    #[test]
    fn test_parse_env_reads_value() {
        std::env::set_var("HERO_REFLOW_TEST_PORT", " 9090 ");
        let value: u16 = parse_env("HERO_REFLOW_TEST_PORT", 8080).unwrap();
        assert_eq!(value, 9090);
    }

    #[test]
    fn test_viewport_width_rejects_nan_and_negative() {
        std::env::set_var("HERO_REFLOW_TEST_NAN_WIDTH", "NaN");
        let parsed: f32 = parse_env("HERO_REFLOW_TEST_NAN_WIDTH", 1280.0).unwrap();
        assert!(checked_viewport_width(parsed).is_err());

        assert!(checked_viewport_width(-1.0).is_err());
        assert!(checked_viewport_width(f32::INFINITY).is_err());
        assert_eq!(checked_viewport_width(0.0).unwrap(), 0.0);
        assert_eq!(checked_viewport_width(1280.0).unwrap(), 1280.0);
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        std::env::set_var("HERO_REFLOW_TEST_WIDTH", "wide");
        let result: Result<f32> = parse_env("HERO_REFLOW_TEST_WIDTH", 1280.0);
        assert!(result.is_err());
    }
}
