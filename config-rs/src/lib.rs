//! config-rs/lib.rs
//! Environment-driven configuration for the contact API
//! Provides bind address resolution, rate-limit and logging settings

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Service name used as the environment prefix for the contact API
pub const CONTACT_API_SERVICE: &str = "CONTACT_API";

/// Default HTTP port for the contact API
pub const CONTACT_API_DEFAULT_PORT: u16 = 3000;

/// Errors raised when an explicit configuration value cannot be used
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}")]
    InvalidValue { var: String, value: String },
}

/// Load a `.env` file from the working directory if there is one.
///
/// Returns the path that was loaded. Called before logging is set up, so the
/// caller is responsible for reporting it.
pub fn load_env() -> Option<PathBuf> {
    dotenv::dotenv().ok()
}

/// Read and parse an environment variable.
///
/// Missing variables yield `Ok(None)`; present but unparsable ones yield an
/// error so callers can decide whether to fall back.
pub fn parse_env<T: FromStr>(var_name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(var_name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                var: var_name.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

/// Like [`parse_env`], but logs and falls back to `default` on bad input
fn env_or<T: FromStr>(var_name: &str, default: T) -> T {
    match parse_env(var_name) {
        Ok(Some(value)) => value,
        Ok(None) => default,
        Err(err) => {
            log::warn!("{}, using default", err);
            default
        }
    }
}

/// Get service port from environment variables with proper fallback
///
/// # Arguments
/// * `service_name` - The name of the service (e.g., "CONTACT_API")
/// * `default_port` - The default port to use if not specified in environment
pub fn get_service_port(service_name: &str, default_port: u16) -> u16 {
    let var_name = format!("{}_SERVICE_PORT", service_name.to_uppercase());
    env_or(&var_name, default_port)
}

/// Create a SocketAddr for binding a service
///
/// `<SERVICE>_SERVICE_ADDR` may hold `host:port` or `http(s)://host:port`;
/// otherwise the service binds all interfaces on its configured port.
pub fn get_bind_address(service_name: &str, default_port: u16) -> SocketAddr {
    let var_name = format!("{}_SERVICE_ADDR", service_name.to_uppercase());

    if let Ok(addr_str) = env::var(&var_name) {
        let trimmed = addr_str
            .strip_prefix("http://")
            .or_else(|| addr_str.strip_prefix("https://"))
            .unwrap_or(&addr_str);

        match trimmed.parse::<SocketAddr>() {
            Ok(addr) => return addr,
            Err(_) => log::warn!("Invalid address format in {}, using default", var_name),
        }
    }

    let port = get_service_port(service_name, default_port);
    SocketAddr::from(([0, 0, 0, 0], port))
}

/// Token-bucket settings for the request rate limiter
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitSettings {
    /// Tokens added per second
    pub rate: f64,
    /// Bucket capacity
    pub burst: u32,
    /// Sweep period; idle clients are evicted after three windows
    pub window: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            rate: 100.0,
            burst: 200,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitSettings {
    /// Read `<PREFIX>_RATE_LIMIT_RATE`, `_BURST` and `_WINDOW_SECS`.
    ///
    /// Missing, unparsable or non-positive values keep their defaults.
    pub fn from_env(prefix: &str) -> Self {
        let prefix = prefix.to_uppercase();
        let defaults = Self::default();

        let rate = env_or(&format!("{}_RATE_LIMIT_RATE", prefix), defaults.rate);
        let burst = env_or(&format!("{}_RATE_LIMIT_BURST", prefix), defaults.burst);
        let window_secs = env_or(
            &format!("{}_RATE_LIMIT_WINDOW_SECS", prefix),
            defaults.window.as_secs(),
        );

        Self {
            rate: if rate.is_finite() && rate > 0.0 { rate } else { defaults.rate },
            burst: if burst > 0 { burst } else { defaults.burst },
            window: if window_secs > 0 {
                Duration::from_secs(window_secs)
            } else {
                defaults.window
            },
        }
    }
}

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Text,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "text" | "pretty" => Ok(LogFormat::Text),
            _ => Err(ConfigError::InvalidValue {
                var: "LOG_FORMAT".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set
    pub level: String,
    pub format: LogFormat,
    pub service_name: String,
}

impl LoggingSettings {
    /// Read `LOG_LEVEL` (default `info`) and `LOG_FORMAT` (default `text`)
    pub fn from_env(service_name: &str) -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env_or("LOG_FORMAT", LogFormat::Text),
            service_name: service_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names; the process environment is shared
    // between test threads.

    #[test]
    fn test_get_service_port() {
        std::env::set_var("PORTTEST_SERVICE_PORT", "9000");
        assert_eq!(get_service_port("PORTTEST", 8000), 9000);

        std::env::set_var("BADPORT_SERVICE_PORT", "not-a-port");
        assert_eq!(get_service_port("BADPORT", 8000), 8000);

        std::env::remove_var("UNKNOWN_SERVICE_PORT");
        assert_eq!(get_service_port("UNKNOWN", 8000), 8000);
    }

    #[test]
    fn test_get_bind_address() {
        std::env::set_var("ADDRTEST_SERVICE_ADDR", "http://127.0.0.1:7000");
        assert_eq!(
            get_bind_address("ADDRTEST", 3000),
            "127.0.0.1:7000".parse::<SocketAddr>().unwrap()
        );

        std::env::remove_var("NOADDR_SERVICE_ADDR");
        std::env::remove_var("NOADDR_SERVICE_PORT");
        assert_eq!(
            get_bind_address("NOADDR", 3000),
            "0.0.0.0:3000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_parse_env() {
        std::env::set_var("PARSETEST_VALUE", " 42 ");
        assert_eq!(parse_env::<u32>("PARSETEST_VALUE"), Ok(Some(42)));

        std::env::set_var("PARSETEST_BAD", "forty-two");
        assert!(parse_env::<u32>("PARSETEST_BAD").is_err());

        assert_eq!(parse_env::<u32>("PARSETEST_MISSING"), Ok(None));
    }

    #[test]
    fn test_rate_limit_settings_from_env() {
        std::env::set_var("RLTEST_RATE_LIMIT_RATE", "2.5");
        std::env::set_var("RLTEST_RATE_LIMIT_BURST", "0");
        std::env::set_var("RLTEST_RATE_LIMIT_WINDOW_SECS", "30");

        let settings = RateLimitSettings::from_env("rltest");
        assert_eq!(settings.rate, 2.5);
        assert_eq!(settings.burst, 200);
        assert_eq!(settings.window, Duration::from_secs(30));

        assert_eq!(RateLimitSettings::from_env("RLMISSING"), RateLimitSettings::default());
    }

    #[test]
    fn test_log_format_parse() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
