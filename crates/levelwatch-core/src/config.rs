//! Configuration management for Levelwatch
//!
//! Everything is read from environment variables. [`Config::from_env`] loads
//! an optional `.env` file first; [`Config::from_lookup`] accepts any lookup
//! function so callers can supply values without touching the process
//! environment.
//!
//! | Env Var                    | Default                        |
//! |----------------------------|--------------------------------|
//! | `HOST`                     | `0.0.0.0`                      |
//! | `PORT`                     | `8080` (`:8080` also accepted) |
//! | `DATABASE_URL`             | `sqlite://data.db`             |
//! | `DATABASE_MAX_CONNECTIONS` | `5`                            |
//! | `LEVEL_THRESHOLD`          | unset (alerting disabled)      |
//! | `NOTIFICATION_COOLDOWN`    | `1h`                           |
//! | `SMS_API_KEY`              | unset                          |
//! | `SMS_PHONE_NUMBER`         | unset                          |
//! | `SMS_FROM`                 | `Test`                         |
//! | `SMS_API_URL`              | `https://api.smsapi.pl/sms.do` |
//! | `SMS_TIMEOUT`              | `10s`                          |
//! | `LOG_LEVEL`                | `info`                         |
//! | `LOG_FORMAT`               | `pretty`                       |

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default SMSAPI endpoint
pub const DEFAULT_SMS_API_URL: &str = "https://api.smsapi.pl/sms.do";

/// Main configuration struct
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Threshold alerting configuration
    pub alerting: AlertingConfig,

    /// SMS gateway configuration
    pub sms: SmsConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    pub fn from_env() -> Result<Self> {
        // A missing .env is normal in production.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, like the shell scripts that feed us.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let defaults = Self::default();

        let server = ServerConfig {
            host: get("HOST").unwrap_or(defaults.server.host),
            port: match get("PORT") {
                Some(raw) => parse_port(&raw)?,
                None => defaults.server.port,
            },
        };

        let database = DatabaseConfig {
            url: get("DATABASE_URL").unwrap_or(defaults.database.url),
            max_connections: match get("DATABASE_MAX_CONNECTIONS") {
                Some(raw) => parse_number("DATABASE_MAX_CONNECTIONS", &raw)?,
                None => defaults.database.max_connections,
            },
        };

        let alerting = AlertingConfig {
            threshold: get("LEVEL_THRESHOLD")
                .map(|raw| parse_threshold(&raw))
                .transpose()?,
            cooldown: match get("NOTIFICATION_COOLDOWN") {
                Some(raw) => parse_duration("NOTIFICATION_COOLDOWN", &raw)?,
                None => defaults.alerting.cooldown,
            },
        };

        let api_url = get("SMS_API_URL").unwrap_or(defaults.sms.api_url);
        url::Url::parse(&api_url)
            .map_err(|e| Error::config(format!("SMS_API_URL is not a valid URL: {e}")))?;

        let sms = SmsConfig {
            api_key: get("SMS_API_KEY"),
            phone_number: get("SMS_PHONE_NUMBER"),
            sender: get("SMS_FROM").unwrap_or(defaults.sms.sender),
            api_url,
            timeout: match get("SMS_TIMEOUT") {
                Some(raw) => parse_duration("SMS_TIMEOUT", &raw)?,
                None => defaults.sms.timeout,
            },
        };

        let logging = LoggingConfig {
            level: get("LOG_LEVEL").unwrap_or(defaults.logging.level),
            format: match get("LOG_FORMAT") {
                Some(raw) => raw.parse()?,
                None => defaults.logging.format,
            },
        };

        Ok(Self {
            server,
            database,
            alerting,
            sms,
            logging,
        })
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// HTTP port
    pub port: u16,
}

impl ServerConfig {
    /// Socket address string to bind
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// SQLite URL
    pub url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Threshold alerting configuration
#[derive(Debug, Clone)]
pub struct AlertingConfig {
    /// Level at or above which an alert fires. `None` disables alerting.
    pub threshold: Option<f64>,
    /// Minimum interval between two alerts
    pub cooldown: Duration,
}

impl Default for AlertingConfig {
    fn default() -> Self {
        Self {
            threshold: None,
            cooldown: Duration::from_secs(60 * 60),
        }
    }
}

/// SMS gateway configuration
#[derive(Clone)]
pub struct SmsConfig {
    /// Bearer token for the gateway
    pub api_key: Option<String>,
    /// Destination phone number
    pub phone_number: Option<String>,
    /// Sender name shown on the handset
    pub sender: String,
    /// Gateway endpoint
    pub api_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for SmsConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            phone_number: None,
            sender: "Test".to_string(),
            api_url: DEFAULT_SMS_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for SmsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmsConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("phone_number", &self.phone_number)
            .field("sender", &self.sender)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(Error::config(format!(
                "LOG_FORMAT must be 'pretty' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

fn parse_port(raw: &str) -> Result<u16> {
    let trimmed = raw.strip_prefix(':').unwrap_or(raw);
    trimmed
        .parse()
        .map_err(|_| Error::config(format!("PORT must be a valid port number, got '{raw}'")))
}

fn parse_threshold(raw: &str) -> Result<f64> {
    let threshold: f64 = raw
        .parse()
        .map_err(|e| Error::config(format!("Invalid LEVEL_THRESHOLD value '{raw}': {e}")))?;
    if !threshold.is_finite() {
        return Err(Error::config(format!(
            "LEVEL_THRESHOLD must be a finite number, got '{raw}'"
        )));
    }
    Ok(threshold)
}

fn parse_duration(key: &str, raw: &str) -> Result<Duration> {
    humantime::parse_duration(raw)
        .map_err(|e| Error::config(format!("Invalid {key} value '{raw}': {e}")))
}

fn parse_number<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::config(format!("{key} must be a number, got '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.server.addr(), "0.0.0.0:8080");
        assert_eq!(config.database.url, "sqlite://data.db");
        assert_eq!(config.alerting.threshold, None);
        assert_eq!(config.alerting.cooldown, Duration::from_secs(3600));
        assert_eq!(config.sms.sender, "Test");
        assert_eq!(config.sms.api_url, DEFAULT_SMS_API_URL);
        assert_eq!(config.sms.timeout, Duration::from_secs(10));
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_port_accepts_leading_colon() {
        let config = config_from(&[("PORT", ":9090")]).unwrap();
        assert_eq!(config.server.port, 9090);

        let config = config_from(&[("PORT", "9091")]).unwrap();
        assert_eq!(config.server.port, 9091);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_threshold_parsing() {
        let config = config_from(&[("LEVEL_THRESHOLD", "10.5")]).unwrap();
        assert_eq!(config.alerting.threshold, Some(10.5));

        let config = config_from(&[("LEVEL_THRESHOLD", "   ")]).unwrap();
        assert_eq!(config.alerting.threshold, None);

        assert!(config_from(&[("LEVEL_THRESHOLD", "high")]).is_err());
        assert!(config_from(&[("LEVEL_THRESHOLD", "NaN")]).is_err());
        assert!(config_from(&[("LEVEL_THRESHOLD", "inf")]).is_err());
    }

    #[test]
    fn test_cooldown_uses_humantime() {
        let config = config_from(&[("NOTIFICATION_COOLDOWN", "30m")]).unwrap();
        assert_eq!(config.alerting.cooldown, Duration::from_secs(30 * 60));

        assert!(config_from(&[("NOTIFICATION_COOLDOWN", "soon")]).is_err());
    }

    #[test]
    fn test_sms_settings() {
        let config = config_from(&[
            ("SMS_API_KEY", "secret"),
            ("SMS_PHONE_NUMBER", "48500100200"),
            ("SMS_FROM", "Septic"),
        ])
        .unwrap();

        assert_eq!(config.sms.api_key.as_deref(), Some("secret"));
        assert_eq!(config.sms.phone_number.as_deref(), Some("48500100200"));
        assert_eq!(config.sms.sender, "Septic");
        assert!(!format!("{:?}", config.sms).contains("secret"));

        assert!(config_from(&[("SMS_API_URL", "not a url")]).is_err());
    }

    #[test]
    fn test_log_format() {
        let config = config_from(&[("LOG_FORMAT", "JSON")]).unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);

        assert!(config_from(&[("LOG_FORMAT", "xml")]).is_err());
    }
}
