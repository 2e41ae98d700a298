use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::assessment::{InputViolations, TemplateConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the assessment service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringDefaults,
}

impl AppConfig {
    /// Reads `.env` when present, then the `APP_*` environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::parse(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringDefaults::from_env()?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Level-walk thresholds applied to templates seeded by the service.
///
/// Each variable falls back to the built-in template default:
/// `APP_HIGH_TENURE_THRESHOLD` (95), `APP_LOW_TENURE_THRESHOLD` (80),
/// `APP_TENURE_CUTOFF_YEARS` (3) and `APP_EXPECTED_LEVEL` ("Advanced").
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringDefaults {
    pub template: TemplateConfig,
}

impl ScoringDefaults {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = TemplateConfig::default();
        let template = TemplateConfig {
            high_tenure_threshold: number_or(
                "APP_HIGH_TENURE_THRESHOLD",
                defaults.high_tenure_threshold,
            )?,
            low_tenure_threshold: number_or(
                "APP_LOW_TENURE_THRESHOLD",
                defaults.low_tenure_threshold,
            )?,
            tenure_years_cutoff: number_or(
                "APP_TENURE_CUTOFF_YEARS",
                defaults.tenure_years_cutoff,
            )?,
            default_expected_level: env::var("APP_EXPECTED_LEVEL")
                .unwrap_or(defaults.default_expected_level),
        };
        template.validate().map_err(ConfigError::InvalidScoring)?;
        Ok(Self { template })
    }
}

fn number_or(name: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ConfigError::InvalidNumber { name, value: raw }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { name: &'static str, value: String },
    InvalidScoring(InputViolations),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { name, value } => {
                write!(f, "{name} must be a number, got '{value}'")
            }
            ConfigError::InvalidScoring(violations) => {
                write!(f, "scoring defaults rejected: {violations}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidScoring(violations) => Some(violations),
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
        }
    }
}

/// Serializes tests that read or mutate process environment variables.
#[cfg(test)]
pub(crate) fn env_guard() -> std::sync::MutexGuard<'static, ()> {
    use std::sync::{Mutex, OnceLock};

    static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
    GUARD
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
