use crate::estimation::dealshield::StressBand;
use crate::estimation::EngineSettings;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the estimator service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub estimator: EstimatorConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let format = match environment {
            AppEnvironment::Production => LogFormat::Full,
            AppEnvironment::Development | AppEnvironment::Test => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            estimator: EstimatorConfig::from_env()?,
        })
    }
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

/// Estimating defaults shared by the cost engine, analyzer and DealShield.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimatorConfig {
    pub stress_band: StressBand,
    /// Fraction (0.0-0.5) replacing the contingency table when present.
    pub contingency_override: Option<f64>,
    pub include_financing: bool,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            stress_band: StressBand::Ten,
            contingency_override: None,
            include_financing: true,
        }
    }
}

impl EstimatorConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let stress_band = match env::var("ESTIMATOR_STRESS_BAND_PCT") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(|pct| StressBand::try_from(pct).ok())
                .ok_or(ConfigError::InvalidStressBand(raw))?,
            Err(_) => StressBand::Ten,
        };

        let contingency_override = match env::var("ESTIMATOR_CONTINGENCY_PCT") {
            Ok(raw) => {
                let pct = raw
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|pct| pct.is_finite() && (0.0..=50.0).contains(pct))
                    .ok_or(ConfigError::InvalidContingency(raw))?;
                Some(pct / 100.0)
            }
            Err(_) => None,
        };

        let include_financing = env::var("ESTIMATOR_INCLUDE_FINANCING")
            .map(|raw| !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"))
            .unwrap_or(true);

        Ok(Self {
            stress_band,
            contingency_override,
            include_financing,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            contingency_override: self.contingency_override,
            default_stress_band: self.stress_band,
            include_financing: self.include_financing,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidStressBand(String),
    InvalidContingency(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStressBand(raw) => write!(
                f,
                "ESTIMATOR_STRESS_BAND_PCT must be one of 3, 5, 7 or 10 (found '{raw}')"
            ),
            ConfigError::InvalidContingency(raw) => write!(
                f,
                "ESTIMATOR_CONTINGENCY_PCT must be a percentage between 0 and 50 (found '{raw}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidStressBand(_)
            | ConfigError::InvalidContingency(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "ESTIMATOR_STRESS_BAND_PCT",
            "ESTIMATOR_CONTINGENCY_PCT",
            "ESTIMATOR_INCLUDE_FINANCING",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.estimator, EstimatorConfig::default());
    }

    #[test]
    fn estimator_overrides_are_parsed() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ESTIMATOR_STRESS_BAND_PCT", "5");
        env::set_var("ESTIMATOR_CONTINGENCY_PCT", "12.5");
        env::set_var("ESTIMATOR_INCLUDE_FINANCING", "false");

        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.estimator.stress_band, StressBand::Five);
        assert_eq!(config.estimator.contingency_override, Some(0.125));
        assert!(!config.estimator.include_financing);
        reset_env();
    }

    #[test]
    fn rejects_unsupported_stress_band() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ESTIMATOR_STRESS_BAND_PCT", "12");

        match AppConfig::load() {
            Err(ConfigError::InvalidStressBand(raw)) => assert_eq!(raw, "12"),
            other => panic!("expected stress band error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }
}
