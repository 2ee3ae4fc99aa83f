use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

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

const WORKFLOW_URL_PREFIX: &str = "RELAY_WORKFLOW_";

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub sync: SyncTuning,
    pub validation: ValidationTuning,
    pub relay: RelaySettings,
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
        let ansi = env::var("APP_LOG_ANSI")
            .map(|value| matches!(value.trim(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let poll_interval_secs = parse_number::<u64>("SYNC_POLL_INTERVAL_SECS", 30)?;
        let debounce_ms = parse_number::<u64>("SYNC_DEBOUNCE_MS", 500)?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "SYNC_POLL_INTERVAL_SECS",
                value: "0".to_string(),
            });
        }

        let minimum_photos = parse_number::<usize>("VALIDATION_MIN_PHOTOS", 3)?;
        let minimum_deficiencies = parse_number::<usize>("VALIDATION_MIN_DEFICIENCIES", 1)?;

        let relay = RelaySettings {
            shared_secret: env::var("RELAY_SHARED_SECRET").ok(),
            origin: env::var("RELAY_ORIGIN").unwrap_or_else(|_| "inspection-ai".to_string()),
            workflows: workflow_urls(env::vars()),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, ansi },
            sync: SyncTuning {
                poll_interval: Duration::from_secs(poll_interval_secs),
                debounce_window: Duration::from_millis(debounce_ms),
            },
            validation: ValidationTuning {
                minimum_photos,
                minimum_deficiencies,
            },
            relay,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key, value: raw }),
        Err(_) => Ok(default),
    }
}

fn workflow_urls<I>(vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(WORKFLOW_URL_PREFIX)?;
            let url = value.trim();
            if name.is_empty() || url.is_empty() {
                return None;
            }
            Some((name.to_ascii_lowercase().replace('_', "-"), url.to_string()))
        })
        .collect()
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
    pub ansi: bool,
}

/// Timers driving the inspection sync coordinator.
#[derive(Debug, Clone, Copy)]
pub struct SyncTuning {
    pub poll_interval: Duration,
    pub debounce_window: Duration,
}

/// Deployment-level overrides for inspection completeness thresholds.
#[derive(Debug, Clone, Copy)]
pub struct ValidationTuning {
    pub minimum_photos: usize,
    pub minimum_deficiencies: usize,
}

/// Outbound workflow relay endpoints and signing secret.
#[derive(Clone)]
pub struct RelaySettings {
    pub shared_secret: Option<String>,
    pub origin: String,
    pub workflows: BTreeMap<String, String>,
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "***"))
            .field("origin", &self.origin)
            .field("workflows", &self.workflows)
            .finish()
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a positive integer (found '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidNumber { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
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
            "APP_LOG_ANSI",
            "SYNC_POLL_INTERVAL_SECS",
            "SYNC_DEBOUNCE_MS",
            "VALIDATION_MIN_PHOTOS",
            "VALIDATION_MIN_DEFICIENCIES",
            "RELAY_SHARED_SECRET",
            "RELAY_ORIGIN",
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
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.sync.poll_interval, Duration::from_secs(30));
        assert_eq!(config.sync.debounce_window, Duration::from_millis(500));
        assert_eq!(config.validation.minimum_photos, 3);
        assert_eq!(config.validation.minimum_deficiencies, 1);
        assert_eq!(config.relay.origin, "inspection-ai");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        env::remove_var("APP_HOST");
    }

    #[test]
    fn rejects_non_numeric_photo_minimum() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("VALIDATION_MIN_PHOTOS", "three");
        let err = AppConfig::load().expect_err("invalid number rejected");
        assert!(err.to_string().contains("VALIDATION_MIN_PHOTOS"));
        env::remove_var("VALIDATION_MIN_PHOTOS");
    }

    #[test]
    fn collects_workflow_urls_by_prefix() {
        let vars = vec![
            (
                "RELAY_WORKFLOW_INSPECTION_COMPLETED".to_string(),
                "https://hooks.example.test/a".to_string(),
            ),
            ("RELAY_WORKFLOW_EMPTY".to_string(), "  ".to_string()),
            ("UNRELATED".to_string(), "value".to_string()),
        ];

        let urls = workflow_urls(vars);
        assert_eq!(urls.len(), 1);
        assert_eq!(
            urls.get("inspection-completed").map(String::as_str),
            Some("https://hooks.example.test/a")
        );
    }

    #[test]
    fn relay_settings_debug_masks_secret() {
        let settings = RelaySettings {
            shared_secret: Some("topsecret".to_string()),
            origin: "inspection-ai".to_string(),
            workflows: BTreeMap::new(),
        };
        let rendered = format!("{settings:?}");
        assert!(!rendered.contains("topsecret"));
    }
}
