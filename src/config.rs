use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;
use validator::Validate;

const CONFIG_DIR: &str = "config";
const DEFAULT_ENV: &str = "development";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),
    #[error("missing required setting: {0}")]
    Missing(String),
}

/// Application configuration, loaded from `config/*.toml` files layered
/// with `APP__`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL
    pub database_url: String,

    /// JWT secret key
    #[validate(length(min = 32))]
    pub jwt_secret: String,

    /// JWT access token lifetime in seconds
    #[serde(default = "default_jwt_expiration")]
    pub jwt_expiration: u64,

    /// JWT issuer / audience
    #[serde(default = "default_jwt_issuer")]
    pub auth_issuer: String,
    #[serde(default = "default_jwt_audience")]
    pub auth_audience: String,

    /// Server bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment (development, test, production)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Whether to run database migrations on startup
    #[serde(default)]
    pub auto_migrate: bool,

    /// DB pool: max connections
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// DB pool: min connections
    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// DB connect timeout (seconds)
    #[serde(default = "default_db_connect_timeout_secs")]
    pub db_connect_timeout_secs: u64,

    /// Currency charged for all orders (ISO 4217)
    #[serde(default = "default_currency")]
    pub currency: String,

    /// PayPal REST credentials (service-level, not per-user)
    #[serde(default)]
    pub paypal_client_id: String,
    #[serde(default)]
    pub paypal_client_secret: String,

    /// PayPal API base URL; the sandbox by default
    #[serde(default = "default_paypal_base_url")]
    pub paypal_base_url: String,

    /// Where the provider redirects the payer after approving / aborting
    #[serde(default = "default_paypal_return_url")]
    pub paypal_return_url: String,
    #[serde(default = "default_paypal_cancel_url")]
    pub paypal_cancel_url: String,
}

fn default_jwt_expiration() -> u64 {
    3600
}
fn default_jwt_issuer() -> String {
    "coursestack-auth".to_string()
}
fn default_jwt_audience() -> String {
    "coursestack-api".to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}
fn default_db_connect_timeout_secs() -> u64 {
    30
}
fn default_currency() -> String {
    "USD".to_string()
}
fn default_paypal_base_url() -> String {
    "https://api.sandbox.paypal.com".to_string()
}
fn default_paypal_return_url() -> String {
    "http://localhost:8000/api/v1/payments/paypal-success".to_string()
}
fn default_paypal_cancel_url() -> String {
    "http://localhost:8000/api/v1/payments/paypal-cancel".to_string()
}

impl AppConfig {
    /// Construct a configuration directly; used by the test harness.
    pub fn new(database_url: String, jwt_secret: String, port: u16, environment: String) -> Self {
        Self {
            database_url,
            jwt_secret,
            jwt_expiration: default_jwt_expiration(),
            auth_issuer: default_jwt_issuer(),
            auth_audience: default_jwt_audience(),
            host: "127.0.0.1".to_string(),
            port,
            environment,
            log_level: default_log_level(),
            log_json: false,
            auto_migrate: false,
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            db_connect_timeout_secs: default_db_connect_timeout_secs(),
            currency: default_currency(),
            paypal_client_id: String::new(),
            paypal_client_secret: String::new(),
            paypal_base_url: default_paypal_base_url(),
            paypal_return_url: default_paypal_return_url(),
            paypal_cancel_url: default_paypal_cancel_url(),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Load configuration for the environment selected by `RUN_ENV`/`APP_ENV`.
///
/// `jwt_secret` has no default: it must come from a config file or the
/// `APP__JWT_SECRET` environment variable.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let builder = Config::builder()
        .set_default("database_url", "sqlite://coursestack.db?mode=rwc")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false));

    let config = builder
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    if config.get_string("jwt_secret").is_err() {
        return Err(AppConfigError::Missing(
            "jwt_secret (set APP__JWT_SECRET or add it to a config file)".to_string(),
        ));
    }

    let cfg: AppConfig = config.try_deserialize()?;
    cfg.validate()?;
    Ok(cfg)
}

/// Initialize the global tracing subscriber. `RUST_LOG` overrides the
/// configured level when set.
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default_directive = format!("coursestack_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    let filter = EnvFilter::try_new(filter_directive)
        .unwrap_or_else(|_| EnvFilter::new(format!("coursestack_api={}", level)));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "test_secret_key_for_testing_purposes_only".to_string(),
            18080,
            "test".to_string(),
        );

        assert_eq!(cfg.currency, "USD");
        assert_eq!(cfg.jwt_expiration, 3600);
        assert!(cfg.paypal_base_url.contains("sandbox"));
        assert!(!cfg.is_development());
    }

    #[test]
    fn test_jwt_secret_length_validated() {
        let cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "short".to_string(),
            18080,
            "test".to_string(),
        );
        assert!(cfg.validate().is_err());
    }
}
