use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub orders: OrdersConfig,
    pub payment: PaymentConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Deadlines for calls to peer services
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    #[serde(default = "default_catalog_timeout")]
    pub catalog_timeout_ms: u64,
    #[serde(default = "default_payment_timeout")]
    pub payment_timeout_ms: u64,
}

impl RemoteConfig {
    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(self.catalog_timeout_ms)
    }

    pub fn payment_timeout(&self) -> Duration {
        Duration::from_millis(self.payment_timeout_ms)
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            catalog_timeout_ms: default_catalog_timeout(),
            payment_timeout_ms: default_payment_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct OrdersConfig {
    #[serde(default)]
    pub strict_transitions: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PaymentConfig {
    pub checkout_base_url: String,
    pub success_url: String,
    pub cancel_url: String,
}

fn default_max_connections() -> u32 { 5 }
fn default_acquire_timeout() -> u64 { 3 }
fn default_true() -> bool { true }
fn default_catalog_timeout() -> u64 { 3000 }
fn default_payment_timeout() -> u64 { 5000 }

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides are optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg.. `TALLY__DATABASE__URL=postgres://...` sets `database.url`
            .add_source(config::Environment::with_prefix("TALLY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
