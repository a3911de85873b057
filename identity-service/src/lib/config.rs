use std::env;

use auth::HashCost;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

const MIN_JWT_SECRET_BYTES: usize = 32;
const MAX_SESSION_HOURS: i64 = 30 * 24;
const MAX_RESET_MINUTES: i64 = 24 * 60;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub reset: ResetConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// When unset the service runs on the in-memory repository.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiration_hours: i64,
}

/// Argon2 work factors. `reset_hash_cost` applies to passwords chosen
/// through the reset flow.
#[derive(Debug, Deserialize, Clone)]
pub struct PasswordConfig {
    pub hash_cost: u32,
    pub reset_hash_cost: u32,
    pub memory_kib: u32,
}

impl PasswordConfig {
    pub fn standard_cost(&self) -> HashCost {
        HashCost::new(self.hash_cost, self.memory_kib)
    }

    pub fn reset_cost(&self) -> HashCost {
        HashCost::new(self.reset_hash_cost, self.memory_kib)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ResetConfig {
    pub expiration_minutes: i64,
    pub link_base_url: String,
    /// Redemption attempts allowed per client address in each window
    #[serde(default = "default_redeem_limit")]
    pub redeem_limit: u32,
    #[serde(default = "default_redeem_window_seconds")]
    pub redeem_window_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_redeem_limit() -> u32 {
    3
}

fn default_redeem_window_seconds() -> u64 {
    60
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (DATABASE__URL, JWT__SECRET, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Example: RESET__EXPIRATION_MINUTES=30 overrides reset.expiration_minutes
            .add_source(Environment::with_prefix("").separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    /// Reject settings the service cannot run safely with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.jwt.secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::Message(format!(
                "jwt.secret must be at least {} bytes",
                MIN_JWT_SECRET_BYTES
            )));
        }
        if !(1..=MAX_SESSION_HOURS).contains(&self.jwt.expiration_hours) {
            return Err(ConfigError::Message(format!(
                "jwt.expiration_hours must be between 1 and {}",
                MAX_SESSION_HOURS
            )));
        }
        if !(1..=MAX_RESET_MINUTES).contains(&self.reset.expiration_minutes) {
            return Err(ConfigError::Message(format!(
                "reset.expiration_minutes must be between 1 and {}",
                MAX_RESET_MINUTES
            )));
        }
        if self.reset.redeem_limit == 0 || self.reset.redeem_window_seconds == 0 {
            return Err(ConfigError::Message(
                "reset.redeem_limit and reset.redeem_window_seconds must be positive".to_string(),
            ));
        }
        if self.password.hash_cost == 0 || self.password.reset_hash_cost == 0 {
            return Err(ConfigError::Message(
                "password hash costs must be positive".to_string(),
            ));
        }
        if self.reset.link_base_url.trim().is_empty() {
            return Err(ConfigError::Message(
                "reset.link_base_url must be set".to_string(),
            ));
        }
        Ok(())
    }
}
