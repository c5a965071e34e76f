use chrono::{DateTime, Utc};
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::exchange::MAX_BUILDER_FEE;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub budget: BudgetConfig,
    pub fees: FeeConfig,
    pub breaker: BreakerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BudgetConfig {
    /// Abstract cost units the primary parser may spend per month
    pub monthly_budget: Decimal,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeConfig {
    /// Default builder fee in tenths of a basis point (5 = 0.5 bp)
    pub builder_fee_default: u32,
    /// Zero-fee launch mode: all orders go out with f=0
    #[serde(default)]
    pub launch_zero_fee: bool,
    /// Zero-fee promotion end (RFC 3339)
    #[serde(default)]
    pub zero_fee_until: Option<DateTime<Utc>>,
    /// Address receiving builder fees
    #[serde(default = "default_builder_address")]
    pub builder_address: String,
}

fn default_builder_address() -> String {
    "0xbuilder".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    /// Errors inside the window that pause trading
    pub error_threshold: u32,
    /// Sliding window length in seconds
    pub window_secs: u64,
    /// How long trading stays paused after a trip, in seconds
    pub cooldown_secs: u64,
}

impl BreakerConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_secs(self.cooldown_secs)
    }
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            error_threshold: 3,
            window_secs: 60,
            cooldown_secs: 300, // 5 minutes
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("budget.monthly_budget", "200")?
            .set_default("fees.builder_fee_default", 5)?
            .set_default("fees.launch_zero_fee", false)?
            .set_default("fees.builder_address", "0xbuilder")?
            .set_default("breaker.error_threshold", 3)?
            .set_default("breaker.window_secs", 60)?
            .set_default("breaker.cooldown_secs", 300)?
            .set_default("logging.level", "info")?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/production.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("HLBOT_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (HLBOT_BUDGET__MONTHLY_BUDGET, etc.)
            .add_source(
                Environment::with_prefix("HLBOT")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Create a default configuration for CLI usage
    pub fn default_config() -> Self {
        use rust_decimal_macros::dec;

        Self {
            budget: BudgetConfig {
                monthly_budget: dec!(200),
            },
            fees: FeeConfig {
                builder_fee_default: 5,
                launch_zero_fee: false,
                zero_fee_until: None,
                builder_address: default_builder_address(),
            },
            breaker: BreakerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.budget.monthly_budget < Decimal::ZERO {
            errors.push("monthly_budget must not be negative".to_string());
        }

        if self.fees.builder_fee_default > MAX_BUILDER_FEE {
            errors.push(format!(
                "builder_fee_default {} exceeds the exchange maximum of {} tenths of a bp",
                self.fees.builder_fee_default, MAX_BUILDER_FEE
            ));
        }

        if self.fees.builder_address.trim().is_empty() {
            errors.push("builder_address must not be empty".to_string());
        }

        if self.breaker.error_threshold == 0 {
            errors.push("error_threshold must be at least 1".to_string());
        }

        if self.breaker.window_secs == 0 {
            errors.push("window_secs must be positive".to_string());
        }

        if self.breaker.cooldown_secs == 0 {
            errors.push("cooldown_secs must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
