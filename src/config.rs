use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub fetcher: FetcherConfig,
    pub monitor: MonitorConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    pub request_timeout: u64,
    pub user_agent: String,
    pub price_selector: String,
    pub image_selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Seconds between full sweeps.
    pub sweep_interval_secs: u64,
    /// Randomized pause between items, uniform within this range.
    pub item_delay_min_ms: u64,
    pub item_delay_max_ms: u64,
    /// Fixed timezone for `last_checked`, as minutes east of UTC.
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Start with default configuration
            .add_source(File::with_name("config/default"))
            // Add environment-specific config
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Add local config (ignored by git)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with prefix "DROPWATCH_"
            .add_source(Environment::with_prefix("DROPWATCH").separator("__"))
            .build()?;

        let config: AppConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Message(
                "Database max_connections must be greater than 0".into(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Message(
                "Database min_connections cannot exceed max_connections".into(),
            ));
        }

        if self.fetcher.request_timeout == 0 {
            return Err(ConfigError::Message(
                "Fetcher request_timeout must be greater than 0".into(),
            ));
        }

        if self.fetcher.price_selector.trim().is_empty() {
            return Err(ConfigError::Message(
                "Fetcher price_selector must not be empty".into(),
            ));
        }

        if self.monitor.sweep_interval_secs == 0 {
            return Err(ConfigError::Message(
                "Monitor sweep_interval_secs must be greater than 0".into(),
            ));
        }

        if self.monitor.item_delay_min_ms > self.monitor.item_delay_max_ms {
            return Err(ConfigError::Message(
                "Monitor item_delay_min_ms cannot exceed item_delay_max_ms".into(),
            ));
        }

        // Valid UTC offsets span UTC-12:00 to UTC+14:00
        if self.monitor.utc_offset_minutes < -12 * 60 || self.monitor.utc_offset_minutes > 14 * 60 {
            return Err(ConfigError::Message(
                "Monitor utc_offset_minutes must be between -720 and 840".into(),
            ));
        }

        if self.smtp.port == 0 {
            return Err(ConfigError::Message("SMTP port must be greater than 0".into()));
        }

        if self.smtp.from_address.trim().is_empty() {
            return Err(ConfigError::Message("SMTP from_address must not be empty".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 5,
                min_connections: 1,
                acquire_timeout: 30,
            },
            fetcher: FetcherConfig {
                request_timeout: 30,
                user_agent: "Dropwatch/1.0".to_string(),
                price_selector: "._25b18c ._30jeq3".to_string(),
                image_selector: ".CXW8mj img".to_string(),
            },
            monitor: MonitorConfig {
                sweep_interval_secs: 3600,
                item_delay_min_ms: 8000,
                item_delay_max_ms: 16000,
                utc_offset_minutes: 330,
            },
            smtp: SmtpConfig {
                host: "smtp.mail.yahoo.com".to_string(),
                port: 587,
                username: None,
                password: None,
                from_address: "alerts@example.com".to_string(),
                from_name: "Dropwatch".to_string(),
                use_tls: true,
            },
        }
    }

    #[test]
    fn test_config_validation_valid() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_db_connections() {
        let mut config = valid_config();
        config.database.min_connections = 15;
        config.database.max_connections = 10;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("min_connections cannot exceed max_connections"));
    }

    #[test]
    fn test_config_validation_empty_price_selector() {
        let mut config = valid_config();
        config.fetcher.price_selector = "  ".to_string();

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("price_selector must not be empty"));
    }

    #[test]
    fn test_config_validation_zero_sweep_interval() {
        let mut config = valid_config();
        config.monitor.sweep_interval_secs = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("sweep_interval_secs must be greater than 0"));
    }

    #[test]
    fn test_config_validation_inverted_item_delay() {
        let mut config = valid_config();
        config.monitor.item_delay_min_ms = 20_000;
        config.monitor.item_delay_max_ms = 10_000;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("item_delay_min_ms cannot exceed item_delay_max_ms"));
    }

    #[test]
    fn test_config_validation_out_of_range_offset() {
        let mut config = valid_config();
        config.monitor.utc_offset_minutes = 15 * 60;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("utc_offset_minutes must be between"));
    }

    #[test]
    fn test_config_validation_invalid_smtp_port() {
        let mut config = valid_config();
        config.smtp.port = 0;

        let result = config.validate();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("SMTP port must be greater than 0"));
    }
}
