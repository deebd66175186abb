//! Configuration for the cost estimator

use core_config::{Environment, FromEnv, PricingApiConfig};
use eyre::{Result, WrapErr};

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub pricing: PricingApiConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let config = Config {
            environment: Environment::from_env(),
            pricing: PricingApiConfig::from_env().wrap_err("Invalid pricing API configuration")?,
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(["APP_ENV", "PRICING_API_KEY", "PRICING_BATCH_SIZE"], || {
            let config = Config::from_env().unwrap();
            assert!(config.environment.is_development());
            assert_eq!(config.pricing.api_key, None);
            assert_eq!(config.pricing.batch_size, 100);
        });
    }

    #[test]
    fn test_from_env_reports_bad_values() {
        temp_env::with_var("PRICING_BATCH_SIZE", Some("lots"), || {
            let err = Config::from_env().unwrap_err();
            assert!(format!("{err:#}").contains("PRICING_BATCH_SIZE"));
        });
    }
}
