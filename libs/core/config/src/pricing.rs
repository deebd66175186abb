use crate::{env_optional, env_or_default, env_parse, ConfigError, FromEnv};

pub const DEFAULT_PRICING_API_ENDPOINT: &str = "https://pricing.api.infracost.io";
pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_CACHE_OBJECT_LIMIT: usize = 200;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for the remote pricing catalog
#[derive(Clone, Debug, PartialEq)]
pub struct PricingApiConfig {
    /// Base URL, the GraphQL path is appended by the client
    pub endpoint: String,
    /// Only needed when prices are resolved against the catalog
    pub api_key: Option<String>,
    pub currency: String,
    /// Maximum number of queries packed into one request
    pub batch_size: usize,
    pub cache_disabled: bool,
    pub cache_object_limit: usize,
    /// Overrides the CPU-derived worker pool size
    pub workers: Option<usize>,
    pub timeout_secs: u64,
}

impl PricingApiConfig {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            ..Self::default()
        }
    }

    /// GraphQL endpoint derived from the base URL
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.endpoint.trim_end_matches('/'))
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("PRICING_API_KEY".to_string()))
    }
}

impl Default for PricingApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PRICING_API_ENDPOINT.to_string(),
            api_key: None,
            currency: DEFAULT_CURRENCY.to_string(),
            batch_size: DEFAULT_BATCH_SIZE,
            cache_disabled: false,
            cache_object_limit: DEFAULT_CACHE_OBJECT_LIMIT,
            workers: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FromEnv for PricingApiConfig {
    /// Reads the PRICING_* variables, every one of them has a default
    fn from_env() -> Result<Self, ConfigError> {
        let batch_size = env_parse("PRICING_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PRICING_BATCH_SIZE".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        let workers = match env_optional("PRICING_WORKERS") {
            Some(_) => Some(env_parse("PRICING_WORKERS", 0usize)?).filter(|w| *w > 0),
            None => None,
        };

        // PRICING_CACHE_OBJECT_SIZE is the older name of the same setting
        let cache_object_limit = match env_optional("PRICING_CACHE_OBJECT_LIMIT") {
            Some(_) => env_parse("PRICING_CACHE_OBJECT_LIMIT", DEFAULT_CACHE_OBJECT_LIMIT)?,
            None => env_parse("PRICING_CACHE_OBJECT_SIZE", DEFAULT_CACHE_OBJECT_LIMIT)?,
        };

        Ok(Self {
            endpoint: env_or_default("PRICING_API_ENDPOINT", DEFAULT_PRICING_API_ENDPOINT),
            api_key: env_optional("PRICING_API_KEY"),
            currency: env_or_default("PRICING_CURRENCY", DEFAULT_CURRENCY).to_uppercase(),
            batch_size,
            cache_disabled: env_parse("PRICING_CACHE_DISABLED", false)?,
            cache_object_limit,
            workers,
            timeout_secs: env_parse("PRICING_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?,
        })
    }
}
