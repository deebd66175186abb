use serde::Deserialize;
use strum::Display;
use thiserror::Error;

/// Result type for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Errors that can occur while resolving prices against the catalog.
///
/// The variant is decided once at the transport boundary. Callers match on
/// [`PricingError::kind`] instead of inspecting messages.
#[derive(Debug, Error)]
pub enum PricingError {
    /// Connection failure or a response body that could not be decoded
    #[error("Transport error: {0}")]
    Transport(String),

    /// The catalog rejected the API key
    #[error("Invalid API key")]
    InvalidApiKey,

    /// The account ran out of catalog quota
    #[error("Pricing API quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other non-success response from the catalog
    #[error("Pricing API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of [`PricingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    InvalidApiKey,
    QuotaExceeded,
    Api,
    Internal,
}

impl PricingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PricingError::Transport(_) => ErrorKind::Transport,
            PricingError::InvalidApiKey => ErrorKind::InvalidApiKey,
            PricingError::QuotaExceeded(_) => ErrorKind::QuotaExceeded,
            PricingError::Api { .. } => ErrorKind::Api,
            PricingError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Credential and quota failures affect every request, retrying is pointless
    pub fn is_account_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidApiKey | ErrorKind::QuotaExceeded)
    }

    /// A targeted hint for errors the user can fix themselves
    pub fn remediation(&self) -> Option<&'static str> {
        match self.kind() {
            ErrorKind::InvalidApiKey => {
                Some("Check that PRICING_API_KEY is set to a valid pricing API key")
            }
            ErrorKind::QuotaExceeded => {
                Some("The pricing API quota for this key is used up, wait for it to reset or upgrade the plan")
            }
            _ => None,
        }
    }

    /// Translate a non-success catalog response into a typed error
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let Ok(response) = serde_json::from_slice::<ApiErrorResponse>(body) else {
            if status == 429 {
                return PricingError::QuotaExceeded(format!("HTTP {status}"));
            }
            return PricingError::Transport(format!(
                "Invalid response from pricing API (HTTP {status})"
            ));
        };

        let code = response.error_code.as_deref().unwrap_or_default();
        let message = response.error.unwrap_or_else(|| format!("HTTP {status}"));

        match code {
            "invalid_api_key" | "api_key_invalid" => PricingError::InvalidApiKey,
            "exceeded_quota" | "quota_exceeded" => PricingError::QuotaExceeded(message),
            _ if message == "Invalid API key" => PricingError::InvalidApiKey,
            _ if status == 429 => PricingError::QuotaExceeded(message),
            _ => PricingError::Api { status, message },
        }
    }
}

impl From<reqwest::Error> for PricingError {
    fn from(err: reqwest::Error) -> Self {
        PricingError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for PricingError {
    fn from(err: serde_json::Error) -> Self {
        PricingError::Transport(format!("Invalid response from pricing API: {err}"))
    }
}

/// Error body returned by the catalog on non-success responses
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}
