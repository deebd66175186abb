//! HTTP transport for the pricing catalog's GraphQL endpoint.

use async_trait::async_trait;
use core_config::PricingApiConfig;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::client::CatalogTransport;
use crate::error::{PricingError, PricingResult};
use crate::query::{CatalogResult, GraphQLQuery};

const API_KEY_HEADER: &str = "X-Api-Key";
const TRACE_ID_HEADER: &str = "X-Trace-Id";
const BEARER_KEY_PREFIX: &str = "ico-";

/// Posts batches of queries to `<endpoint>/graphql`
pub struct HttpCatalogTransport {
    client: Client,
    url: String,
    api_key: Option<String>,
    user_agent: String,
}

impl HttpCatalogTransport {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> PricingResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key,
            user_agent: format!("cost-estimator/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn from_config(config: &PricingApiConfig) -> PricingResult<Self> {
        Self::new(
            config.graphql_url(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Header name and value carrying the API key
fn auth_header(api_key: &str) -> (&'static str, String) {
    if api_key.starts_with(BEARER_KEY_PREFIX) {
        (AUTHORIZATION.as_str(), format!("Bearer {api_key}"))
    } else {
        (API_KEY_HEADER, api_key.to_string())
    }
}

#[async_trait]
impl CatalogTransport for HttpCatalogTransport {
    async fn post_queries(&self, queries: &[GraphQLQuery]) -> PricingResult<Vec<CatalogResult>> {
        let trace_id = Uuid::new_v4();
        debug!(
            url = %self.url,
            queries = queries.len(),
            trace_id = %trace_id,
            "Sending pricing API request"
        );

        let mut request = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, &self.user_agent)
            .header(TRACE_ID_HEADER, trace_id.to_string())
            .json(queries);

        if let Some(key) = &self.api_key {
            let (name, value) = auth_header(key);
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let err = PricingError::from_response(status.as_u16(), &body);
            warn!(status = status.as_u16(), trace_id = %trace_id, error = %err, "Pricing API request failed");
            return Err(err);
        }

        let results: Vec<CatalogResult> = serde_json::from_slice(&body)?;
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProductFilter;
    use crate::query::PriceQuery;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve a single canned response and hand back the raw request head
    async fn serve_once(status: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
                let text = String::from_utf8_lossy(&buf).to_string();
                if let Some(head_end) = text.find("\r\n\r\n") {
                    let content_length = text[..head_end]
                        .lines()
                        .find_map(|l| {
                            let (name, value) = l.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if buf.len() >= head_end + 4 + content_length {
                        let _ = tx.send(text[..head_end].to_string());
                        break;
                    }
                }
            }

            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });

        (format!("http://{addr}/graphql"), rx)
    }

    fn queries() -> Vec<GraphQLQuery> {
        let filter = ProductFilter {
            vendor_name: "aws".to_string(),
            sku: Some("ABC".to_string()),
            ..Default::default()
        };
        vec![PriceQuery::new(filter, None, "USD").to_graphql()]
    }

    #[test]
    fn test_auth_header_scheme() {
        assert_eq!(auth_header("ico-123"), ("authorization", "Bearer ico-123".to_string()));
        assert_eq!(auth_header("abc"), ("X-Api-Key", "abc".to_string()));
    }

    #[test]
    fn test_from_config_uses_graphql_url() {
        let config = PricingApiConfig::new("https://pricing.example.com/", Some("key".to_string()));
        let transport = HttpCatalogTransport::from_config(&config).unwrap();
        assert_eq!(transport.url(), "https://pricing.example.com/graphql");
    }

    #[tokio::test]
    async fn test_successful_batch() {
        let (url, head) = serve_once(
            "200 OK",
            r#"[{"data":{"products":[{"prices":[{"priceHash":"h1","USD":"0.01"}]}]}}]"#,
        )
        .await;
        let transport =
            HttpCatalogTransport::new(url, Some("secret".to_string()), Duration::from_secs(5)).unwrap();

        let results = transport.post_queries(&queries()).await.unwrap();
        assert_eq!(results[0].products()[0].prices[0].price_hash, "h1");

        let head = head.await.unwrap().to_lowercase();
        assert!(head.starts_with("post /graphql"));
        assert!(head.contains("x-api-key: secret"));
        assert!(head.contains("x-trace-id: "));
        assert!(head.contains("user-agent: cost-estimator/"));
    }

    #[tokio::test]
    async fn test_invalid_api_key_response() {
        let (url, _) = serve_once(
            "403 Forbidden",
            r#"{"error":"Invalid API key","error_code":"invalid_api_key"}"#,
        )
        .await;
        let transport = HttpCatalogTransport::new(url, None, Duration::from_secs(5)).unwrap();

        let err = transport.post_queries(&queries()).await.unwrap_err();
        assert!(matches!(err, PricingError::InvalidApiKey));
    }

    #[tokio::test]
    async fn test_quota_response() {
        let (url, _) = serve_once(
            "429 Too Many Requests",
            r#"{"error":"You have used up your quota","error_code":"exceeded_quota"}"#,
        )
        .await;
        let transport = HttpCatalogTransport::new(url, None, Duration::from_secs(5)).unwrap();

        let err = transport.post_queries(&queries()).await.unwrap_err();
        assert!(matches!(err, PricingError::QuotaExceeded(_)));
        assert!(err.remediation().is_some());
    }

    #[tokio::test]
    async fn test_malformed_body_is_transport_error() {
        let (url, _) = serve_once("200 OK", "not json").await;
        let transport = HttpCatalogTransport::new(url, None, Duration::from_secs(5)).unwrap();

        let err = transport.post_queries(&queries()).await.unwrap_err();
        assert!(matches!(err, PricingError::Transport(_)));
    }
}
