//! Stats API client used by the poller and the halving countdown
//!
//! Each call maps onto exactly one GET request. Transport failures, non-2xx
//! statuses and unexpected bodies are reported as [`FetchError`] and never
//! retried here; the callers decide what a failure means for the display.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use std::time::Duration;

use crate::config::{EndpointsConfig, SiteConfig};
use crate::error::FetchError;
use crate::stats::countdown::CountdownState;
use crate::stats::metric::{join_url, Metric, MetricEndpoint};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote source of chain statistics
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
    /// Fetch one metric. `Ok(None)` means the API reported `null`.
    async fn fetch_metric(&self, metric: Metric) -> Result<Option<f64>, FetchError>;

    /// Fetch seconds and blocks until the next halving
    async fn fetch_halving(&self) -> Result<CountdownState, FetchError>;
}

/// HTTP client wrapper for the stats API
pub struct ApiClient {
    client: Client,
    base_url: String,
    endpoints: EndpointsConfig,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Arguments
    /// * `base_url` - API root, e.g. "http://localhost:8032"
    /// * `endpoints` - Path suffixes for each endpoint
    pub fn new(base_url: String, endpoints: EndpointsConfig) -> Self {
        Self {
            client: Client::new(),
            base_url,
            endpoints,
        }
    }

    pub fn from_config(site: &SiteConfig) -> Self {
        Self::new(site.api_base_url.clone(), site.endpoints.clone())
    }

    pub fn endpoint(&self, metric: Metric) -> MetricEndpoint {
        MetricEndpoint::new(metric, &self.base_url, self.endpoints.suffix(metric))
    }

    pub fn halving_url(&self) -> String {
        join_url(&self.base_url, &self.endpoints.halving)
    }

    /// GET a URL and decode its JSON body
    ///
    /// # Errors
    /// - [`FetchError::Network`] if the request or body read fails
    /// - [`FetchError::Http`] for non-2xx statuses
    /// - [`FetchError::Parse`] if the body is not JSON
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .header(header::CACHE_CONTROL, "no-cache")
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(FetchError::Network)?;

        if !response.status().is_success() {
            return Err(FetchError::Http {
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::Network)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(format!("invalid JSON: {}", e)))
    }
}

#[async_trait]
impl StatsSource for ApiClient {
    async fn fetch_metric(&self, metric: Metric) -> Result<Option<f64>, FetchError> {
        let endpoint = self.endpoint(metric);
        let body = self.get_json(&endpoint.url).await?;
        parse_metric(&body, metric)
    }

    async fn fetch_halving(&self) -> Result<CountdownState, FetchError> {
        let body = self.get_json(&self.halving_url()).await?;
        parse_halving(&body)
    }
}

/// Extract a metric's value from its endpoint body
///
/// A missing or non-numeric field is an error; an explicit `null` is not.
pub fn parse_metric(body: &Value, metric: Metric) -> Result<Option<f64>, FetchError> {
    let field = metric.json_field();
    match body.get(field) {
        Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or_else(|| FetchError::Parse(format!("`{}` is not a number: {}", field, value))),
        None => Err(FetchError::Parse(format!("missing `{}`", field))),
    }
}

/// Extract the countdown state from a `/halving` body
///
/// `eta_seconds` is read as a float and truncated to whole seconds,
/// `blocks_remaining` as an integer.
pub fn parse_halving(body: &Value) -> Result<CountdownState, FetchError> {
    let eta = body
        .get("eta_seconds")
        .and_then(Value::as_f64)
        .ok_or_else(|| FetchError::Parse("missing or non-numeric `eta_seconds`".to_string()))?;
    if !eta.is_finite() || eta < 0.0 {
        return Err(FetchError::Parse(format!("`eta_seconds` out of range: {}", eta)));
    }

    let blocks = body
        .get("blocks_remaining")
        .and_then(|v| {
            v.as_u64().or_else(|| {
                v.as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as u64)
            })
        })
        .ok_or_else(|| FetchError::Parse("missing or invalid `blocks_remaining`".to_string()))?;

    Ok(CountdownState {
        eta_seconds: eta.trunc() as u64,
        blocks_remaining: blocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_urls() {
        let client = ApiClient::new("http://localhost:8032".to_string(), EndpointsConfig::default());
        assert_eq!(client.endpoint(Metric::Hashrate).url, "http://localhost:8032/hashrate");
        assert_eq!(client.halving_url(), "http://localhost:8032/halving");
    }

    #[test]
    fn test_parse_metric() {
        assert_eq!(parse_metric(&json!({"height": 123456}), Metric::Height).unwrap(), Some(123456.0));
        assert_eq!(parse_metric(&json!({"hashrate": null}), Metric::Hashrate).unwrap(), None);
        assert!(matches!(
            parse_metric(&json!({"difficulty": "high"}), Metric::Difficulty),
            Err(FetchError::Parse(_))
        ));
        assert!(matches!(
            parse_metric(&json!({"avg_block_time": 118.5, "window": 120}), Metric::Height),
            Err(FetchError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_halving() {
        let state = parse_halving(&json!({"eta_seconds": 90061.0, "blocks_remaining": 42})).unwrap();
        assert_eq!(state.eta_seconds, 90_061);
        assert_eq!(state.blocks_remaining, 42);

        let state = parse_halving(&json!({"eta_seconds": 10.9, "blocks_remaining": 7.0})).unwrap();
        assert_eq!(state.eta_seconds, 10);
        assert_eq!(state.blocks_remaining, 7);
    }

    #[test]
    fn test_parse_halving_rejects_bad_values() {
        assert!(parse_halving(&json!({"blocks_remaining": 42})).is_err());
        assert!(parse_halving(&json!({"eta_seconds": "soon", "blocks_remaining": 42})).is_err());
        assert!(parse_halving(&json!({"eta_seconds": -5.0, "blocks_remaining": 42})).is_err());
        assert!(parse_halving(&json!({"eta_seconds": 100.0})).is_err());
        assert!(parse_halving(&json!({"eta_seconds": 100.0, "blocks_remaining": -1})).is_err());
    }
}
