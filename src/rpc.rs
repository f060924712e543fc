//! Minimal JSON-RPC 1.0 client for the Palladium node

use axum::http::StatusCode;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::{Duration, Instant};

use crate::config::RpcConfig;
use crate::error::AppError;

const RPC_ID: &str = "palladium-api";

#[derive(Clone)]
pub struct NodeRpc {
    client: Client,
    url: String,
    user: String,
    password: String,
    timeout: Duration,
}

impl NodeRpc {
    pub fn new(client: Client, config: &RpcConfig) -> Self {
        Self {
            client,
            url: config.url(),
            user: config.user.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.timeout_seconds),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and return its `result` member
    ///
    /// Connection failures, non-200 answers and a non-null `error` member all
    /// surface as [`AppError`] variants that map to 502.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value, AppError> {
        let payload = json!({
            "jsonrpc": "1.0",
            "id": RPC_ID,
            "method": method,
            "params": params,
        });

        let start = Instant::now();
        let result = self.send(method, &payload).await;
        crate::metrics::record_rpc_call(
            method,
            if result.is_ok() { "success" } else { "failure" },
            start.elapsed(),
        );

        if let Err(e) = &result {
            tracing::warn!(method = method, error = %e, "RPC call failed");
        }
        result
    }

    async fn send(&self, method: &str, payload: &Value) -> Result<Value, AppError> {
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.user, Some(&self.password))
            .timeout(self.timeout)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let text = response.text().await.unwrap_or_default();
            return Err(AppError::UpstreamError {
                status: StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
                message: text,
            });
        }

        let mut body: Value = response.json().await?;
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            return Err(AppError::RpcError {
                method: method.to_string(),
                message: error.to_string(),
            });
        }

        Ok(body.get_mut("result").map(Value::take).unwrap_or(Value::Null))
    }

    pub async fn get_block_count(&self) -> Result<u64, AppError> {
        let result = self.call("getblockcount", json!([])).await?;
        result.as_u64().ok_or_else(|| unexpected("getblockcount", &result))
    }

    /// Timestamp (not mediantime) of the block at `height`
    pub async fn get_block_time(&self, height: u64) -> Result<i64, AppError> {
        let hash = self.call("getblockhash", json!([height])).await?;
        let block = self.call("getblock", json!([hash])).await?;
        block
            .get("time")
            .and_then(Value::as_i64)
            .ok_or_else(|| unexpected("getblock", &block))
    }
}

fn unexpected(method: &str, value: &Value) -> AppError {
    AppError::RpcError {
        method: method.to_string(),
        message: format!("unexpected result: {}", value),
    }
}
