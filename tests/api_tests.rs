/// Integration tests for the stats API against a mocked node JSON-RPC endpoint
use arc_swap::ArcSwap;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use httpmock::prelude::*;
use palladium_stats::{config::Config, handlers::AppState, server::create_router};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn router_for(node: &MockServer) -> Router {
    let mut config = Config::default();
    config.rpc.host = node.host();
    config.rpc.port = node.port();
    config.rpc.user = "rpcuser".to_string();
    config.rpc.password = "rpcpass".to_string();
    config.chain.halving_interval = 210_000;
    config.metrics.enabled = false;

    let state = AppState::new(Arc::new(ArcSwap::from_pointee(config.clone())));
    create_router(&config, state, None)
}

async fn mock_rpc(node: &MockServer, method: &str, params: &str, result: Value) {
    let method = format!("\"method\":\"{}\"", method);
    let params = format!("\"params\":{}", params);
    node.mock_async(|when, then| {
        when.method(POST)
            .path("/")
            .body_includes(method)
            .body_includes(params);
        then.status(200)
            .json_body(json!({ "result": result, "error": null, "id": "palladium-api" }));
    })
    .await;
}

async fn mock_rpc_error(node: &MockServer, method: &str) {
    let method = format!("\"method\":\"{}\"", method);
    node.mock_async(|when, then| {
        when.method(POST).path("/").body_includes(method);
        then.status(500).json_body(json!({
            "result": null,
            "error": { "code": -32601, "message": "Method not found" },
            "id": "palladium-api"
        }));
    })
    .await;
}

async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_height() {
    let node = MockServer::start_async().await;
    let mock = node
        .mock_async(|when, then| {
            when.method(POST)
                .path("/")
                .header_exists("authorization")
                .body_includes("\"method\":\"getblockcount\"");
            then.status(200)
                .json_body(json!({ "result": 94995, "error": null, "id": "palladium-api" }));
        })
        .await;

    let (status, body) = get_json(router_for(&node), "/height").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "height": 94995 }));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_difficulty_falls_back_to_blockchain_info() {
    let node = MockServer::start_async().await;
    mock_rpc_error(&node, "getdifficulty").await;
    mock_rpc(
        &node,
        "getblockchaininfo",
        "[]",
        json!({ "chain": "main", "blocks": 94995, "difficulty": 54321.5 }),
    )
    .await;

    let (status, body) = get_json(router_for(&node), "/difficulty").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "difficulty": 54321.5 }));
}

#[tokio::test]
async fn test_hashrate_uses_configured_lookback() {
    let node = MockServer::start_async().await;
    mock_rpc(&node, "getnetworkhashps", "[120,-1]", json!(1.5e12)).await;

    let (status, body) = get_json(router_for(&node), "/hashrate").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "hashrate": 1.5e12 }));
}

#[tokio::test]
async fn test_hashrate_reports_unavailable_when_both_calls_fail() {
    let node = MockServer::start_async().await;
    mock_rpc_error(&node, "getnetworkhashps").await;
    mock_rpc_error(&node, "getmininginfo").await;

    let (status, body) = get_json(router_for(&node), "/hashrate").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"]["message"].as_str().unwrap();
    assert!(message.contains("Unable to get hashrate"));
}

#[tokio::test]
async fn test_avg_block_time_over_window() {
    let node = MockServer::start_async().await;
    mock_rpc(&node, "getblockcount", "[]", json!(1000)).await;
    mock_rpc(&node, "getblockhash", "[1000]", json!("hash-1000")).await;
    mock_rpc(&node, "getblockhash", "[990]", json!("hash-990")).await;
    mock_rpc(&node, "getblock", "[\"hash-1000\"]", json!({ "height": 1000, "time": 1_700_001_250 })).await;
    mock_rpc(&node, "getblock", "[\"hash-990\"]", json!({ "height": 990, "time": 1_700_000_000 })).await;

    let (status, body) = get_json(router_for(&node), "/avg-block-time?window=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "avg_block_time": 125.0, "window": 10 }));
}

#[tokio::test]
async fn test_avg_block_time_chain_too_short() {
    let node = MockServer::start_async().await;
    mock_rpc(&node, "getblockcount", "[]", json!(50)).await;

    let (status, _) = get_json(router_for(&node), "/avg-block-time").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_halving() {
    let node = MockServer::start_async().await;
    mock_rpc(&node, "getblockcount", "[]", json!(94995)).await;

    let (status, body) = get_json(router_for(&node), "/halving").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["next_halving_height"], json!(210000));
    assert_eq!(body["blocks_remaining"], json!(115005));
    assert_eq!(body["eta_seconds"], json!(13800600.0));
    assert_eq!(body["eta_formatted"], json!("159 days, 17 hours, 30 minutes, 0 seconds"));
}

#[tokio::test]
async fn test_height_node_error_is_bad_gateway() {
    let node = MockServer::start_async().await;
    mock_rpc_error(&node, "getblockcount").await;

    let (status, body) = get_json(router_for(&node), "/height").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"]["type"].is_string());
}
