//! Chain statistics endpoints polled by the site
//!
//! Every handler answers from a fresh node query; nothing is cached.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::chain::{average_block_time, HalvingInfo, DEFAULT_AVG_WINDOW, MAX_AVG_WINDOW, MIN_AVG_WINDOW};
use crate::error::AppError;
use crate::handlers::AppState;

/// Handle /height
pub async fn height(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let height = state.rpc().get_block_count().await?;
    Ok(Json(json!({ "height": height })))
}

/// Handle /difficulty
///
/// Falls back to `getblockchaininfo` when `getdifficulty` is unavailable.
pub async fn difficulty(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let rpc = state.rpc();
    let difficulty = match rpc.call("getdifficulty", json!([])).await {
        Ok(value) => value,
        Err(_) => {
            let info = rpc
                .call("getblockchaininfo", json!([]))
                .await
                .map_err(|e| unable("difficulty", e))?;
            info.get("difficulty").cloned().unwrap_or_else(|| json!(0))
        }
    };
    Ok(Json(json!({ "difficulty": difficulty })))
}

/// Handle /hashrate
///
/// Falls back to `getmininginfo` when `getnetworkhashps` is unavailable.
pub async fn hashrate(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let rpc = state.rpc();
    let blocks = state.config.load().chain.hashrate_blocks;
    let hashrate = match rpc.call("getnetworkhashps", json!([blocks, -1])).await {
        Ok(value) => value,
        Err(_) => {
            let info = rpc
                .call("getmininginfo", json!([]))
                .await
                .map_err(|e| unable("hashrate", e))?;
            info.get("networkhashps").cloned().unwrap_or_else(|| json!(0))
        }
    };
    Ok(Json(json!({ "hashrate": hashrate })))
}

#[derive(Debug, Deserialize)]
pub struct AvgBlockTimeQuery {
    pub window: Option<u64>,
}

/// Handle /avg-block-time
///
/// `(time[h] - time[h - window]) / window` using block timestamps.
pub async fn avg_block_time(
    State(state): State<AppState>,
    Query(query): Query<AvgBlockTimeQuery>,
) -> Result<Json<Value>, AppError> {
    let window = query.window.unwrap_or(DEFAULT_AVG_WINDOW);
    if !(MIN_AVG_WINDOW..=MAX_AVG_WINDOW).contains(&window) {
        return Err(AppError::BadRequest(format!(
            "window must be between {} and {}",
            MIN_AVG_WINDOW, MAX_AVG_WINDOW
        )));
    }

    let rpc = state.rpc();
    let height = rpc.get_block_count().await?;
    if height < window {
        return Err(AppError::BadRequest("Chain too short for requested window".to_string()));
    }

    let time_last = rpc.get_block_time(height).await?;
    let time_prev = rpc.get_block_time(height - window).await?;

    Ok(Json(json!({
        "avg_block_time": average_block_time(time_last, time_prev, window),
        "window": window,
    })))
}

/// Handle /halving
pub async fn halving(State(state): State<AppState>) -> Result<Json<HalvingInfo>, AppError> {
    let chain = state.config.load().chain.clone();
    if chain.halving_interval == 0 {
        return Err(AppError::ConfigError("chain.halving_interval is not set".to_string()));
    }

    let height = state.rpc().get_block_count().await?;
    Ok(Json(HalvingInfo::at_height(
        height,
        chain.halving_interval,
        chain.target_block_time_seconds,
    )))
}

fn unable(what: &str, err: AppError) -> AppError {
    AppError::RpcError {
        method: what.to_string(),
        message: format!("Unable to get {}: {}", what, err),
    }
}
