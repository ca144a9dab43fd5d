//! HTTP surface: a thin translation layer over the store and the log.
//!
//! Handlers apply the mutation to the store first, then enqueue the matching
//! log event; the response does not wait for durability. A durability
//! failure therefore never fails the request that triggered it — it is
//! delivered out-of-band on the log's error channel, which the process
//! watches in `main`.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::errors::StoreError;
use crate::store::KeyValueStore;
use crate::telemetry;
use crate::wal_writer::FileTransactionLog;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<KeyValueStore>,
    pub log: Arc<FileTransactionLog>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/v1/status", get(status))
        .route("/v1/:key", axum::routing::put(put_key).get(get_key).delete(delete_key))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Keys become one field of a tab-separated, newline-terminated log record,
/// so they may not contain either framing character.
fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.is_empty() {
        return Err(StoreError::InvalidInput("key must not be empty".into()));
    }
    if key.contains('\t') || key.contains('\n') {
        return Err(StoreError::InvalidInput(
            "key must not contain tabs or newlines".into(),
        ));
    }
    Ok(())
}

/// Values may contain tabs (the log codec treats the value as the rest of
/// the line) but a newline would split the record.
fn validate_value(value: &str) -> Result<(), StoreError> {
    if value.contains('\n') {
        return Err(StoreError::InvalidInput(
            "value must not contain newlines".into(),
        ));
    }
    Ok(())
}

async fn put_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: String,
) -> Result<StatusCode, StoreError> {
    validate_key(&key)?;
    validate_value(&body)?;

    // Store first, log second: the log must never record a mutation that
    // did not happen.
    state.store.put(&key, &body)?;
    state.log.write_put(&key, &body).await;

    metrics::gauge!("tidekv_store_keys", state.store.key_count() as f64);
    Ok(StatusCode::CREATED)
}

async fn get_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<String, StoreError> {
    state.store.get(&key)
}

async fn delete_key(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, StoreError> {
    validate_key(&key)?;

    state.store.delete(&key)?;
    state.log.write_delete(&key).await;

    metrics::gauge!("tidekv_store_keys", state.store.key_count() as f64);
    Ok(StatusCode::OK)
}

#[derive(Serialize)]
struct StatusResponse {
    keys: usize,
    last_sequence: u64,
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        keys: state.store.key_count(),
        last_sequence: state.log.last_sequence(),
    })
}

async fn metrics_handler() -> String {
    telemetry::render_metrics()
}
