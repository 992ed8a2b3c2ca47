use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::db::Store;
use crate::router::HubState;

pub async fn health(State(state): State<HubState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "store": state.store.backend(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
