//! `GET /stats`: collection name and chunk count.

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;

use crate::{api_state::ApiState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub document_count: u64,
    pub collection_name: String,
}

pub async fn stats(State(state): State<ApiState>) -> Result<impl IntoResponse, ApiError> {
    let document_count = state.store.count().await?;

    Ok(Json(StatsResponse {
        document_count,
        collection_name: state.store.collection_name().to_string(),
    }))
}
