//! `POST /query`: validate the request body and run the query pipeline.

use axum::{
    extract::{rejection::JsonRejection, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::{api_state::ApiState, error::ApiError};

/// Longest accepted question, in characters.
pub const MAX_QUESTION_CHARS: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default)]
    pub company_terms: Option<Vec<String>>,
}

impl QueryRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.question.trim().is_empty() {
            return Err(ApiError::ValidationError(
                "question must not be empty".to_string(),
            ));
        }

        if self.question.chars().count() > MAX_QUESTION_CHARS {
            return Err(ApiError::ValidationError(format!(
                "question must be at most {} characters",
                MAX_QUESTION_CHARS
            )));
        }

        Ok(())
    }
}

pub async fn query(
    State(state): State<ApiState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::ValidationError(e.body_text()))?;
    request.validate()?;

    let result = state
        .orchestrator
        .query(&request.question, request.company_terms.as_deref())
        .await?;

    Ok(Json(result))
}
