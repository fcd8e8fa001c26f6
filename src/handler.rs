use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::Json;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::Value;

use crate::error::AppError;
use crate::schema::{CreatedResponse, DataResponse, ListMatchesParams, NewMatch};
use crate::validation::{parse_create_payload, parse_list_query, undecodable, IssueCode};
use crate::AppState;

pub async fn health_handler() -> &'static str {
    "ok"
}

/// `GET /matches?limit=N`: newest matches first, capped at 100.
pub async fn get_matches_handler(
    State(data): State<Arc<AppState>>,
    params: Result<Query<ListMatchesParams>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(params) = params.map_err(|e| {
        AppError::InvalidQuery(undecodable(IssueCode::InvalidQuery, e.body_text()))
    })?;
    let query = parse_list_query(&params).map_err(AppError::InvalidQuery)?;

    let matches = data
        .store
        .get_matches(query.effective_limit())
        .await
        .map_err(AppError::ListFailed)?;

    Ok(Json(DataResponse { data: matches }))
}

/// `POST /matches`: validate, derive the status as of now, persist.
pub async fn create_match_handler(
    State(data): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload.map_err(|e| {
        AppError::InvalidPayload(undecodable(IssueCode::InvalidJson, e.body_text()))
    })?;
    let schema = parse_create_payload(&payload).map_err(AppError::InvalidPayload)?;

    let new = NewMatch::from_schema(schema, Utc::now());
    let m = data
        .store
        .create_match(new)
        .await
        .map_err(AppError::CreateFailed)?;

    tracing::info!(match_id = %m.id, status = ?m.status, "Match created");

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            message: "Match created successfully",
            data: m,
        }),
    ))
}
