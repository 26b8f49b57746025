//! Device usage history API
//!
//! `GET /history` returns the caller's usage records, each joined with its
//! category, as a JSON array. The caller is identified by the session cookie.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
};

use crate::api::middleware::{extract_session_token, ApiError, AppState};
use crate::api::responses::HistoryResponseItem;
use crate::services::history::HistoryError;

/// GET /history - List the authenticated user's device history
///
/// The method guard in front of this route rejects non-GET requests before
/// the session is looked at. An empty history is `[]`.
pub async fn get_device_history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let token = extract_session_token(&headers, &state.session_cookie);

    let history = state
        .history_service
        .history_for_token(token.as_deref())
        .await?;

    let items: Vec<HistoryResponseItem> =
        history.into_iter().map(HistoryResponseItem::from).collect();

    // Encode up front so a failure becomes an error body, not a truncated array.
    let body = serde_json::to_vec(&items).map_err(|e| {
        tracing::error!("Failed to encode history response: {}", e);
        HistoryError::EncodingFailed(e)
    })?;

    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}
