//! API middleware
//!
//! Contains:
//! - Shared application state
//! - `ApiError`, the single JSON error response type
//! - Session cookie extraction
//! - Method guard for read-only routes

use axum::{
    extract::Request,
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::services::history::{HistoryError, HistoryService};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub pool: crate::db::DynDatabasePool,
    pub history_service: Arc<HistoryService>,
    /// Name of the cookie carrying the session token
    pub session_cookie: Arc<str>,
}

/// Error response for API errors.
///
/// Renders as `{"error": "<message>"}` with `status`.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            error: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<HistoryError> for ApiError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::SessionUnavailable(_) => Self::internal_error("Gagal mendapatkan sesi"),
            HistoryError::Unauthenticated(_) => Self::unauthorized("Tidak terautentikasi"),
            HistoryError::MethodNotAllowed(_) => Self::method_not_allowed("Metode tidak diizinkan"),
            HistoryError::UserResolutionFailed { .. } => {
                Self::internal_error("Gagal mengambil user ID")
            }
            HistoryError::QueryFailed(_) | HistoryError::IterationFailed(_) => {
                Self::internal_error("Gagal mengambil data riwayat")
            }
            HistoryError::ScanFailed(_) => Self::internal_error("Gagal membaca data riwayat"),
            HistoryError::EncodingFailed(_) => Self::internal_error("Gagal menyusun respons"),
        }
    }
}

/// Extract the session token from the cookie named `cookie_name`.
///
/// Empty values count as absent.
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };
        for cookie in cookie_str.split(';') {
            let Some((name, value)) = cookie.trim().split_once('=') else {
                continue;
            };
            if name.trim() == cookie_name {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

/// Reject every verb except GET.
///
/// Runs before the handler so the verb is checked ahead of the session.
pub async fn require_read_method(request: Request, next: Next) -> Result<Response, ApiError> {
    let method = request.method();
    if method != Method::GET {
        tracing::warn!("Rejected {} {}", method, request.uri().path());
        return Err(HistoryError::MethodNotAllowed(method.to_string()).into());
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionAttributeError;
    use axum::http::HeaderValue;

    const COOKIE: &str = "elektronik_rumah_session";

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_extract_session_token_from_cookie() {
        let headers = headers_with_cookie("elektronik_rumah_session=abc123");
        assert_eq!(extract_session_token(&headers, COOKIE), Some("abc123".to_string()));
    }

    #[test]
    fn test_extract_session_token_among_other_cookies() {
        let headers = headers_with_cookie("theme=dark; elektronik_rumah_session=tok; lang=id");
        assert_eq!(extract_session_token(&headers, COOKIE), Some("tok".to_string()));
    }

    #[test]
    fn test_extract_session_token_ignores_other_names() {
        let headers = headers_with_cookie("session=abc; elektronik_rumah_session_old=def");
        assert_eq!(extract_session_token(&headers, COOKIE), None);
    }

    #[test]
    fn test_extract_session_token_empty_value() {
        let headers = headers_with_cookie("elektronik_rumah_session=");
        assert_eq!(extract_session_token(&headers, COOKIE), None);
    }

    #[test]
    fn test_extract_session_token_no_cookie_header() {
        assert_eq!(extract_session_token(&HeaderMap::new(), COOKIE), None);
    }

    #[test]
    fn test_history_error_status_mapping() {
        let cases = vec![
            (
                HistoryError::SessionUnavailable(anyhow::anyhow!("down")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal mendapatkan sesi",
            ),
            (
                HistoryError::Unauthenticated(SessionAttributeError::Missing("username")),
                StatusCode::UNAUTHORIZED,
                "Tidak terautentikasi",
            ),
            (
                HistoryError::MethodNotAllowed("POST".to_string()),
                StatusCode::METHOD_NOT_ALLOWED,
                "Metode tidak diizinkan",
            ),
            (
                HistoryError::UserResolutionFailed {
                    username: "budi".to_string(),
                    source: anyhow::anyhow!("no user"),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal mengambil user ID",
            ),
            (
                HistoryError::QueryFailed(anyhow::anyhow!("syntax")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal mengambil data riwayat",
            ),
            (
                HistoryError::ScanFailed(anyhow::anyhow!("type")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal membaca data riwayat",
            ),
            (
                HistoryError::IterationFailed(anyhow::anyhow!("reset")),
                StatusCode::INTERNAL_SERVER_ERROR,
                "Gagal mengambil data riwayat",
            ),
        ];

        for (err, status, message) in cases {
            let api: ApiError = err.into();
            assert_eq!(api.status, status);
            assert_eq!(api.error, message);
        }
    }

    #[test]
    fn test_api_error_body_has_only_error_field() {
        let api = ApiError::internal_error("Gagal mengambil user ID");
        let body = serde_json::to_value(&api).unwrap();
        assert_eq!(body, serde_json::json!({"error": "Gagal mengambil user ID"}));
    }
}
