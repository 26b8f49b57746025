//! History service
//!
//! Resolves the caller behind a session token and loads their device usage
//! history:
//! session store → `username` attribute → user id → joined history query.
//!
//! Every failure is logged here, where it is detected, and returned as a
//! [`HistoryError`]; the API layer only translates it into a response.

use crate::db::repositories::{HistoryQueryError, HistoryRepository, SessionStore, UserRepository};
use crate::models::{SessionAttributeError, SessionData, UsageWithCategory};
use std::sync::Arc;

/// Everything that can end a history request early.
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    /// Session store unreachable or session record undecodable
    #[error("session unavailable: {0:#}")]
    SessionUnavailable(#[source] anyhow::Error),

    /// No usable `username` in the session
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] SessionAttributeError),

    /// Request used a verb other than GET
    #[error("method {0} not allowed")]
    MethodNotAllowed(String),

    /// No user row for the session's username, or the user store failed.
    /// Both causes share this variant.
    #[error("failed to resolve user '{username}': {source:#}")]
    UserResolutionFailed {
        username: String,
        source: anyhow::Error,
    },

    #[error("history query failed: {0:#}")]
    QueryFailed(#[source] anyhow::Error),

    #[error("failed to decode history row: {0:#}")]
    ScanFailed(#[source] anyhow::Error),

    #[error("history cursor failed: {0:#}")]
    IterationFailed(#[source] anyhow::Error),

    #[error("failed to encode history response: {0}")]
    EncodingFailed(#[from] serde_json::Error),
}

impl From<HistoryQueryError> for HistoryError {
    fn from(err: HistoryQueryError) -> Self {
        match err {
            HistoryQueryError::Query(e) => HistoryError::QueryFailed(e),
            HistoryQueryError::Scan(e) => HistoryError::ScanFailed(e),
            HistoryQueryError::Iteration(e) => HistoryError::IterationFailed(e),
        }
    }
}

/// History retrieval service.
///
/// Holds no mutable state; one instance is shared by all requests.
pub struct HistoryService {
    sessions: Arc<dyn SessionStore>,
    users: Arc<dyn UserRepository>,
    history: Arc<dyn HistoryRepository>,
}

impl HistoryService {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        users: Arc<dyn UserRepository>,
        history: Arc<dyn HistoryRepository>,
    ) -> Self {
        Self {
            sessions,
            users,
            history,
        }
    }

    /// Load the history of the user owning the session behind `token`.
    ///
    /// A missing token is an anonymous request and fails with
    /// `Unauthenticated` without touching the user or history stores.
    pub async fn history_for_token(
        &self,
        token: Option<&str>,
    ) -> Result<Vec<UsageWithCategory>, HistoryError> {
        let session = self.load_session(token).await?;

        let username = session.username().map_err(|e| {
            tracing::warn!("Unauthorized history request: {}", e);
            HistoryError::Unauthenticated(e)
        })?;

        let user_id = self.resolve_user_id(username).await?;

        let history = self.history.list_for_user(user_id).await.map_err(|e| {
            tracing::error!("Failed to load history for user {}: {}", user_id, e);
            HistoryError::from(e)
        })?;

        tracing::debug!("Loaded {} history record(s) for user {}", history.len(), user_id);
        Ok(history)
    }

    /// Session attributes for `token`; empty when there is no live session.
    async fn load_session(&self, token: Option<&str>) -> Result<SessionData, HistoryError> {
        let Some(token) = token else {
            return Ok(SessionData::new());
        };

        let session = self.sessions.get(token).await.map_err(|e| {
            tracing::error!("Failed to get session: {:#}", e);
            HistoryError::SessionUnavailable(e)
        })?;

        Ok(match session {
            Some(session) if !session.is_expired() => session.data,
            Some(_) => {
                tracing::debug!("Session expired, treating request as anonymous");
                SessionData::new()
            }
            None => SessionData::new(),
        })
    }

    async fn resolve_user_id(&self, username: &str) -> Result<i64, HistoryError> {
        match self.users.get_by_username(username).await {
            Ok(Some(user)) => Ok(user.user_id),
            Ok(None) => {
                tracing::error!("Failed to get user ID for username {}: no such user", username);
                Err(HistoryError::UserResolutionFailed {
                    username: username.to_string(),
                    source: anyhow::anyhow!("no user with this username"),
                })
            }
            Err(e) => {
                tracing::error!("Failed to get user ID for username {}: {:#}", username, e);
                Err(HistoryError::UserResolutionFailed {
                    username: username.to_string(),
                    source: e,
                })
            }
        }
    }
}
