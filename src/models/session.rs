//! Session model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session attribute holding the login name of the authenticated caller
pub const USERNAME_KEY: &str = "username";

/// Server-side session record, located by the token in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Session ID (token)
    pub id: String,
    /// Attributes written at login
    pub data: SessionData,
    /// Expiration timestamp
    pub expires_at: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

/// Why a session attribute could not be read as the expected type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionAttributeError {
    #[error("session attribute '{0}' is missing")]
    Missing(&'static str),

    #[error("session attribute '{key}' is a {found}, expected a string")]
    WrongType { key: &'static str, found: &'static str },
}

/// Attribute bag of a session.
///
/// An empty bag stands for "no session": missing cookie, unknown token or
/// expired record all look the same to callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionData(Map<String, Value>);

impl SessionData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any previous value
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// The `username` attribute, present and a string.
    pub fn username(&self) -> Result<&str, SessionAttributeError> {
        self.string(USERNAME_KEY)
    }

    fn string(&self, key: &'static str) -> Result<&str, SessionAttributeError> {
        match self.0.get(key) {
            None => Err(SessionAttributeError::Missing(key)),
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(SessionAttributeError::WrongType {
                key,
                found: json_type_name(other),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
