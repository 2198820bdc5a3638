//! Signed-in session as handed out by the login endpoint: bearer token,
//! account id and the role's permission list.
//!
//! The console never logs in itself; a session is imported from the stored
//! auth payload and kept in the CLI config directory.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::permission::PermissionSet;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Failed to read session: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Session has no access token")]
    MissingToken,

    #[error("Unreadable access token: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub permissions: PermissionSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Profile fields the console does not interpret
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SessionUser>,
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

impl Session {
    pub fn from_json_str(s: &str) -> Result<Self, SessionError> {
        let session: Session = serde_json::from_str(s)?;
        if session.token().is_none() {
            return Err(SessionError::MissingToken);
        }
        Ok(session)
    }

    /// `Ok(None)` when no session has been stored
    pub fn load(path: &Path) -> Result<Option<Self>, SessionError> {
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }

    /// Account id as used in list endpoint paths; numeric ids are rendered
    /// without quotes
    pub fn account_id(&self) -> Option<String> {
        match self.data.as_ref()?.account_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// The role's permissions; empty (deny everything) when absent
    pub fn permissions(&self) -> PermissionSet {
        self.data
            .as_ref()
            .and_then(|d| d.role.as_ref())
            .map(|r| r.permissions.clone())
            .unwrap_or_default()
    }

    pub fn user_name(&self) -> Option<&str> {
        let profile = &self.data.as_ref()?.profile;
        ["userName", "name", "email"]
            .iter()
            .find_map(|k| profile.get(*k).and_then(Value::as_str))
    }

    /// `exp` claim of the access token. The signature is not checked; the
    /// backend does that on every request.
    pub fn token_expiry(&self) -> Result<Option<DateTime<Utc>>, SessionError> {
        let token = self.token().ok_or(SessionError::MissingToken)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
        Ok(data.claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)))
    }

    /// Tokens without an `exp` never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        Ok(self.token_expiry()?.is_some_and(|exp| exp <= now))
    }
}
