//! Explicit session context.
//!
//! The session is created at login, held by the [`crate::Model`] for the
//! lifetime of the browser/app session, mirrored into shell key-value
//! storage so a reload can restore it, and destroyed at logout. Nothing
//! else in the core reads ambient storage; everything that needs the agent's
//! identity or token is handed this object.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AppError, ErrorKind};

/// Login response fields that may carry the bearer token. The upstream
/// service has shipped all of these at one point or another.
const TOKEN_FIELDS: &[&str] = &["token", "accessToken", "access_token", "jwt"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Agent,
    #[default]
    Customer,
}

impl Role {
    #[must_use]
    pub fn from_raw(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "agent" | "admin" => Self::Agent,
            _ => Self::Customer,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Customer => "customer",
        }
    }
}

/// An authenticated user. The token is runtime-only secret material and is
/// kept out of `Debug` output and serialization.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    token: SecretString,
}

impl Session {
    #[must_use]
    pub fn new(user_id: i64, email: String, name: String, role: Role, token: String) -> Self {
        Self {
            user_id,
            email,
            name,
            role,
            token: SecretString::new(token),
        }
    }

    /// Builds a session from whatever shape `POST /auth/login` answered
    /// with. Fails only when no token can be found under any known field
    /// name; identity fields degrade to defaults like the normalizer's.
    pub fn from_login_response(body: &Value) -> Result<Self, AppError> {
        let token = TOKEN_FIELDS
            .iter()
            .find_map(|field| body.get(field).and_then(Value::as_str))
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                AppError::new(ErrorKind::Deserialization, "login response carried no token")
            })?;

        let user_id = body
            .get("userId")
            .or_else(|| body.get("id"))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        let email = text(body, &["email", "username"]);
        let name = text(body, &["fullName", "name"]);
        let role = Role::from_raw(&text(body, &["role"]));

        Ok(Self::new(user_id, email, name, role, token.to_string()))
    }

    #[must_use]
    pub const fn is_agent(&self) -> bool {
        matches!(self.role, Role::Agent)
    }

    /// Value for the `Authorization` header of authenticated endpoints.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.token.expose_secret())
    }
}

fn text(body: &Value, fields: &[&str]) -> String {
    fields
        .iter()
        .find_map(|f| body.get(f).and_then(Value::as_str))
        .unwrap_or_default()
        .to_string()
}

/// The serializable copy of a session written to shell storage. Kept
/// separate from [`Session`] so the secret-typed token never picks up serde
/// impls by accident.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSession {
    pub user_id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

impl StoredSession {
    #[must_use]
    pub fn of(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            email: session.email.clone(),
            name: session.name.clone(),
            role: session.role,
            token: session.token.expose_secret().clone(),
        }
    }

    #[must_use]
    pub fn into_session(self) -> Session {
        Session::new(self.user_id, self.email, self.name, self.role, self.token)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, AppError> {
        serde_json::to_vec(self)
            .map_err(|e| AppError::new(ErrorKind::Internal, format!("session encode: {e}")))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AppError> {
        serde_json::from_slice(bytes)
            .map_err(|e| AppError::new(ErrorKind::Deserialization, format!("session decode: {e}")))
    }
}
