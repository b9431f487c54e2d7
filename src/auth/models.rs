//! Authentication Models
//! Mission: Define secure user and authentication data structures

use serde::{Deserialize, Serialize};

/// User account as stored in the credential database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub disabled: bool,
    pub role: Role,
}

/// User roles for RBAC
///
/// Roles are disjoint tags; admin is not a superset of basic.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "admin")]
    Admin, // May perform mutating operations
    #[serde(rename = "basic")]
    Basic, // Read-only access
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Basic => "basic",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "admin" => Some(Role::Admin),
            "basic" => Some(Role::Basic),
            _ => None,
        }
    }
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String, // subject (username)
    pub role: Role,
    pub exp: usize, // expiration timestamp (epoch seconds)
}

/// Login form body (OAuth2 password flow)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Identity resolved for the current request.
///
/// full_name and disabled reflect the credential store at request time;
/// role is whatever the validated token asserts.
#[derive(Debug, Clone, Serialize)]
pub struct AuthenticatedUser {
    pub username: String,
    pub full_name: Option<String>,
    pub disabled: bool,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_user(user: &User, role: Role) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            disabled: user.disabled,
            role,
        }
    }
}
