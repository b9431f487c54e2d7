//! Authentication API Endpoints
//! Mission: Provide the login endpoint and shared auth state

use crate::auth::{
    jwt::JwtHandler,
    models::{LoginForm, TokenResponse},
    user_store::CredentialStore,
};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<dyn CredentialStore>,
    pub jwt: Arc<JwtHandler>,
}

impl AuthState {
    pub fn new(users: Arc<dyn CredentialStore>, jwt: Arc<JwtHandler>) -> Self {
        Self { users, jwt }
    }
}

/// Login endpoint - POST /token
///
/// Accepts the OAuth2 password form and returns a bearer token.
pub async fn login(
    State(state): State<AuthState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, LoginError> {
    info!("🔐 Login attempt: {}", form.username);

    let user = state
        .users
        .authenticate(&form.username, &form.password)
        .map_err(|e| {
            warn!("Credential check failed: {}", e);
            LoginError::Internal
        })?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", form.username);
            LoginError::InvalidCredentials
        })?;

    let (access_token, _expires_in) = state.jwt.issue(&user).map_err(|e| {
        warn!("Token issuance failed: {}", e);
        LoginError::Internal
    })?;

    info!("✅ Login successful: {} ({})", user.username, user.role.as_str());

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

/// Login errors
///
/// Unknown username and wrong password surface identically.
#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    Internal,
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": "Incorrect username or password" })),
            )
                .into_response(),
            LoginError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Internal server error" })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_credentials_response() {
        let response = LoginError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response
                .headers()
                .get(header::WWW_AUTHENTICATE)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer")
        );
    }

    #[test]
    fn test_internal_error_response() {
        let response = LoginError::Internal.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
