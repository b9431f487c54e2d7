//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role checks

use crate::auth::{
    api::AuthState,
    jwt::TokenError,
    models::{AuthenticatedUser, Role},
    user_store::CredentialStore,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde_json::json;
use tracing::warn;

/// Terminal auth outcomes for a protected request.
///
/// Everything except Forbidden collapses to a single 401 so callers learn
/// nothing about why their credentials failed.
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken(TokenError),
    UnknownSubject,
    Forbidden,
    StoreFailure,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::Forbidden => (
                StatusCode::FORBIDDEN,
                Json(json!({ "detail": "Admin privileges required" })),
            )
                .into_response(),
            AuthError::StoreFailure => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": "Internal server error" })),
            )
                .into_response(),
            AuthError::MissingToken | AuthError::InvalidToken(_) | AuthError::UnknownSubject => (
                StatusCode::UNAUTHORIZED,
                [(header::WWW_AUTHENTICATE, "Bearer")],
                Json(json!({ "detail": "Could not validate credentials" })),
            )
                .into_response(),
        }
    }
}

impl AuthenticatedUser {
    /// Exact role match; no hierarchy between roles.
    pub fn require_role(&self, required: Role) -> Result<(), AuthError> {
        if self.role == required {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Auth middleware that validates bearer tokens and resolves the identity.
///
/// On success the request carries an [`AuthenticatedUser`] extension. The
/// role is taken from the token claims; the store is only consulted for
/// subject existence and current profile flags.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::MissingToken)?;

    let claims = state
        .jwt
        .validate(bearer.token())
        .map_err(AuthError::InvalidToken)?;

    let user = state
        .users
        .lookup(&claims.sub)
        .map_err(|e| {
            warn!("Credential lookup failed: {}", e);
            AuthError::StoreFailure
        })?
        .ok_or(AuthError::UnknownSubject)?;

    req.extensions_mut()
        .insert(AuthenticatedUser::from_user(&user, claims.role));

    Ok(next.run(req).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AuthError::MissingToken)
    }
}

/// Admin gate, composable into any handler signature.
///
/// Succeeds only for an identity already resolved by [`auth_middleware`]
/// whose token asserts the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = AuthenticatedUser::from_request_parts(parts, state).await?;
        identity.require_role(Role::Admin)?;
        Ok(AdminUser(identity))
    }
}
