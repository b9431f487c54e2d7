//! Domain API Routes
//! Mission: Admin-gated CRUD over the football schema

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::{api as auth_api, auth_middleware, AdminUser, AuthState};
use crate::db::Database;
use crate::middleware::logging::request_logging;
use crate::models::{
    NewPlayer, NewPlayerHistory, NewPlayerRole, NewTeam, Player, PlayerHistory, PlayerRole, Team,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
}

/// Create the full API router
pub fn create_router(db: Arc<Database>, auth_state: AuthState) -> Router {
    let state = AppState { db };

    let auth_routes = Router::new()
        .route("/token", post(auth_api::login))
        .with_state(auth_state.clone());

    // Every mutating route runs behind the auth middleware; handlers add the
    // admin gate via the AdminUser extractor.
    let admin_routes = Router::new()
        .route("/teams", post(create_team))
        .route("/teams/:id", put(update_team).delete(delete_team))
        .route("/players", post(create_player))
        .route("/players/:id", put(update_player).delete(delete_player))
        .route("/roles", post(create_role))
        .route("/roles/:id", put(update_role).delete(delete_role))
        .route("/player-history", post(add_player_history))
        .route_layer(middleware::from_fn_with_state(auth_state, auth_middleware))
        .with_state(state.clone());

    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/roles", get(list_roles))
        .route("/players/:id/history", get(get_player_history))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(auth_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

// ===== Route Handlers =====

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Create a team - POST /teams (admin only)
async fn create_team(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<NewTeam>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = state.db.create_team(&payload)?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Update a team - PUT /teams/:id (admin only)
async fn update_team(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewTeam>,
) -> Result<Json<Team>, ApiError> {
    state
        .db
        .update_team(id, &payload)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Team not found".to_string()))
}

/// Delete a team - DELETE /teams/:id (admin only)
async fn delete_team(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_team(id)? {
        return Err(ApiError::NotFound("Team not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

/// Create a player - POST /players (admin only)
async fn create_player(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<NewPlayer>,
) -> Result<(StatusCode, Json<Player>), ApiError> {
    let player = state.db.create_player(&payload)?;
    Ok((StatusCode::CREATED, Json(player)))
}

/// Update a player - PUT /players/:id (admin only)
async fn update_player(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewPlayer>,
) -> Result<Json<Player>, ApiError> {
    state
        .db
        .update_player(id, &payload)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Player not found".to_string()))
}

/// Delete a player - DELETE /players/:id (admin only)
async fn delete_player(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_player(id)? {
        return Err(ApiError::NotFound("Player not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

/// Create a player role - POST /roles (admin only)
async fn create_role(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<NewPlayerRole>,
) -> Result<(StatusCode, Json<PlayerRole>), ApiError> {
    let role = state.db.create_role(&payload)?;
    Ok((StatusCode::CREATED, Json(role)))
}

/// Update a player role - PUT /roles/:id (admin only)
async fn update_role(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<NewPlayerRole>,
) -> Result<Json<PlayerRole>, ApiError> {
    state
        .db
        .update_role(id, &payload)?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Role not found".to_string()))
}

/// Delete a player role - DELETE /roles/:id (admin only)
async fn delete_role(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.db.delete_role(id)? {
        return Err(ApiError::NotFound("Role not found".to_string()));
    }
    Ok(Json(json!({ "ok": true })))
}

/// List player roles - GET /roles
async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<PlayerRole>>, ApiError> {
    let roles = state.db.list_roles()?;
    Ok(Json(roles))
}

/// Record a stint of a player at a team - POST /player-history (admin only)
async fn add_player_history(
    _admin: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<NewPlayerHistory>,
) -> Result<(StatusCode, Json<PlayerHistory>), ApiError> {
    let stint = state.db.add_history(&payload)?;
    Ok((StatusCode::CREATED, Json(stint)))
}

/// List a player's stints - GET /players/:id/history
async fn get_player_history(
    State(state): State<AppState>,
    Path(player_id): Path<i64>,
) -> Result<Json<Vec<PlayerHistory>>, ApiError> {
    let history = state.db.history_for_player(player_id)?;
    Ok(Json(history))
}

// ===== Response Types =====

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

// ===== Error Handling =====

#[derive(Debug)]
enum ApiError {
    Database(anyhow::Error),
    NotFound(String),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        };

        let body = Json(json!({ "detail": message }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let err = anyhow::anyhow!("Test error");
        let api_err: ApiError = err.into();

        match api_err {
            ApiError::Database(_) => (),
            _ => panic!("Expected Database error"),
        }
    }

    #[test]
    fn test_not_found_response() {
        let response = ApiError::NotFound("Team not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
