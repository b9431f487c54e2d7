//! Squadbase - Football data-management backend
//! Mission: Token-gated CRUD over teams, players, roles, and player history

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use std::{env, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squadbase_backend::{
    api::create_router,
    auth::{jwt::DEFAULT_TOKEN_TTL_MINUTES, AuthState, JwtHandler, SqliteUserStore},
    db::Database,
};

/// Anything shorter cannot serve as an HMAC-SHA256 key worth having.
const MIN_SECRET_BYTES: usize = 32;

struct Config {
    bind_addr: String,
    db_path: String,
    auth_db_path: String,
    jwt_secret: String,
    token_ttl_minutes: i64,
}

/// Load configuration from the environment.
///
/// A missing or weak JWT_SECRET is fatal at startup, never a per-request
/// error.
fn load_config() -> Result<Config> {
    let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
    if jwt_secret.len() < MIN_SECRET_BYTES {
        bail!("JWT_SECRET must be at least {} bytes", MIN_SECRET_BYTES);
    }

    let token_ttl_minutes = env::var("TOKEN_TTL_MINUTES")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);

    Ok(Config {
        bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
        db_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "football.db".to_string()),
        auth_db_path: env::var("AUTH_DB_PATH")
            .unwrap_or_else(|_| "squadbase_auth.db".to_string()),
        jwt_secret,
        token_ttl_minutes,
    })
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "squadbase_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing();

    info!("🚀 Squadbase backend starting");

    let config = load_config()?;

    let user_store = Arc::new(SqliteUserStore::new(&config.auth_db_path)?);
    let jwt_handler = Arc::new(
        JwtHandler::new(config.jwt_secret).with_ttl_minutes(config.token_ttl_minutes),
    );
    let auth_state = AuthState::new(user_store, jwt_handler);
    info!("🔐 Authentication initialized at: {}", config.auth_db_path);

    let db = Arc::new(Database::open(&config.db_path)?);

    let app = create_router(db, auth_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!("🎯 API server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
