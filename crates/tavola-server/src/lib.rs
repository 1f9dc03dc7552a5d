pub mod approval;
pub mod auth;
pub mod config;
pub mod email;
pub mod hub;
pub mod rest;
pub mod state;
pub mod store;
pub mod verification;
pub mod websocket;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tavola_core::{AuthProvider, TvError, TvResult, User, UserRole};

use crate::config::Config;
use crate::hub::Event;
use crate::state::AppState;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tavola_server=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Run the server until ctrl-c.
pub async fn start_server(config: Config) -> TvResult<()> {
    let bind_addr = format!("{}:{}", config.bind_host, config.port);
    let state = AppState::new(config).await?;
    seed_admin(&state).await?;
    spawn_expiry_sweep(state.clone());

    let origins = state.config.cors_allowed_origins.clone();
    let router = rest::create_router_with_cors(state, &origins);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|err| TvError::Internal(format!("failed binding {bind_addr}: {err}")))?;
    tracing::info!(addr = %bind_addr, "server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| TvError::Internal(format!("server error: {err}")))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed installing ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}

/// Provision the configured admin account if no admin exists yet. Replaces
/// any notion of built-in credentials: without configuration there simply is
/// no admin.
async fn seed_admin(state: &Arc<AppState>) -> TvResult<()> {
    let (email, password) = match (
        state.config.seed_admin_email.as_deref(),
        state.config.seed_admin_password.as_deref(),
    ) {
        (Some(email), Some(password)) => (email, password),
        (None, None) => return Ok(()),
        _ => {
            return Err(TvError::Validation(
                "TAVOLA_SEED_ADMIN_EMAIL and TAVOLA_SEED_ADMIN_PASSWORD must be set together"
                    .into(),
            ))
        }
    };

    if state.store.admin_exists().await? {
        return Ok(());
    }
    if state.store.find_user_by_email(email).await?.is_some() {
        return Err(TvError::Validation(format!(
            "seed admin email {email} already belongs to a non-admin account"
        )));
    }

    let admin = User {
        id: Uuid::now_v7(),
        email: email.to_lowercase(),
        name: "Administrator".into(),
        password_hash: Some(auth::hash_password(password)?),
        role: UserRole::Admin,
        provider: AuthProvider::Local,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_user(&admin).await?;
    tracing::info!(email = %admin.email, "seed admin account provisioned");
    Ok(())
}

/// Sweep expired pending logins and verification codes every minute.
/// Requesters still attached to an expired login get a rejection push so
/// their client stops waiting.
fn spawn_expiry_sweep(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        // The first tick fires immediately; skip it.
        interval.tick().await;
        loop {
            interval.tick().await;

            let expired = state.pending_logins.expire_stale(state.approval_ttl()).await;
            for entry in expired {
                tracing::info!(approval_id = %entry.approval_id, "pending login expired");
                if let Some(requester) = entry.requester_connection_id {
                    state
                        .hub
                        .publish(
                            requester,
                            Event::LoginRejected {
                                message: "login approval request expired".into(),
                            },
                        )
                        .await;
                }
            }

            state.signup_codes.expire_stale().await;
            state.google_codes.expire_stale().await;
            state.reset_codes.expire_stale().await;
        }
    });
}
