//! Authentication endpoints: login with admin approval, email-verified
//! signup (manual and Google), password reset, and the approval decision.
//!
//! Login is the interesting one. Customer logins are settled by the
//! credentials check alone. An admin login while another admin session is
//! connected parks in the pending registry, the first-connected admin gets a
//! push, and the caller is told to wait; the decision endpoint settles the
//! entry exactly once and pushes the outcome to the requester's live
//! connection if it has one.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use tavola_core::{AuthProvider, PublicUser, TvError, User, UserRole};

use crate::auth::{authorize_admin, authorize_user, hash_password, issue_token, verify_password, AuthContext};
use crate::hub::Event;
use crate::rest::ApiError;
use crate::state::{AppState, GoogleSignupPayload, SignupPayload};

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: PublicUser,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct PendingApprovalResponse {
    pub status: &'static str,
    pub approval_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleSignupRequest {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyCodeRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetApplyRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct DecideApprovalRequest {
    pub approval_id: Uuid,
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: PublicUser,
}

fn message(text: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        message: text.into(),
    })
}

fn require_email(email: &str) -> Result<(), ApiError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    Ok(())
}

fn require_password(password: &str) -> Result<(), ApiError> {
    if password.len() < 8 {
        return Err(ApiError::bad_request(
            "password must be at least 8 characters",
        ));
    }
    Ok(())
}

// --- Handlers ---

/// POST /api/v1/auth/login
///
/// `200 {user, token}` when the login completes directly,
/// `202 {status, approval_id}` when it is parked for admin approval.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(TvError::InvalidCredentials)?;
    let hash = user
        .password_hash
        .as_deref()
        .ok_or(TvError::InvalidCredentials)?;
    if !verify_password(&req.password, hash) {
        return Err(TvError::InvalidCredentials.into());
    }

    // Only privileged logins need a second pair of eyes: another connected
    // admin becomes the approver. Customer logins always complete directly,
    // and an admin's own session never approves its own login.
    let approver = if user.role == UserRole::Admin {
        state.hub.first_admin_excluding(user.id).await
    } else {
        None
    };
    let Some(approver_connection_id) = approver else {
        let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;
        return Ok(Json(AuthResponse {
            user: user.public(),
            token,
        })
        .into_response());
    };

    let approval_id = state
        .pending_logins
        .create(user.id, &user.name, approver_connection_id)
        .await;

    let delivered = state
        .hub
        .publish(
            approver_connection_id,
            Event::LoginApprovalRequest {
                approval_id,
                requester_name: user.name.clone(),
            },
        )
        .await;
    if !delivered {
        tracing::warn!(%approval_id, "approver connection vanished before notification");
    }

    // Best-effort: if the requester already has a live connection waiting
    // under this email, remember it so the decision can be pushed back.
    if let Some(requester_conn) = state.hub.lookup_by_identity(&user.email).await {
        state
            .pending_logins
            .attach_requester(approval_id, requester_conn)
            .await;
    }

    tracing::info!(%approval_id, user = %user.email, "login deferred pending admin approval");
    Ok((
        StatusCode::ACCEPTED,
        Json(PendingApprovalResponse {
            status: "pending_approval",
            approval_id,
        }),
    )
        .into_response())
}

/// POST /api/v1/auth/approvals/decide  (admin)
pub async fn decide_approval(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecideApprovalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    authorize_admin(&auth)?;

    // Remove-on-lookup: a second decision on the same id lands here.
    let entry = state
        .pending_logins
        .resolve(req.approval_id)
        .await
        .ok_or_else(|| {
            ApiError::not_found("approval request not found, expired, or already handled")
        })?;

    if !req.approved {
        let approver = auth.name.as_deref().unwrap_or("an administrator");
        notify_requester(
            &state,
            &entry,
            Event::LoginRejected {
                message: format!("login rejected by {approver}"),
            },
        )
        .await;
        tracing::info!(approval_id = %entry.approval_id, "login rejected by approver");
        return Ok(message("login rejected"));
    }

    let user = state
        .store
        .find_user_by_id(entry.user_id)
        .await?
        .ok_or_else(|| {
            tracing::warn!(user_id = %entry.user_id, "approved login for a vanished account");
            ApiError::not_found("account not found")
        })?;
    let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;
    notify_requester(
        &state,
        &entry,
        Event::LoginApproved {
            user: user.public(),
            token,
        },
    )
    .await;
    tracing::info!(approval_id = %entry.approval_id, user = %user.email, "login approved");
    Ok(message("login approved"))
}

async fn notify_requester(state: &AppState, entry: &crate::approval::PendingLogin, event: Event) {
    let Some(connection_id) = entry.requester_connection_id else {
        tracing::debug!(approval_id = %entry.approval_id, "no requester connection attached");
        return;
    };
    if !state.hub.publish(connection_id, event).await {
        tracing::warn!(approval_id = %entry.approval_id, "requester connection gone, outcome dropped");
    }
}

/// POST /api/v1/auth/signup
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_email(&req.email)?;
    require_password(&req.password)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(TvError::Duplicate(format!("account {}", req.email)).into());
    }

    let code = state
        .signup_codes
        .issue(
            &req.email,
            SignupPayload {
                name: req.name.trim().to_string(),
                password: req.password,
            },
        )
        .await;
    if let Err(err) = state.mailer.send_verification_code(&req.email, &code).await {
        tracing::warn!(error = %err, "failed sending signup verification email");
    }
    Ok(message("verification code sent"))
}

/// POST /api/v1/auth/signup/verify
pub async fn signup_verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let payload = state
        .signup_codes
        .consume(&req.email, &req.code)
        .await
        .ok_or(TvError::InvalidCode)?;

    let password_hash = hash_password(&payload.password)?;
    finish_signup(
        &state,
        &req.email,
        &payload.name,
        Some(password_hash),
        AuthProvider::Local,
    )
    .await
}

/// POST /api/v1/auth/google
pub async fn google_signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<GoogleSignupRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_email(&req.email)?;
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if state.store.find_user_by_email(&req.email).await?.is_some() {
        return Err(TvError::Duplicate(format!("account {}", req.email)).into());
    }

    let code = state
        .google_codes
        .issue(
            &req.email,
            GoogleSignupPayload {
                name: req.name.trim().to_string(),
            },
        )
        .await;
    if let Err(err) = state.mailer.send_verification_code(&req.email, &code).await {
        tracing::warn!(error = %err, "failed sending Google signup verification email");
    }
    Ok(message("verification code sent"))
}

/// POST /api/v1/auth/google/verify
pub async fn google_verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let payload = state
        .google_codes
        .consume(&req.email, &req.code)
        .await
        .ok_or(TvError::InvalidCode)?;

    finish_signup(&state, &req.email, &payload.name, None, AuthProvider::Google).await
}

async fn finish_signup(
    state: &AppState,
    email: &str,
    name: &str,
    password_hash: Option<String>,
    provider: AuthProvider,
) -> Result<Json<AuthResponse>, ApiError> {
    let user = User {
        id: Uuid::now_v7(),
        email: email.to_lowercase(),
        name: name.to_string(),
        password_hash,
        role: UserRole::Customer,
        provider,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_user(&user).await?;
    let token = issue_token(&user, &state.config.jwt_secret, state.config.token_ttl_secs)?;
    tracing::info!(user = %user.email, ?provider, "account created");
    Ok(Json(AuthResponse {
        user: user.public(),
        token,
    }))
}

/// POST /api/v1/auth/reset
///
/// Always `200`, whether or not the account exists.
pub async fn reset_request(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_email(&req.email)?;

    if state.store.find_user_by_email(&req.email).await?.is_some() {
        let code = state.reset_codes.issue(&req.email, ()).await;
        if let Err(err) = state.mailer.send_reset_code(&req.email, &code).await {
            tracing::warn!(error = %err, "failed sending password reset email");
        }
    }
    Ok(message("if the account exists, a reset code has been sent"))
}

/// POST /api/v1/auth/reset/verify
///
/// Checks the code without consuming it; the client shows the new-password
/// form only after this succeeds.
pub async fn reset_verify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyCodeRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if !state.reset_codes.peek(&req.email, &req.code).await {
        return Err(TvError::InvalidCode.into());
    }
    Ok(Json(serde_json::json!({ "verified": true })))
}

/// POST /api/v1/auth/reset/apply
pub async fn reset_apply(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ResetApplyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_password(&req.new_password)?;
    state
        .reset_codes
        .consume(&req.email, &req.code)
        .await
        .ok_or(TvError::InvalidCode)?;

    let user = state
        .store
        .find_user_by_email(&req.email)
        .await?
        .ok_or(TvError::InvalidCode)?;
    let hash = hash_password(&req.new_password)?;
    state.store.update_user_password(user.id, &hash).await?;
    tracing::info!(user = %user.email, "password reset applied");
    Ok(message("password updated"))
}

/// GET /api/v1/auth/me
pub async fn me(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<MeResponse>, ApiError> {
    authorize_user(&auth)?;
    let user_id = auth
        .user_id
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or(TvError::UserNotFound(user_id))?;
    Ok(Json(MeResponse { user: user.public() }))
}
