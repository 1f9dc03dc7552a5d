//! REST surface: error mapping and router assembly.

use std::sync::Arc;

use axum::http::{HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tavola_core::TvError;

use crate::auth::auth_middleware;
use crate::state::AppState;
use crate::websocket;

pub mod auth;
pub mod contacts;
pub mod orders;
pub mod products;
pub mod reservations;

/// Handler-level error: an HTTP status plus a client-facing message.
/// Everything the client sees goes through `{"message": ...}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<TvError> for ApiError {
    fn from(err: TvError) -> Self {
        match err {
            TvError::NotFound(what) => Self::not_found(format!("{what} not found")),
            TvError::UserNotFound(_) => Self::not_found("account not found"),
            TvError::InvalidCredentials => Self::unauthorized("invalid email or password"),
            TvError::InvalidCode => Self::bad_request("invalid or expired code"),
            TvError::Duplicate(what) => Self::bad_request(format!("{what} already exists")),
            TvError::Validation(message) => Self::bad_request(message),
            err @ (TvError::Storage(_)
            | TvError::Email(_)
            | TvError::Serialization(_)
            | TvError::Internal(_)) => {
                tracing::error!(error = %err, "internal error while handling request");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    message: "internal server error".into(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

/// GET /api/v1/health
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Build the full application router, WebSocket endpoint included.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        // auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/signup", post(auth::signup))
        .route("/api/v1/auth/signup/verify", post(auth::signup_verify))
        .route("/api/v1/auth/google", post(auth::google_signup))
        .route("/api/v1/auth/google/verify", post(auth::google_verify))
        .route("/api/v1/auth/reset", post(auth::reset_request))
        .route("/api/v1/auth/reset/verify", post(auth::reset_verify))
        .route("/api/v1/auth/reset/apply", post(auth::reset_apply))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/approvals/decide", post(auth::decide_approval))
        // catalog
        .route("/api/v1/products", get(products::list_products))
        .route("/api/v1/products", post(products::create_product))
        .route("/api/v1/products/:id", get(products::get_product))
        .route("/api/v1/products/:id", put(products::update_product))
        .route("/api/v1/products/:id", delete(products::delete_product))
        // orders
        .route("/api/v1/orders", post(orders::create_order))
        .route("/api/v1/orders", get(orders::list_my_orders))
        .route("/api/v1/admin/orders", get(orders::list_all_orders))
        .route(
            "/api/v1/admin/orders/:id/status",
            patch(orders::update_order_status),
        )
        // reservations
        .route("/api/v1/reservations", post(reservations::create_reservation))
        .route(
            "/api/v1/admin/reservations",
            get(reservations::list_reservations),
        )
        .route(
            "/api/v1/admin/reservations/:id/status",
            patch(reservations::update_reservation_status),
        )
        // contact messages
        .route("/api/v1/contacts", post(contacts::create_contact))
        .route("/api/v1/admin/contacts", get(contacts::list_contacts))
        .route(
            "/api/v1/admin/contacts/:id/read",
            post(contacts::mark_contact_read),
        )
        .route(
            "/api/v1/admin/contacts/:id",
            delete(contacts::delete_contact),
        )
        // live channel
        .route("/ws", get(websocket::ws_handler))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router plus a CORS layer for the configured browser origins.
pub fn create_router_with_cors(state: Arc<AppState>, origins: &[String]) -> Router {
    let router = create_router(state);
    if origins.is_empty() {
        return router;
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any);

    router.layer(cors)
}
