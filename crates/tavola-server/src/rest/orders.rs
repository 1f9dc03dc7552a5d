//! Checkout and order management.
//!
//! Order totals are computed server-side from the catalog rows at checkout
//! time; the client never supplies prices. Line items are denormalized into
//! the order so later menu edits do not rewrite history.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use tavola_core::{Order, OrderItem, OrderStatus, TvError};

use crate::auth::{authorize_admin, authorize_user, AuthContext};
use crate::rest::ApiError;
use crate::state::AppState;
use crate::store::OrderFilter;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const MAX_LINE_QUANTITY: u32 = 50;

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    pub quantity: u32,
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub email: String,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// --- Handlers ---

/// POST /api/v1/orders
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<Json<Order>, ApiError> {
    if req.customer_name.trim().is_empty() {
        return Err(ApiError::bad_request("customer name is required"));
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if req.items.is_empty() {
        return Err(ApiError::bad_request("order must contain at least one item"));
    }

    let mut items = Vec::with_capacity(req.items.len());
    for line in &req.items {
        if line.quantity == 0 || line.quantity > MAX_LINE_QUANTITY {
            return Err(ApiError::bad_request(format!(
                "quantity must be between 1 and {MAX_LINE_QUANTITY}"
            )));
        }
        let product = state
            .store
            .get_product(line.product_id)
            .await?
            .ok_or_else(|| TvError::NotFound(format!("product {}", line.product_id)))?;
        if !product.available {
            return Err(ApiError::bad_request(format!(
                "{} is currently unavailable",
                product.name
            )));
        }
        items.push(OrderItem {
            product_id: product.id,
            name: product.name,
            unit_price_cents: product.price_cents,
            quantity: line.quantity,
        });
    }

    let order = Order {
        id: Uuid::now_v7(),
        customer_name: req.customer_name.trim().to_string(),
        email: req.email.to_lowercase(),
        total_cents: Order::computed_total(&items),
        items,
        status: OrderStatus::Pending,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_order(&order).await?;
    tracing::info!(order_id = %order.id, total_cents = order.total_cents, "order placed");
    Ok(Json(order))
}

/// GET /api/v1/orders — the caller's own orders, by token email.
pub async fn list_my_orders(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Order>>, ApiError> {
    authorize_user(&auth)?;
    let email = auth
        .email
        .as_deref()
        .ok_or_else(|| ApiError::unauthorized("authentication required"))?;
    let orders = state.store.list_orders_by_email(email).await?;
    Ok(Json(orders))
}

/// GET /api/v1/admin/orders  (admin)
pub async fn list_all_orders(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    authorize_admin(&auth)?;
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            OrderStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("unknown order status {raw:?}")))
        })
        .transpose()?;
    let orders = state
        .store
        .list_orders(&OrderFilter {
            status,
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(orders))
}

/// PATCH /api/v1/admin/orders/:id/status  (admin)
pub async fn update_order_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, ApiError> {
    authorize_admin(&auth)?;
    let status = OrderStatus::parse(&req.status)
        .ok_or_else(|| ApiError::bad_request(format!("unknown order status {:?}", req.status)))?;
    state.store.update_order_status(id, status).await?;
    let order = state
        .store
        .get_order(id)
        .await?
        .ok_or_else(|| TvError::NotFound(format!("order {id}")))?;
    Ok(Json(order))
}
