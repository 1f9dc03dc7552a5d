//! Menu catalog endpoints. Reads are public; writes are admin-only.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use tavola_core::{Product, TvError};

use crate::auth::{authorize_admin, AuthContext};
use crate::rest::ApiError;
use crate::state::AppState;
use crate::store::ProductFilter;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub available: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ProductRequest {
    pub name: String,
    pub description: String,
    pub price_cents: i64,
    pub category: String,
    pub image_url: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

fn validate(req: &ProductRequest) -> Result<(), ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("product name is required"));
    }
    if req.category.trim().is_empty() {
        return Err(ApiError::bad_request("product category is required"));
    }
    if req.price_cents < 0 {
        return Err(ApiError::bad_request("price must not be negative"));
    }
    Ok(())
}

fn page_size(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

// --- Handlers ---

/// GET /api/v1/products
pub async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = state
        .store
        .list_products(&ProductFilter {
            category: query.category,
            available: query.available,
            limit: page_size(query.limit),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(products))
}

/// GET /api/v1/products/:id
pub async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Product>, ApiError> {
    let product = state
        .store
        .get_product(id)
        .await?
        .ok_or_else(|| TvError::NotFound(format!("product {id}")))?;
    Ok(Json(product))
}

/// POST /api/v1/products  (admin)
pub async fn create_product(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    authorize_admin(&auth)?;
    validate(&req)?;

    let product = Product {
        id: Uuid::now_v7(),
        name: req.name.trim().to_string(),
        description: req.description,
        price_cents: req.price_cents,
        category: req.category.trim().to_string(),
        image_url: req.image_url,
        available: req.available,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_product(&product).await?;
    Ok(Json(product))
}

/// PUT /api/v1/products/:id  (admin)
pub async fn update_product(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ProductRequest>,
) -> Result<Json<Product>, ApiError> {
    authorize_admin(&auth)?;
    validate(&req)?;

    let existing = state
        .store
        .get_product(id)
        .await?
        .ok_or_else(|| TvError::NotFound(format!("product {id}")))?;
    let product = Product {
        id,
        name: req.name.trim().to_string(),
        description: req.description,
        price_cents: req.price_cents,
        category: req.category.trim().to_string(),
        image_url: req.image_url,
        available: req.available,
        created_at: existing.created_at,
    };
    state.store.update_product(&product).await?;
    Ok(Json(product))
}

/// DELETE /api/v1/products/:id  (admin)
pub async fn delete_product(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize_admin(&auth)?;
    state.store.delete_product(id).await?;
    Ok(Json(serde_json::json!({ "message": "product deleted" })))
}
