use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A menu item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in cents to avoid float arithmetic on money.
    pub price_cents: i64,
    pub category: String,
    pub image_url: Option<String>,
    pub available: bool,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}
