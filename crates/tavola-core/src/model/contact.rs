use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A message submitted through the contact form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub read: bool,
    /// Unix timestamp (seconds).
    pub created_at: i64,
}
