//! Contact-form messages: public submission, admin inbox.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use tavola_core::ContactMessage;

use crate::auth::{authorize_admin, AuthContext};
use crate::rest::ApiError;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const MAX_MESSAGE_LENGTH: usize = 4000;

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct CreateContactRequest {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListContactsQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// --- Handlers ---

/// POST /api/v1/contacts
pub async fn create_contact(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateContactRequest>,
) -> Result<Json<ContactMessage>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if req.message.trim().is_empty() {
        return Err(ApiError::bad_request("message is required"));
    }
    if req.message.len() > MAX_MESSAGE_LENGTH {
        return Err(ApiError::bad_request("message is too long"));
    }

    let contact = ContactMessage {
        id: Uuid::now_v7(),
        name: req.name.trim().to_string(),
        email: req.email.to_lowercase(),
        subject: req.subject.trim().to_string(),
        message: req.message,
        read: false,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_contact(&contact).await?;
    Ok(Json(contact))
}

/// GET /api/v1/admin/contacts  (admin)
pub async fn list_contacts(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListContactsQuery>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    authorize_admin(&auth)?;
    let contacts = state
        .store
        .list_contacts(
            query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(contacts))
}

/// POST /api/v1/admin/contacts/:id/read  (admin)
pub async fn mark_contact_read(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize_admin(&auth)?;
    state.store.mark_contact_read(id).await?;
    Ok(Json(serde_json::json!({ "message": "marked as read" })))
}

/// DELETE /api/v1/admin/contacts/:id  (admin)
pub async fn delete_contact(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    authorize_admin(&auth)?;
    state.store.delete_contact(id).await?;
    Ok(Json(serde_json::json!({ "message": "contact message deleted" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthRole;
    use crate::config::Config;
    use axum::http::StatusCode;

    async fn test_state() -> Arc<AppState> {
        AppState::new(Config::default()).await.expect("state")
    }

    fn admin() -> AuthContext {
        AuthContext {
            user_id: Some(Uuid::now_v7()),
            email: Some("boss@example.com".into()),
            name: Some("Boss".into()),
            role: AuthRole::Admin,
        }
    }

    fn inquiry() -> CreateContactRequest {
        CreateContactRequest {
            name: "Dana".into(),
            email: "dana@example.com".into(),
            subject: "Catering".into(),
            message: "Do you cater weddings?".into(),
        }
    }

    #[tokio::test]
    async fn submission_lands_unread_in_admin_inbox() {
        let state = test_state().await;
        let contact = create_contact(State(state.clone()), Json(inquiry()))
            .await
            .unwrap()
            .0;
        assert!(!contact.read);

        let inbox = list_contacts(
            Extension(admin()),
            State(state.clone()),
            Query(ListContactsQuery {
                limit: None,
                offset: None,
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(inbox.len(), 1);

        mark_contact_read(Extension(admin()), State(state.clone()), Path(contact.id))
            .await
            .unwrap();
        delete_contact(Extension(admin()), State(state.clone()), Path(contact.id))
            .await
            .unwrap();

        let err = delete_contact(Extension(admin()), State(state.clone()), Path(contact.id))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn inbox_requires_admin() {
        let state = test_state().await;
        let err = list_contacts(
            Extension(AuthContext::anonymous()),
            State(state.clone()),
            Query(ListContactsQuery {
                limit: None,
                offset: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let state = test_state().await;
        let mut bad = inquiry();
        bad.message = "   ".into();
        let err = create_contact(State(state.clone()), Json(bad))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
