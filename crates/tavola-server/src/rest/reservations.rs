//! Table reservations: public booking, admin triage.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use tavola_core::{Reservation, ReservationStatus, TvError};

use crate::auth::{authorize_admin, AuthContext};
use crate::rest::ApiError;
use crate::state::AppState;
use crate::store::ReservationFilter;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const MAX_PARTY_SIZE: u32 = 20;

// --- DTOs ---

#[derive(Debug, Deserialize)]
pub struct CreateReservationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: String,
    pub time: String,
    pub party_size: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListReservationsQuery {
    pub status: Option<String>,
    pub date: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

// --- Handlers ---

/// POST /api/v1/reservations
pub async fn create_reservation(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateReservationRequest>,
) -> Result<Json<Reservation>, ApiError> {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    if req.email.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::bad_request("a valid email address is required"));
    }
    if req.phone.trim().is_empty() {
        return Err(ApiError::bad_request("phone number is required"));
    }
    if req.party_size == 0 || req.party_size > MAX_PARTY_SIZE {
        return Err(ApiError::bad_request(format!(
            "party size must be between 1 and {MAX_PARTY_SIZE}"
        )));
    }
    if NaiveDate::parse_from_str(&req.date, "%Y-%m-%d").is_err() {
        return Err(ApiError::bad_request("date must be YYYY-MM-DD"));
    }
    if chrono::NaiveTime::parse_from_str(&req.time, "%H:%M").is_err() {
        return Err(ApiError::bad_request("time must be HH:MM"));
    }

    let reservation = Reservation {
        id: Uuid::now_v7(),
        name: req.name.trim().to_string(),
        email: req.email.to_lowercase(),
        phone: req.phone.trim().to_string(),
        date: req.date,
        time: req.time,
        party_size: req.party_size,
        notes: req.notes,
        status: ReservationStatus::Pending,
        created_at: chrono::Utc::now().timestamp(),
    };
    state.store.insert_reservation(&reservation).await?;
    tracing::info!(reservation_id = %reservation.id, date = %reservation.date, "reservation requested");
    Ok(Json(reservation))
}

/// GET /api/v1/admin/reservations  (admin)
pub async fn list_reservations(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListReservationsQuery>,
) -> Result<Json<Vec<Reservation>>, ApiError> {
    authorize_admin(&auth)?;
    let status = query
        .status
        .as_deref()
        .map(|raw| {
            ReservationStatus::parse(raw).ok_or_else(|| {
                ApiError::bad_request(format!("unknown reservation status {raw:?}"))
            })
        })
        .transpose()?;
    let reservations = state
        .store
        .list_reservations(&ReservationFilter {
            status,
            date: query.date,
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
            offset: query.offset.unwrap_or(0),
        })
        .await?;
    Ok(Json(reservations))
}

/// PATCH /api/v1/admin/reservations/:id/status  (admin)
pub async fn update_reservation_status(
    Extension(auth): Extension<AuthContext>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Reservation>, ApiError> {
    authorize_admin(&auth)?;
    let status = ReservationStatus::parse(&req.status).ok_or_else(|| {
        ApiError::bad_request(format!("unknown reservation status {:?}", req.status))
    })?;
    state.store.update_reservation_status(id, status).await?;
    let reservation = state
        .store
        .get_reservation(id)
        .await?
        .ok_or_else(|| TvError::NotFound(format!("reservation {id}")))?;
    Ok(Json(reservation))
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

    fn booking(date: &str) -> CreateReservationRequest {
        CreateReservationRequest {
            name: "Dana".into(),
            email: "dana@example.com".into(),
            phone: "555-0100".into(),
            date: date.into(),
            time: "19:30".into(),
            party_size: 4,
            notes: Some("window seat".into()),
        }
    }

    #[tokio::test]
    async fn booking_starts_pending() {
        let state = test_state().await;
        let reservation = create_reservation(State(state.clone()), Json(booking("2026-09-01")))
            .await
            .unwrap()
            .0;
        assert_eq!(reservation.status, ReservationStatus::Pending);
    }

    #[tokio::test]
    async fn malformed_date_or_party_size_rejected() {
        let state = test_state().await;

        let mut bad_date = booking("01/09/2026");
        bad_date.date = "01/09/2026".into();
        let err = create_reservation(State(state.clone()), Json(bad_date))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let mut too_big = booking("2026-09-01");
        too_big.party_size = 200;
        let err = create_reservation(State(state.clone()), Json(too_big))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_confirms_and_filters_by_date() {
        let state = test_state().await;
        let first = create_reservation(State(state.clone()), Json(booking("2026-09-01")))
            .await
            .unwrap()
            .0;
        create_reservation(State(state.clone()), Json(booking("2026-09-02")))
            .await
            .unwrap();

        let confirmed = update_reservation_status(
            Extension(admin()),
            State(state.clone()),
            Path(first.id),
            Json(UpdateStatusRequest {
                status: "confirmed".into(),
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(confirmed.status, ReservationStatus::Confirmed);

        let that_day = list_reservations(
            Extension(admin()),
            State(state.clone()),
            Query(ListReservationsQuery {
                status: None,
                date: Some("2026-09-01".into()),
                limit: None,
                offset: None,
            }),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(that_day.len(), 1);
        assert_eq!(that_day[0].id, first.id);
    }

    #[tokio::test]
    async fn listing_requires_admin() {
        let state = test_state().await;
        let err = list_reservations(
            Extension(AuthContext::anonymous()),
            State(state.clone()),
            Query(ListReservationsQuery {
                status: None,
                date: None,
                limit: None,
                offset: None,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
