//! The live push channel.
//!
//! Three kinds of client connect here: admin sessions (which join the active
//! approver registry), authenticated customers, and not-yet-authenticated
//! requesters waiting on a login approval, who identify themselves with
//! `?identity=<email>`. Events flow server-to-client only; inbound frames are
//! just ping/close traffic.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;

use crate::auth::{auth_context_from_headers, validate_token, AuthContext};
use crate::hub::Event;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    /// Bearer token for clients that cannot set headers on the upgrade.
    token: Option<String>,
    /// Email of an unauthenticated client waiting on login approval.
    identity: Option<String>,
}

/// GET /ws
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let auth = match query.token.as_deref() {
        Some(token) => match validate_token(token, &state.config.jwt_secret) {
            Ok(auth) => auth,
            Err(status) => return status.into_response(),
        },
        None => match auth_context_from_headers(&headers, &state.config.jwt_secret) {
            Ok(auth) => auth,
            Err(status) => return status.into_response(),
        },
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, auth, query.identity))
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    auth: AuthContext,
    identity: Option<String>,
) {
    // Authenticated sessions are identified by their token email; guests by
    // the identity they volunteered, if any.
    let identity = auth.email.clone().or(identity);
    let (connection_id, mut rx) = state
        .hub
        .register(auth.user_id, identity, auth.is_admin())
        .await;
    tracing::debug!(%connection_id, admin = auth.is_admin(), "websocket connected");

    let (mut sender, mut receiver) = socket.split();

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(err) => {
                    tracing::error!(error = %err, "failed serializing push event");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    // Inbound traffic is only pings and close frames.
    while let Some(Ok(msg)) = receiver.next().await {
        match msg {
            Message::Close(_) => break,
            _ => {}
        }
    }

    send_task.abort();
    let was_admin = state.hub.unregister(connection_id).await;
    tracing::debug!(%connection_id, "websocket disconnected");

    // A departing approver leaves no logins stuck waiting on it.
    if was_admin {
        let stuck = state.pending_logins.reject_for_approver(connection_id).await;
        for entry in stuck {
            tracing::info!(approval_id = %entry.approval_id, "rejecting pending login, approver disconnected");
            if let Some(requester) = entry.requester_connection_id {
                state
                    .hub
                    .publish(
                        requester,
                        Event::LoginRejected {
                            message: "approver disconnected before deciding".into(),
                        },
                    )
                    .await;
            }
        }
    }
}
