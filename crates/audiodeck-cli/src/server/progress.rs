//! Progress transports: WebSocket at `/ws?downloadId=` and SSE at
//! `/api/youtube/progress/:id`. Both forward one hub subscription.

use std::convert::Infallible;

use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::Response;
use futures::stream::{Stream, StreamExt};
use serde::Deserialize;

use audiodeck_core::job::JobId;
use audiodeck_core::progress::Subscription;

use super::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WsQuery {
    download_id: Option<String>,
}

/// Ids that do not parse can never match a job; they get the ack only.
pub(super) fn subscription(state: &AppState, raw_id: &str) -> Subscription {
    match raw_id.parse::<JobId>() {
        Ok(id) => state.pipeline.hub().subscribe(&id),
        Err(_) => Subscription::ack_only(raw_id),
    }
}

pub(super) async fn ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    let download_id = query.download_id.filter(|id| !id.trim().is_empty());
    ws.on_upgrade(move |socket| async move {
        match download_id {
            Some(id) => forward(socket, subscription(&state, &id)).await,
            None => reject_missing_id(socket).await,
        }
    })
}

async fn reject_missing_id(mut socket: WebSocket) {
    let frame = CloseFrame {
        code: close_code::POLICY,
        reason: "downloadId is required".into(),
    };
    let _ = socket.send(Message::Close(Some(frame))).await;
}

async fn forward(mut socket: WebSocket, mut sub: Subscription) {
    loop {
        tokio::select! {
            message = sub.next() => {
                let Some(message) = message else { break };
                if socket.send(Message::Text(message.to_json())).await.is_err() {
                    return;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                // Client messages are ignored.
                Some(Ok(_)) => {}
            }
        }
    }
    let _ = socket.send(Message::Close(None)).await;
}

pub(super) async fn sse(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = subscription(&state, &id).into_stream().map(|message| {
        Ok(Event::default()
            .event(message.event_name())
            .data(message.to_json()))
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}
