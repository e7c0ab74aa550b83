use crate::startup::AppState;
use crate::ws::models::{Broadcast, ClientEvent, ServerEvent};
use axum::extract::Extension;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Extension(app_state): Extension<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(socket: WebSocket, app_state: AppState) {
    let connection_id = NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed);
    let (sender, mut receiver) = socket.split();

    // All frames go out through one writer task; the broadcast forwarder and
    // the read loop below both feed it.
    let (out_tx, out_rx) = mpsc::channel::<ServerEvent>(32);
    let mut write_task = tokio::spawn(write_events(sender, out_rx));

    if out_tx
        .send(ServerEvent::Connected {
            status: "connected".to_string(),
        })
        .await
        .is_err()
    {
        return;
    }

    let mut events_rx = app_state.events.subscribe();
    let forward_tx = out_tx.clone();
    let mut forward_task = tokio::spawn(async move {
        loop {
            match events_rx.recv().await {
                Ok(Broadcast { origin, event }) => {
                    if origin == Some(connection_id) {
                        continue;
                    }
                    if forward_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("websocket client {connection_id} lagged by {missed} events, dropping");
                    break;
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    loop {
        tokio::select! {
            message = receiver.next() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        handle_client_event(&app_state, connection_id, &out_tx, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("websocket client {connection_id} read error: {e}");
                        break;
                    }
                }
            }
            _ = &mut forward_task => break,
            _ = &mut write_task => break,
        }
    }

    forward_task.abort();
    write_task.abort();
    debug!("websocket client {connection_id} disconnected");
}

async fn write_events(
    mut sender: SplitSink<WebSocket, Message>,
    mut out_rx: mpsc::Receiver<ServerEvent>,
) {
    while let Some(event) = out_rx.recv().await {
        let payload = match serde_json::to_string(&event) {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to serialize websocket event: {e}");
                continue;
            }
        };
        if sender.send(Message::Text(payload)).await.is_err() {
            break;
        }
    }
}

async fn handle_client_event(
    app_state: &AppState,
    connection_id: u64,
    out_tx: &mpsc::Sender<ServerEvent>,
    text: &str,
) {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!("ignoring malformed websocket frame from {connection_id}: {e}");
            return;
        }
    };

    match event {
        ClientEvent::JoinActivity { activity_id } => {
            // Echoed to every client, sender included.
            let _ = app_state.events.send(Broadcast {
                origin: None,
                event: ServerEvent::JoinedActivity { activity_id },
            });
        }
        ClientEvent::JoinDisplay => {
            let _ = out_tx
                .send(ServerEvent::DisplayJoined {
                    status: "connected".to_string(),
                })
                .await;
        }
        ClientEvent::BroadcastTimer {
            activity_id,
            time_remaining,
        } => {
            let _ = app_state.events.send(Broadcast {
                origin: Some(connection_id),
                event: ServerEvent::TimerUpdate {
                    activity_id,
                    time_remaining,
                },
            });
        }
        ClientEvent::ProjectAnswer {
            activity_id,
            answer,
        } => {
            let _ = app_state.events.send(Broadcast {
                origin: Some(connection_id),
                event: ServerEvent::AnswerDisplay {
                    activity_id,
                    answer,
                },
            });
        }
    }
}
