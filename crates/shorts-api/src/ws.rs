//! WebSocket progress streaming.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::time::interval;
use tracing::{debug, info, warn};

use shorts_models::JobEvent;

use crate::metrics;
use crate::state::AppState;

const ENDPOINT: &str = "job";
const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Global counter for active WebSocket connections.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

/// Stream job events to the client, starting with a snapshot.
pub async fn ws_job(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_job_socket(socket, state))
}

async fn handle_job_socket(socket: WebSocket, state: AppState) {
    metrics::record_ws_connection(ENDPOINT);
    let active = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
    metrics::set_ws_active_connections(active);
    info!("Job WebSocket connected ({} active)", active);

    let (mut sender, mut receiver) = socket.split();

    // Subscribe before the snapshot so no event falls between them
    let mut events = state.orchestrator.subscribe();
    let snapshot = JobEvent::snapshot(&state.orchestrator.snapshot().await);

    if send_event(&mut sender, &snapshot).await {
        let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
        heartbeat.tick().await;

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Ok(event) => {
                        if !send_event(&mut sender, &event).await {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Job WebSocket lagged by {} events, resending snapshot", skipped);
                        let snapshot = JobEvent::snapshot(&state.orchestrator.snapshot().await);
                        if !send_event(&mut sender, &snapshot).await {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                },
                incoming = receiver.next() => match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        debug!("Job WebSocket receive error: {}", e);
                        break;
                    }
                },
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Vec::new())).await.is_err() {
                        warn!("Job WebSocket heartbeat failed, client disconnected");
                        break;
                    }
                }
            }
        }
    }

    let active = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
    metrics::set_ws_active_connections(active);
    info!("Job WebSocket disconnected ({} active)", active);
}

/// Serialize and send one event. Returns false once the client is gone.
async fn send_event(sender: &mut SplitSink<WebSocket, Message>, event: &JobEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize job event: {}", e);
            return true;
        }
    };

    if sender.send(Message::Text(json)).await.is_err() {
        return false;
    }
    metrics::record_ws_message_sent(ENDPOINT, event.type_name());
    true
}
