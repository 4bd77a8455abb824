pub mod handlers;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::SessionHandle;
use crate::state::Action;

/// WebSocket upgrade handler
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(session): State<SessionHandle>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, session))
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, session: SessionHandle) {
    let (mut sender, mut receiver) = socket.split();

    // Each connection is one participant identity for its whole lifetime
    let connection_id = ulid::Ulid::new().to_string();
    tracing::info!(connection = %connection_id, "WebSocket connected");

    let mut outbound_rx = session.subscribe();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Ok(out) if out.is_for(&connection_id) => {
                        if let Ok(json) = serde_json::to_string(&out.message) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(connection = %connection_id, skipped, "Outbound receiver lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!(connection = %connection_id, "Received message: {}", text);

                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(client_msg) => {
                                if handlers::handle_message(client_msg, &connection_id, &session)
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!(connection = %connection_id, "Failed to parse client message: {}", e);
                                let error = ServerMessage::Error {
                                    code: "PARSE_ERROR".to_string(),
                                    msg: format!("Invalid message format: {}", e),
                                };
                                if let Ok(json) = serde_json::to_string(&error) {
                                    let _ = sender.send(Message::Text(json.into())).await;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(connection = %connection_id, "WebSocket error: {}", e);
                        break;
                    }
                    None => break,
                }
            }
        }
    }

    // A disconnect is an ordinary event for the engine
    let _ = session
        .dispatch(connection_id.clone(), Action::Disconnect)
        .await;
    tracing::info!(connection = %connection_id, "WebSocket connection closed");
}
