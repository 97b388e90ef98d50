//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::{Channel, SubscriptionManager};
use crate::domain::AuctionEvent;
use crate::service::AuctionService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<AuctionEvent>,
    auction_service: Arc<AuctionService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &auction_service).await;
                        if let Some(resp_json) = response
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(auction_event) => {
                        if subs.matches(&auction_event) {
                            let msg = WsMessage {
                                id: uuid::Uuid::new_v4().to_string(),
                                msg_type: WsMessageType::Event,
                                timestamp: chrono::Utc::now(),
                                payload: serde_json::to_value(&auction_event).unwrap_or_default(),
                            };
                            let json = serde_json::to_string(&msg).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client, returning an optional JSON response.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    auction_service: &Arc<AuctionService>,
) -> Option<String> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return error_response(String::new(), 400, "malformed JSON");
    };

    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload.clone()) else {
        return error_response(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { channels } => {
            let (parsed, rejected) = parse_channels(&channels);
            subs.subscribe(&parsed);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "subscribed": parsed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
        WsCommand::Unsubscribe { channels } => {
            let (parsed, rejected) = parse_channels(&channels);
            subs.unsubscribe(&parsed);
            let response = WsMessage {
                id: msg.id,
                msg_type: WsMessageType::Response,
                timestamp: chrono::Utc::now(),
                payload: serde_json::json!({
                    "unsubscribed": parsed.iter().map(ToString::to_string).collect::<Vec<_>>(),
                    "rejected": rejected,
                    "remaining_count": subs.count(),
                }),
            };
            serde_json::to_string(&response).ok()
        }
        WsCommand::GetState { auction_id } => {
            let Ok(uuid) = auction_id.parse::<uuid::Uuid>() else {
                return error_response(msg.id, 400, "invalid auction ID");
            };
            match auction_service
                .get_auction(crate::domain::AuctionId::from_uuid(uuid))
                .await
            {
                Ok(auction) => {
                    let response = WsMessage {
                        id: msg.id,
                        msg_type: WsMessageType::Response,
                        timestamp: chrono::Utc::now(),
                        payload: serde_json::to_value(&auction).unwrap_or_default(),
                    };
                    serde_json::to_string(&response).ok()
                }
                Err(e) => error_response(msg.id, i32::from(e.status_code().as_u16()), &e.to_string()),
            }
        }
    }
}

/// Splits channel strings into parsed channels and rejected inputs.
fn parse_channels(channels: &[String]) -> (Vec<Channel>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for raw in channels {
        match Channel::parse(raw) {
            Some(channel) => parsed.push(channel),
            None => rejected.push(raw.clone()),
        }
    }
    (parsed, rejected)
}

fn error_response(id: String, code: i32, message: &str) -> Option<String> {
    let err = WsMessage {
        id,
        msg_type: WsMessageType::Error,
        timestamp: chrono::Utc::now(),
        payload: serde_json::json!({
            "code": code,
            "message": message,
        }),
    };
    serde_json::to_string(&err).ok()
}
