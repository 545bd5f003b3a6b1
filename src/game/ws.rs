use crate::game::core::messages::{ClientMessage, ServerMessage};
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Who is on the other end of a socket, once they said so
#[derive(Debug, Default)]
pub struct ConnectionContext {
    pub player: Option<String>,
    pub channel: Option<String>,
}

impl ConnectionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Channel and player, if this connection has entered a rush.
    pub fn seat(&self) -> Option<(&str, &str)> {
        Some((self.channel.as_deref()?, self.player.as_deref()?))
    }
}

/// Handles client commands and disconnections for one kind of socket.
pub trait ConnectionHandler: Send + Sync + 'static {
    fn handle_message(
        self: Arc<Self>,
        msg: ClientMessage,
        tx: broadcast::Sender<ServerMessage>,
        ctx: &mut ConnectionContext,
    ) -> impl Future<Output = ()> + Send;

    fn handle_disconnect(&self, ctx: &ConnectionContext, tx: &broadcast::Sender<ServerMessage>);

    fn name(&self) -> &'static str;
}

/// Split the socket, pump outgoing events from a per-connection broadcast
/// channel and feed incoming commands to `handler` until either side ends.
pub async fn run_connection<H: ConnectionHandler>(socket: WebSocket, handler: Arc<H>) {
    info!("New {} WebSocket connection", handler.name());
    let (mut sender, receiver) = socket.split();
    let (tx, mut rx) = broadcast::channel::<ServerMessage>(64);

    let send_task = tokio::spawn(async move {
        loop {
            let msg = match rx.recv().await {
                Ok(msg) => msg,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Client too slow, dropped events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "Failed to serialize server message");
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let recv_task = tokio::spawn(receive_loop(receiver, tx.clone(), handler.clone()));

    tokio::select! {
        _ = send_task => {},
        result = recv_task => {
            if let Ok(ctx) = result {
                handler.handle_disconnect(&ctx, &tx);
            }
        },
    }

    info!("{} WebSocket connection closed", handler.name());
}

async fn receive_loop<H: ConnectionHandler>(
    mut receiver: futures_util::stream::SplitStream<WebSocket>,
    tx: broadcast::Sender<ServerMessage>,
    handler: Arc<H>,
) -> ConnectionContext {
    let mut ctx = ConnectionContext::new();

    while let Some(Ok(msg)) = receiver.next().await {
        let Message::Text(text) = msg else {
            debug!("Received non-text message, ignoring");
            continue;
        };

        let Ok(client_msg) = serde_json::from_str::<ClientMessage>(&text) else {
            warn!(raw = %text, "Failed to parse client message");
            let _ = tx.send(ServerMessage::Error {
                message: "unrecognized command".to_string(),
            });
            continue;
        };

        handler.clone().handle_message(client_msg, tx.clone(), &mut ctx).await;
    }

    ctx
}
