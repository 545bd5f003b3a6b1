use super::core::messages::{ClientMessage, ServerMessage};
use super::core::round::Resolution;
use super::engine::{Presenter, RushRegistry};
use super::ws::{ConnectionContext, ConnectionHandler};
use crate::error::RushError;
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Every connection watching one channel
#[derive(Default)]
pub struct Audience {
    members: Mutex<Vec<broadcast::Sender<ServerMessage>>>,
}

impl Audience {
    pub fn new(first: broadcast::Sender<ServerMessage>) -> Self {
        Self {
            members: Mutex::new(vec![first]),
        }
    }

    pub fn subscribe(&self, tx: broadcast::Sender<ServerMessage>) {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        if !members.iter().any(|member| member.same_channel(&tx)) {
            members.push(tx);
        }
    }

    pub fn unsubscribe(&self, tx: &broadcast::Sender<ServerMessage>) {
        self.members
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|member| !member.same_channel(tx));
    }

    pub fn len(&self) -> usize {
        self.members.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Presenter for Audience {
    fn publish(&self, event: ServerMessage) {
        let mut members = self.members.lock().unwrap_or_else(PoisonError::into_inner);
        // A failed send means the connection is gone
        members.retain(|member| member.send(event.clone()).is_ok());
    }
}

/// Rush commands arriving over `/ws/rush`
pub struct RushState {
    registry: Arc<RushRegistry>,
    audiences: DashMap<String, Arc<Audience>>,
}

impl RushState {
    pub fn new(registry: Arc<RushRegistry>) -> Self {
        Self {
            registry,
            audiences: DashMap::new(),
        }
    }

    pub fn registry(&self) -> &Arc<RushRegistry> {
        &self.registry
    }

    fn start_rush(
        self: &Arc<Self>,
        channel: &str,
        player: &str,
        tx: &broadcast::Sender<ServerMessage>,
    ) -> Result<(), RushError> {
        let audience = Arc::new(Audience::new(tx.clone()));
        self.registry.create(channel, player, audience.clone())?;
        // Any audience left here belonged to a session that is gone
        self.audiences.insert(channel.to_string(), audience);
        Ok(())
    }

    fn join(
        &self,
        channel: &str,
        player: &str,
        tx: &broadcast::Sender<ServerMessage>,
    ) -> Result<(), RushError> {
        let audience = self
            .audiences
            .get(channel)
            .map(|entry| entry.clone())
            .ok_or_else(|| RushError::NotFound(channel.to_string()))?;
        audience.subscribe(tx.clone());
        if let Err(e) = self.registry.join(channel, player) {
            audience.unsubscribe(tx);
            return Err(e);
        }
        Ok(())
    }

    fn confirm(self: &Arc<Self>, channel: &str, player: &str) -> Result<(), RushError> {
        let driver = self.registry.confirm_start(channel, player)?;
        let Some(audience) = self.audiences.get(channel).map(|entry| entry.clone()) else {
            return Ok(());
        };

        let state = self.clone();
        let channel = channel.to_string();
        tokio::spawn(async move {
            if let Err(e) = driver.await {
                warn!(channel = %channel, error = %e, "Round driver panicked");
            }
            state
                .audiences
                .remove_if(&channel, |_, current| Arc::ptr_eq(current, &audience));
            debug!(channel = %channel, "Audience released");
        });
        Ok(())
    }

    fn answer(
        &self,
        channel: &str,
        player: &str,
        answer: &str,
        tx: &broadcast::Sender<ServerMessage>,
    ) -> Result<(), RushError> {
        if let Resolution::Rejected(reason) = self.registry.submit_answer(channel, player, answer)? {
            let _ = tx.send(ServerMessage::AnswerRejected { reason });
        }
        Ok(())
    }

    fn stop(&self, channel: &str, player: &str) -> Result<(), RushError> {
        let handle = self
            .registry
            .get(channel)
            .ok_or_else(|| RushError::NotFound(channel.to_string()))?;
        if handle.lock().host() != player {
            return Err(RushError::NotHost);
        }
        self.registry.stop(channel)
    }
}

impl ConnectionHandler for RushState {
    async fn handle_message(
        self: Arc<Self>,
        msg: ClientMessage,
        tx: broadcast::Sender<ServerMessage>,
        ctx: &mut ConnectionContext,
    ) {
        let result = match msg {
            ClientMessage::StartRush { channel, player } => {
                let result = self.start_rush(&channel, &player, &tx);
                if result.is_ok() {
                    ctx.channel = Some(channel);
                    ctx.player = Some(player);
                }
                result
            }
            ClientMessage::Join { channel, player } => {
                let result = self.join(&channel, &player, &tx);
                if result.is_ok() {
                    ctx.channel = Some(channel);
                    ctx.player = Some(player);
                }
                result
            }
            ClientMessage::Confirm => match ctx.seat() {
                Some((channel, player)) => self.confirm(channel, player),
                None => Err(RushError::NotAccepting),
            },
            ClientMessage::Answer { answer } => match ctx.seat() {
                Some((channel, player)) => self.answer(channel, player, &answer, &tx),
                None => Err(RushError::NotAccepting),
            },
            ClientMessage::Stop => match ctx.seat() {
                Some((channel, player)) => self.stop(channel, player),
                None => Err(RushError::NotAccepting),
            },
        };

        if let Err(e) = result {
            debug!(error = %e, "Command refused");
            let _ = tx.send(ServerMessage::Error {
                message: e.to_string(),
            });
        }
    }

    fn handle_disconnect(&self, ctx: &ConnectionContext, tx: &broadcast::Sender<ServerMessage>) {
        let Some((channel, player)) = ctx.seat() else {
            return;
        };
        let Some(audience) = self.audiences.get(channel) else {
            info!(channel, player, "Player disconnected");
            return;
        };
        audience.unsubscribe(tx);
        info!(channel, player, listeners = audience.len(), "Player disconnected");
        if audience.is_empty() {
            debug!(channel, "No connections left on channel");
        }
    }

    fn name(&self) -> &'static str {
        "rush"
    }
}
