use crate::game::core::messages::ServerMessage;
use tokio::sync::{broadcast, mpsc};

/// Receives rush events for rendering. Delivery is best effort.
pub trait Presenter: Send + Sync + 'static {
    fn publish(&self, event: ServerMessage);
}

impl Presenter for broadcast::Sender<ServerMessage> {
    fn publish(&self, event: ServerMessage) {
        let _ = self.send(event);
    }
}

impl Presenter for mpsc::UnboundedSender<ServerMessage> {
    fn publish(&self, event: ServerMessage) {
        let _ = self.send(event);
    }
}

/// Drops everything
pub struct Silent;

impl Presenter for Silent {
    fn publish(&self, _event: ServerMessage) {}
}
