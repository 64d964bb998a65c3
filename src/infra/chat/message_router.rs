use crate::core::chat::IncomingMessage;
use dashmap::DashMap;
use tokio::sync::mpsc;

/// Fans gateway message events out to whichever collector is listening on
/// the message's channel. One listener per channel.
#[derive(Default)]
pub struct MessageRouter {
    subscriptions: DashMap<u64, mpsc::UnboundedSender<IncomingMessage>>,
}

impl MessageRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, channel_id: u64) -> mpsc::UnboundedReceiver<IncomingMessage> {
        // Sweep listeners whose collector went away without unsubscribing.
        self.subscriptions.retain(|_, tx| !tx.is_closed());

        let (tx, rx) = mpsc::unbounded_channel();
        if self.subscriptions.insert(channel_id, tx).is_some() {
            tracing::debug!(channel_id, "Replaced existing message subscription");
        }
        rx
    }

    /// Deliver `message` to its channel's listener. Returns whether anyone
    /// received it.
    pub fn route(&self, message: IncomingMessage) -> bool {
        let channel_id = message.channel_id;
        let delivered = match self.subscriptions.get(&channel_id) {
            Some(tx) => tx.send(message).is_ok(),
            None => return false,
        };

        if !delivered {
            // Receiver is gone; the collector finished.
            self.subscriptions
                .remove_if(&channel_id, |_, tx| tx.is_closed());
        }
        delivered
    }

    pub fn unsubscribe(&self, channel_id: u64) {
        self.subscriptions
            .remove_if(&channel_id, |_, tx| tx.is_closed());
    }
}
