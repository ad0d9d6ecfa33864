pub mod events;
pub mod payload;
pub mod postmark;

pub use events::{EventDispatcher, Flow, SendEvent, SendListener};
pub use payload::{MessageEncoder, Payload, PostmarkEncoder, Receipt};
pub use postmark::PostmarkTransport;

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// Outcome of a send that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// Accepted by the provider
    Sent(Receipt),
    /// A before-send listener vetoed the message; nothing went over the wire
    Cancelled,
}

impl Delivery {
    pub fn message_id(&self) -> Option<&str> {
        match self {
            Delivery::Sent(receipt) => Some(&receipt.message_id),
            Delivery::Cancelled => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Delivery::Cancelled)
    }
}

/// Delivers messages to an external service
///
/// A transport must be started before `send`; `send` takes `&mut self`, so a
/// single instance handles one message at a time.
#[async_trait]
pub trait Transport: Send {
    fn is_started(&self) -> bool;

    fn start(&mut self) -> Result<()>;

    fn stop(&mut self);

    async fn send(&mut self, message: &Message) -> Result<Delivery>;

    fn register_plugin(&mut self, listener: Box<dyn SendListener>);
}
