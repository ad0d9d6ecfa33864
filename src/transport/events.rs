//! Before-send hook for transport plugins.

use crate::message::Message;

/// What a listener wants the transport to do next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Cancel,
}

/// Raised before a message leaves the process
#[derive(Debug, Clone, Copy)]
pub struct SendEvent<'a> {
    transport: &'static str,
    message: &'a Message,
}

impl<'a> SendEvent<'a> {
    pub fn new(transport: &'static str, message: &'a Message) -> Self {
        Self { transport, message }
    }

    pub fn transport(&self) -> &'static str {
        self.transport
    }

    pub fn message(&self) -> &'a Message {
        self.message
    }
}

pub trait SendListener: Send + Sync {
    fn before_send_performed(&self, event: &SendEvent<'_>) -> Flow;
}

impl<F> SendListener for F
where
    F: Fn(&SendEvent<'_>) -> Flow + Send + Sync,
{
    fn before_send_performed(&self, event: &SendEvent<'_>) -> Flow {
        self(event)
    }
}

/// Box a closure as a listener
pub fn from_fn<F>(f: F) -> Box<dyn SendListener>
where
    F: Fn(&SendEvent<'_>) -> Flow + Send + Sync + 'static,
{
    Box::new(f)
}

/// Listeners in registration order
#[derive(Default)]
pub struct EventDispatcher {
    listeners: Vec<Box<dyn SendListener>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, listener: Box<dyn SendListener>) {
        self.listeners.push(listener);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Stops at the first listener that cancels.
    pub fn dispatch_before_send(&self, event: &SendEvent<'_>) -> Flow {
        for (index, listener) in self.listeners.iter().enumerate() {
            if listener.before_send_performed(event) == Flow::Cancel {
                tracing::debug!(
                    transport = event.transport(),
                    listener = index,
                    subject = %event.message().subject(),
                    "Send cancelled by listener"
                );
                return Flow::Cancel;
            }
        }
        Flow::Continue
    }
}
