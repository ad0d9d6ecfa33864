pub mod compose;
pub mod view;

pub use compose::{Content, Mail};
pub use view::{MailEdits, TeraRenderer, ViewRenderer, Views};

use crate::config::Config;
use crate::error::Result;
use crate::message::{address, Message};
use crate::transport::{Delivery, PostmarkTransport, Transport};

/// Mailer: composes view-backed mails and hands them to a transport
pub struct Mailer<T = PostmarkTransport> {
    views: Views,
    default_from: Option<String>,
    transport: T,
}

impl Mailer<PostmarkTransport> {
    /// Create mailer from loaded config (POSTMARK_API_KEY, MAIL_VIEW_PATH, etc.)
    pub fn from_config(config: &Config) -> Self {
        Mailer::new(
            Views::new(config.views.clone()),
            PostmarkTransport::from_settings(&config.postmark),
        )
        .with_default_from(config.mail_from.clone())
    }
}

impl<T: Transport> Mailer<T> {
    pub fn new(views: Views, transport: T) -> Self {
        Self {
            views,
            default_from: None,
            transport,
        }
    }

    /// Sender used by [`Mailer::compose`]; accepts `Name <address>`.
    pub fn with_default_from(mut self, from: Option<String>) -> Self {
        self.default_from = from;
        self
    }

    pub fn views(&self) -> &Views {
        &self.views
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Start a new mail bound to this mailer's views
    pub fn compose(&self) -> Mail {
        let mut mail = Mail::new(self.views.clone());
        if let Some(from) = &self.default_from {
            let (email, name) = address::parse_mailbox(from);
            mail.set_from(email, name.as_deref());
        }
        mail
    }

    /// Send a message, starting the transport first if needed
    pub async fn send(&mut self, message: &Message) -> Result<Delivery> {
        if !self.transport.is_started() {
            self.transport.start()?;
        }
        self.transport.send(message).await
    }
}
