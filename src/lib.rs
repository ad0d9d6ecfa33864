pub mod config;
pub mod error;
pub mod mail;
pub mod message;
pub mod transport;

pub use config::Config;
pub use error::{MailError, Result};
pub use mail::{Mail, Mailer};
pub use message::{Message, Part};
pub use transport::{Delivery, PostmarkTransport, Transport};
