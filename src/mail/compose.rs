use std::ops::{Deref, DerefMut};

use serde_json::Value;
use tera::Context;

use super::view::Views;
use crate::error::{MailError, Result};
use crate::message::{member_key, Message};

/// What `Mail::set_body` receives: body text, or the full variable set for the view
#[derive(Debug, Clone)]
pub enum Content {
    Text(String),
    Vars(Context),
}

impl Content {
    fn into_context(self) -> Context {
        match self {
            Content::Text(body) => {
                let mut context = Context::new();
                context.insert("body", &body);
                context
            }
            Content::Vars(context) => context,
        }
    }
}

impl From<&str> for Content {
    fn from(body: &str) -> Self {
        Content::Text(body.to_string())
    }
}

impl From<String> for Content {
    fn from(body: String) -> Self {
        Content::Text(body)
    }
}

impl From<Context> for Content {
    fn from(vars: Context) -> Self {
        Content::Vars(vars)
    }
}

/// A message whose body can be rendered from a view.
///
/// Derefs to the wrapped [`Message`], so every message accessor is available
/// directly on the `Mail`.
#[derive(Debug, Clone)]
pub struct Mail {
    message: Message,
    view: Option<String>,
    views: Views,
}

impl Mail {
    pub fn new(views: Views) -> Self {
        Self::from_message(Message::default(), views)
    }

    pub fn from_message(message: Message, views: Views) -> Self {
        Self {
            message,
            view: None,
            views,
        }
    }

    pub fn view(&self) -> Option<&str> {
        self.view.as_deref()
    }

    pub fn set_view(&mut self, view: impl Into<String>) -> &mut Self {
        self.view = Some(view.into());
        self
    }

    pub fn clear_view(&mut self) -> &mut Self {
        self.view = None;
        self
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn into_message(self) -> Message {
        self.message
    }

    /// Set the body, rendering it through the view (and layout) when a view is set.
    ///
    /// Without a view, text goes to the message unchanged. With one, text is
    /// exposed to the template as `body` and a variable set is used as-is;
    /// either way the template also sees the message as `mail` and can write
    /// back to it with `set_mail(member=..., value=...)`.
    pub fn set_body(
        &mut self,
        content: impl Into<Content>,
        content_type: Option<&str>,
        charset: Option<&str>,
    ) -> Result<&mut Self> {
        let content = content.into();

        let Some(view) = self.view.as_deref() else {
            return match content {
                Content::Text(body) => {
                    self.message.set_body(body, content_type, charset);
                    Ok(self)
                }
                Content::Vars(_) => Err(MailError::MissingView),
            };
        };

        let body = self
            .views
            .render(view, content.into_context(), &mut self.message)?;
        tracing::trace!(body = %body, "Mail body");

        self.message.set_body(body, content_type, charset);
        Ok(self)
    }

    /// Read a property by name: the mail's own (`view`) first, then the message's.
    pub fn get(&self, name: &str) -> Result<Value> {
        match member_key(name).as_str() {
            "view" => Ok(self.view.clone().map(Value::String).unwrap_or(Value::Null)),
            _ => self.message.get(name),
        }
    }

    /// Write a property by name; `body` goes through [`Mail::set_body`].
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match (member_key(name).as_str(), value) {
            ("view", Value::Null) => {
                self.view = None;
            }
            ("view", Value::String(view)) => {
                self.view = Some(view);
            }
            ("view", _) => {
                return Err(MailError::InvalidValue {
                    member: name.to_string(),
                    reason: "expected a view name or null".to_string(),
                })
            }
            ("body", Value::String(body)) => {
                self.set_body(body, None, None)?;
            }
            ("body", Value::Object(vars)) => {
                let vars = Context::from_value(Value::Object(vars))?;
                self.set_body(vars, None, None)?;
            }
            (_, value) => self.message.set(name, value)?,
        }
        Ok(())
    }
}

impl Deref for Mail {
    type Target = Message;

    fn deref(&self) -> &Message {
        &self.message
    }
}

impl DerefMut for Mail {
    fn deref_mut(&mut self) -> &mut Message {
        &mut self.message
    }
}
