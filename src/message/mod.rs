pub mod address;
pub mod part;

pub use address::Mailboxes;
pub use part::{Disposition, Header, Part};

use serde_json::{json, Value};

use crate::error::{MailError, Result};

pub const TEXT_PLAIN: &str = "text/plain";
pub const TEXT_HTML: &str = "text/html";

/// In-memory mail message handed to a transport
#[derive(Debug, Clone)]
pub struct Message {
    subject: String,
    body: String,
    content_type: String,
    charset: String,
    from: Mailboxes,
    to: Mailboxes,
    cc: Mailboxes,
    bcc: Mailboxes,
    reply_to: Mailboxes,
    headers: Vec<Header>,
    children: Vec<Part>,
}

impl Default for Message {
    fn default() -> Self {
        Self {
            subject: String::new(),
            body: String::new(),
            content_type: TEXT_PLAIN.to_string(),
            charset: "utf-8".to_string(),
            from: Mailboxes::new(),
            to: Mailboxes::new(),
            cc: Mailboxes::new(),
            bcc: Mailboxes::new(),
            reply_to: Mailboxes::new(),
            headers: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl Message {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Default::default()
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Replace the primary body; content type and charset are kept unless given.
    pub fn set_body(
        &mut self,
        body: impl Into<String>,
        content_type: Option<&str>,
        charset: Option<&str>,
    ) -> &mut Self {
        self.body = body.into();
        if let Some(content_type) = content_type {
            self.content_type = content_type.to_string();
        }
        if let Some(charset) = charset {
            self.charset = charset.to_string();
        }
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) -> &mut Self {
        self.content_type = content_type.into();
        self
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn set_charset(&mut self, charset: impl Into<String>) -> &mut Self {
        self.charset = charset.into();
        self
    }

    pub fn from(&self) -> &Mailboxes {
        &self.from
    }

    pub fn from_mut(&mut self) -> &mut Mailboxes {
        &mut self.from
    }

    pub fn set_from(&mut self, email: impl Into<String>, name: Option<&str>) -> &mut Self {
        self.from.clear();
        self.from.add(email, name);
        self
    }

    pub fn to(&self) -> &Mailboxes {
        &self.to
    }

    pub fn to_mut(&mut self) -> &mut Mailboxes {
        &mut self.to
    }

    pub fn add_to(&mut self, email: impl Into<String>) -> &mut Self {
        self.to.add(email, None);
        self
    }

    pub fn cc(&self) -> &Mailboxes {
        &self.cc
    }

    pub fn cc_mut(&mut self) -> &mut Mailboxes {
        &mut self.cc
    }

    pub fn add_cc(&mut self, email: impl Into<String>) -> &mut Self {
        self.cc.add(email, None);
        self
    }

    pub fn bcc(&self) -> &Mailboxes {
        &self.bcc
    }

    pub fn bcc_mut(&mut self) -> &mut Mailboxes {
        &mut self.bcc
    }

    pub fn add_bcc(&mut self, email: impl Into<String>) -> &mut Self {
        self.bcc.add(email, None);
        self
    }

    pub fn reply_to(&self) -> &Mailboxes {
        &self.reply_to
    }

    pub fn reply_to_mut(&mut self) -> &mut Mailboxes {
        &mut self.reply_to
    }

    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push(Header::new(name, value));
        self
    }

    pub fn children(&self) -> &[Part] {
        &self.children
    }

    /// Add alternative content, e.g. an html version of a text body.
    pub fn add_part(&mut self, body: impl Into<Vec<u8>>, content_type: &str) -> &mut Self {
        self.children.push(Part::inline(body, content_type));
        self
    }

    pub fn attach(&mut self, part: Part) -> &mut Self {
        self.children.push(part);
        self
    }

    /// Read a property by name (`subject`, `contentType`, `reply_to`, ...).
    pub fn get(&self, name: &str) -> Result<Value> {
        let value = match member_key(name).as_str() {
            "subject" => Value::String(self.subject.clone()),
            "body" => Value::String(self.body.clone()),
            "contenttype" => Value::String(self.content_type.clone()),
            "charset" => Value::String(self.charset.clone()),
            "from" => serde_json::to_value(&self.from)?,
            "to" => serde_json::to_value(&self.to)?,
            "cc" => serde_json::to_value(&self.cc)?,
            "bcc" => serde_json::to_value(&self.bcc)?,
            "replyto" => serde_json::to_value(&self.reply_to)?,
            _ => return Err(MailError::UnknownMember(name.to_string())),
        };
        Ok(value)
    }

    /// Write a property by name; see [`Message::get`] for the known names.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match member_key(name).as_str() {
            "subject" => self.subject = expect_string(name, value)?,
            "body" => self.body = expect_string(name, value)?,
            "contenttype" => self.content_type = expect_string(name, value)?,
            "charset" => self.charset = expect_string(name, value)?,
            "from" => self.from = Mailboxes::from_value(name, value)?,
            "to" => self.to = Mailboxes::from_value(name, value)?,
            "cc" => self.cc = Mailboxes::from_value(name, value)?,
            "bcc" => self.bcc = Mailboxes::from_value(name, value)?,
            "replyto" => self.reply_to = Mailboxes::from_value(name, value)?,
            _ => return Err(MailError::UnknownMember(name.to_string())),
        }
        Ok(())
    }

    /// Read-only view of the message handed to templates as `mail`.
    pub fn snapshot(&self) -> Value {
        json!({
            "subject": self.subject,
            "content_type": self.content_type,
            "charset": self.charset,
            "from": self.from,
            "to": self.to,
            "cc": self.cc,
            "bcc": self.bcc,
            "reply_to": self.reply_to,
        })
    }
}

/// `contentType`, `content_type` and `ContentType` all name the same member.
pub(crate) fn member_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn expect_string(member: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(MailError::InvalidValue {
            member: member.to_string(),
            reason: "expected a string".to_string(),
        }),
    }
}
