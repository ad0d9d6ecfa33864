use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MailError, Result};

/// Ordered mapping of address to optional display name.
///
/// Adding an address that is already present replaces its display name but
/// keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mailboxes(IndexMap<String, Option<String>>);

impl Mailboxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, email: impl Into<String>, name: Option<&str>) -> &mut Self {
        self.0.insert(email.into(), name.map(str::to_string));
        self
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, email: &str) -> bool {
        self.0.contains_key(email)
    }

    pub fn name(&self, email: &str) -> Option<&str> {
        self.0.get(email).and_then(|name| name.as_deref())
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0
            .iter()
            .map(|(email, name)| (email.as_str(), name.as_deref()))
    }

    /// Bare addresses joined by a single space.
    pub fn join(&self) -> String {
        self.addresses().collect::<Vec<_>>().join(" ")
    }

    /// Accepts `"a@b.c"`, `["a@b.c", ...]` or `{"a@b.c": "Name" | null, ...}`.
    pub fn from_value(member: &str, value: Value) -> Result<Self> {
        let invalid = |reason: &str| MailError::InvalidValue {
            member: member.to_string(),
            reason: reason.to_string(),
        };

        let mut mailboxes = Mailboxes::new();
        match value {
            Value::Null => {}
            Value::String(email) => {
                mailboxes.add(email, None);
            }
            Value::Array(items) => {
                for item in items {
                    match item {
                        Value::String(email) => {
                            mailboxes.add(email, None);
                        }
                        _ => return Err(invalid("list entries must be addresses")),
                    }
                }
            }
            Value::Object(entries) => {
                for (email, name) in entries {
                    match name {
                        Value::Null => mailboxes.add(email, None),
                        Value::String(name) => mailboxes.add(email, Some(&name)),
                        _ => return Err(invalid("display names must be strings or null")),
                    };
                }
            }
            _ => return Err(invalid("expected an address, a list or a mapping")),
        }

        Ok(mailboxes)
    }
}

impl<S: Into<String>> FromIterator<S> for Mailboxes {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut mailboxes = Mailboxes::new();
        for email in iter {
            mailboxes.add(email, None);
        }
        mailboxes
    }
}

impl From<&str> for Mailboxes {
    fn from(email: &str) -> Self {
        std::iter::once(email).collect()
    }
}

/// Split `Name <address>` into its parts; a bare address has no name.
pub fn parse_mailbox(mailbox: &str) -> (String, Option<String>) {
    let mailbox = mailbox.trim();
    match (mailbox.rfind('<'), mailbox.ends_with('>')) {
        (Some(open), true) => {
            let email = mailbox[open + 1..mailbox.len() - 1].trim().to_string();
            let name = mailbox[..open].trim().trim_matches('"').trim();
            (email, (!name.is_empty()).then(|| name.to_string()))
        }
        _ => (mailbox.to_string(), None),
    }
}
