use std::fmt;
use std::path::Path;

use uuid::Uuid;

use crate::error::Result;

/// Single header line kept in insertion order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// How a child part is presented to the recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Alternative content (e.g. an html version of a text mail)
    Inline,
    /// File attachment
    Attachment { filename: String },
}

/// Child body part of a message
#[derive(Debug, Clone)]
pub struct Part {
    id: String,
    content_type: String,
    body: Vec<u8>,
    disposition: Disposition,
}

impl Part {
    pub fn inline(body: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self {
            id: generate_id(),
            content_type: content_type.into(),
            body: body.into(),
            disposition: Disposition::Inline,
        }
    }

    pub fn attachment(
        filename: impl Into<String>,
        data: impl Into<Vec<u8>>,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_id(),
            content_type: content_type.into(),
            body: data.into(),
            disposition: Disposition::Attachment {
                filename: filename.into(),
            },
        }
    }

    /// Load an attachment from disk, guessing its content type from the extension.
    pub fn attachment_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        Ok(Self::attachment(filename, data, content_type))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn disposition(&self) -> &Disposition {
        &self.disposition
    }

    pub fn filename(&self) -> Option<&str> {
        match &self.disposition {
            Disposition::Attachment { filename } => Some(filename),
            Disposition::Inline => None,
        }
    }

    pub fn is_attachment(&self) -> bool {
        matches!(self.disposition, Disposition::Attachment { .. })
    }
}

fn generate_id() -> String {
    format!("{}@postmail.generated", Uuid::new_v4().simple())
}
