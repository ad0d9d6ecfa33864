//! Postmark wire types and the message → JSON encoder.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::{Mailboxes, Message, Part, TEXT_HTML, TEXT_PLAIN};

/// Turns a message into the request body a transport posts
pub trait MessageEncoder: Send + Sync {
    fn encode(&self, message: &Message) -> Result<String>;
}

/// Encodes messages as Postmark `/email` JSON
#[derive(Debug, Clone, Copy, Default)]
pub struct PostmarkEncoder;

impl MessageEncoder for PostmarkEncoder {
    fn encode(&self, message: &Message) -> Result<String> {
        Ok(serde_json::to_string(&Payload::from(message))?)
    }
}

/// Body of `POST /email`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Payload {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    pub subject: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub headers: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_body: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attachment {
    pub name: String,
    pub content: String,
    pub content_type: String,
}

impl From<&Part> for Attachment {
    fn from(part: &Part) -> Self {
        match part.filename() {
            Some(filename) => Self {
                name: filename.to_string(),
                content: STANDARD.encode(part.body()),
                content_type: part.content_type().to_string(),
            },
            None => Self {
                name: part.id().to_string(),
                content: String::from_utf8_lossy(part.body()).into_owned(),
                content_type: part.content_type().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyType {
    Text,
    Html,
}

impl From<&Message> for Payload {
    fn from(message: &Message) -> Self {
        let mut payload = Payload {
            from: message.from().join(),
            to: message.to().join(),
            cc: joined(message.cc()),
            bcc: joined(message.bcc()),
            subject: message.subject().to_string(),
            reply_to: joined(message.reply_to()),
            headers: message.headers().iter().map(ToString::to_string).collect(),
            html_body: None,
            text_body: None,
            attachments: Vec::new(),
        };

        let body_type = if is_type(message.content_type(), TEXT_HTML) {
            payload.html_body = Some(message.body().to_string());
            BodyType::Html
        } else {
            payload.text_body = Some(message.body().to_string());
            BodyType::Text
        };

        for part in message.children() {
            let content_type = part.content_type();
            if body_type == BodyType::Text && is_type(content_type, TEXT_HTML) {
                payload.html_body = Some(String::from_utf8_lossy(part.body()).into_owned());
            } else if body_type == BodyType::Html && is_type(content_type, TEXT_PLAIN) {
                payload.text_body = Some(String::from_utf8_lossy(part.body()).into_owned());
            } else {
                payload.attachments.push(Attachment::from(part));
            }
        }

        payload
    }
}

fn joined(mailboxes: &Mailboxes) -> Option<String> {
    (!mailboxes.is_empty()).then(|| mailboxes.join())
}

/// Compares the media type only: `text/html; charset=utf-8` is `text/html`.
fn is_type(content_type: &str, expected: &str) -> bool {
    content_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| essence.eq_ignore_ascii_case(expected))
}

/// Successful `/email` response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Receipt {
    #[serde(rename = "MessageID")]
    pub message_id: String,
    #[serde(rename = "To", default)]
    pub to: Option<String>,
    #[serde(rename = "SubmittedAt", default)]
    pub submitted_at: Option<String>,
}

impl Receipt {
    pub fn submitted_at(&self) -> Option<DateTime<FixedOffset>> {
        self.submitted_at
            .as_deref()
            .and_then(|at| DateTime::parse_from_rfc3339(at).ok())
    }
}

/// 422 response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    pub error_code: i64,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn base_message() -> Message {
        let mut message = Message::new("Quarterly report");
        message.set_from("reports@example.com", Some("Reports"));
        message.add_to("jane@example.com").add_to("john@example.com");
        message
    }

    #[test]
    fn test_html_primary_without_parts() {
        let mut message = base_message();
        message.set_body("<h1>Hi</h1>", Some("text/html"), None);

        let payload = Payload::from(&message);

        assert_eq!(payload.html_body.as_deref(), Some("<h1>Hi</h1>"));
        assert_eq!(payload.text_body, None);
        assert!(payload.attachments.is_empty());
    }

    #[test]
    fn test_text_primary_with_html_alternative() {
        let mut message = base_message();
        message.set_body("Hi", None, None);
        message.add_part("<p>Hi</p>", "text/html");

        let payload = Payload::from(&message);

        assert_eq!(payload.text_body.as_deref(), Some("Hi"));
        assert_eq!(payload.html_body.as_deref(), Some("<p>Hi</p>"));
        assert!(payload.attachments.is_empty());
    }

    #[test]
    fn test_html_primary_with_text_alternative() {
        let mut message = base_message();
        message.set_body("<p>Hi</p>", Some("text/html; charset=utf-8"), None);
        message.add_part("Hi", "text/plain");

        let payload = Payload::from(&message);

        assert_eq!(payload.html_body.as_deref(), Some("<p>Hi</p>"));
        assert_eq!(payload.text_body.as_deref(), Some("Hi"));
    }

    #[test]
    fn test_pdf_goes_to_attachments() {
        let mut message = base_message();
        message.set_body("See attached", None, None);
        message.attach(Part::attachment("report.pdf", b"%PDF".to_vec(), "application/pdf"));

        let payload = Payload::from(&message);

        assert_eq!(payload.text_body.as_deref(), Some("See attached"));
        assert_eq!(payload.html_body, None);
        assert_eq!(
            payload.attachments,
            vec![Attachment {
                name: "report.pdf".to_string(),
                content: "JVBERg==".to_string(),
                content_type: "application/pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_same_type_inline_part_is_sent_raw_under_its_id() {
        let mut message = base_message();
        message.set_body("Hi", None, None);
        message.add_part("Also hi", "text/plain");

        let payload = Payload::from(&message);
        let part_id = message.children()[0].id();

        assert_eq!(payload.attachments.len(), 1);
        assert_eq!(payload.attachments[0].name, part_id);
        assert_eq!(payload.attachments[0].content, "Also hi");
    }

    #[test]
    fn test_recipient_fields() {
        let mut message = base_message();
        message.add_cc("cc@example.com");
        message.add_bcc("bcc@example.com");
        message.add_header("X-Campaign", "q3");

        let value = serde_json::to_value(Payload::from(&message)).unwrap();

        assert_eq!(value["From"], json!("reports@example.com"));
        assert_eq!(value["To"], json!("jane@example.com john@example.com"));
        assert_eq!(value["Cc"], json!("cc@example.com"));
        assert_eq!(value["Bcc"], json!("bcc@example.com"));
        assert_eq!(value["Subject"], json!("Quarterly report"));
        assert_eq!(value["Headers"], json!(["X-Campaign: q3"]));
    }

    #[test]
    fn test_optional_fields_are_omitted() {
        let message = base_message();
        let value = serde_json::to_value(Payload::from(&message)).unwrap();

        assert!(value.get("Cc").is_none());
        assert!(value.get("Bcc").is_none());
        assert!(value.get("ReplyTo").is_none());
        assert!(value.get("HtmlBody").is_none());
        assert!(value.get("Attachments").is_none());
        assert_eq!(value["TextBody"], json!(""));
    }

    #[test]
    fn test_receipt_parses_submitted_at() {
        let receipt: Receipt = serde_json::from_str(
            r#"{"To":"jane@example.com","SubmittedAt":"2010-11-26T12:01:05.1794748-05:00","MessageID":"abc-123","ErrorCode":0,"Message":"OK"}"#,
        )
        .unwrap();

        assert_eq!(receipt.message_id, "abc-123");
        assert_eq!(receipt.to.as_deref(), Some("jane@example.com"));
        assert!(receipt.submitted_at().is_some());
    }
}
