use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport is not started")]
    NotStarted,

    #[error("{message}")]
    Unprocessable { code: i64, message: String },

    #[error("Error while mailing. Postmark returned HTTP code {} with message \"{body}\"", status.as_u16())]
    Provider { status: StatusCode, body: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("View variables given but no view is set")]
    MissingView,

    #[error("Property \"{0}\" is not defined")]
    UnknownMember(String),

    #[error("Invalid value for \"{member}\": {reason}")]
    InvalidValue { member: String, reason: String },
}

impl MailError {
    /// Provider error code (422) or HTTP status (other failures), if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            MailError::Unprocessable { code, .. } => Some(*code),
            MailError::Provider { status, .. } => Some(i64::from(status.as_u16())),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MailError>;
