use std::env;
use std::path::PathBuf;

pub const POSTMARK_ENDPOINT: &str = "https://api.postmarkapp.com/email";

#[derive(Debug, Clone)]
pub struct Config {
    pub postmark: PostmarkSettings,
    pub views: ViewSettings,
    pub mail_from: Option<String>,
}

/// Postmark transport settings
#[derive(Debug, Clone)]
pub struct PostmarkSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
}

impl Default for PostmarkSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: POSTMARK_ENDPOINT.to_string(),
        }
    }
}

/// Where mail views and layouts live
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub view_path: PathBuf,
    pub layout: Option<String>,
    pub layout_path: PathBuf,
    pub extension: String,
}

impl ViewSettings {
    pub fn new(view_path: impl Into<PathBuf>) -> Self {
        let view_path = view_path.into();
        Self {
            layout_path: view_path.join("layouts"),
            view_path,
            layout: None,
            extension: "html".to_string(),
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = Some(layout.into());
        self
    }
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self::new("views/mail")
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let view_path =
            PathBuf::from(env::var("MAIL_VIEW_PATH").unwrap_or_else(|_| "views/mail".to_string()));
        let extension = env::var("MAIL_VIEW_EXTENSION").unwrap_or_else(|_| "html".to_string());
        let extension = extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(ConfigError::EmptyViewExtension);
        }

        Ok(Config {
            postmark: PostmarkSettings {
                api_key: env::var("POSTMARK_API_KEY").ok().filter(|key| !key.is_empty()),
                endpoint: env::var("POSTMARK_ENDPOINT")
                    .unwrap_or_else(|_| POSTMARK_ENDPOINT.to_string()),
            },
            views: ViewSettings {
                layout_path: env::var("MAIL_LAYOUT_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| view_path.join("layouts")),
                view_path,
                layout: env::var("MAIL_LAYOUT").ok().filter(|layout| !layout.is_empty()),
                extension,
            },
            mail_from: env::var("MAIL_FROM").ok().filter(|from| !from.is_empty()),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MAIL_VIEW_EXTENSION must not be empty")]
    EmptyViewExtension,
}
