//! Template rendering for mail bodies.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tera::{Context, Tera};

use crate::config::ViewSettings;
use crate::error::Result;
use crate::message::Message;

/// Renders one template file with a set of variables
pub trait ViewRenderer: Send + Sync {
    /// Writes the template asks for on the message go into `edits`.
    fn render(&self, template: &Path, context: &Context, edits: &MailEdits) -> Result<String>;
}

/// Message writes requested while rendering, applied once the template is done
#[derive(Debug, Clone, Default)]
pub struct MailEdits(Arc<Mutex<Vec<(String, Value)>>>);

impl MailEdits {
    pub fn record(&self, member: impl Into<String>, value: Value) {
        self.lock().push((member.into(), value));
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Apply the recorded writes in order through [`Message::set`] and clear them.
    pub fn apply(&self, message: &mut Message) -> Result<()> {
        let edits = std::mem::take(&mut *self.lock());
        for (member, value) in edits {
            tracing::debug!(member = %member, "View updated mail");
            message.set(&member, value)?;
        }
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(String, Value)>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `{{ set_mail(member="subject", value="Order shipped") }}` prints nothing.
fn set_mail(edits: MailEdits) -> impl tera::Function {
    move |args: &HashMap<String, Value>| -> tera::Result<Value> {
        let member = args
            .get("member")
            .and_then(Value::as_str)
            .ok_or_else(|| tera::Error::msg("set_mail needs a `member` string argument"))?;
        let value = args.get("value").cloned().unwrap_or(Value::Null);
        edits.record(member, value);
        Ok(Value::String(String::new()))
    }
}

/// Reads the template from disk and renders it with `tera`.
///
/// Nothing is escaped: a layout prints the rendered view with `{{ content }}`
/// and an HTML body passed to an HTML view stays HTML.
#[derive(Debug, Clone, Copy, Default)]
pub struct TeraRenderer;

impl ViewRenderer for TeraRenderer {
    fn render(&self, template: &Path, context: &Context, edits: &MailEdits) -> Result<String> {
        let source = std::fs::read_to_string(template)?;
        let name = template.to_string_lossy();

        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.register_function("set_mail", set_mail(edits.clone()));
        tera.add_raw_template(&name, &source)?;
        Ok(tera.render(&name, context)?)
    }
}

/// View settings plus the renderer that executes them
#[derive(Clone)]
pub struct Views {
    settings: ViewSettings,
    renderer: Arc<dyn ViewRenderer>,
}

impl fmt::Debug for Views {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Views")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Views {
    pub fn new(settings: ViewSettings) -> Self {
        Self::with_renderer(settings, Arc::new(TeraRenderer))
    }

    pub fn with_renderer(settings: ViewSettings, renderer: Arc<dyn ViewRenderer>) -> Self {
        Self { settings, renderer }
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn view_path(&self, view: &str) -> PathBuf {
        resolve(view, &self.settings.view_path, &self.settings.extension)
    }

    pub fn layout_path(&self) -> Option<PathBuf> {
        self.settings
            .layout
            .as_deref()
            .map(|layout| resolve(layout, &self.settings.layout_path, &self.settings.extension))
    }

    /// Render `view` with `vars` and `mail`, then wrap it in the layout if one is set.
    ///
    /// Writes made by the view land on `mail` before the layout renders, so
    /// the layout sees them.
    pub fn render(&self, view: &str, mut vars: Context, mail: &mut Message) -> Result<String> {
        let edits = MailEdits::default();
        vars.insert("mail", &mail.snapshot());

        let path = self.view_path(view);
        tracing::debug!(view = %path.display(), "Rendering mail view");
        let content = self.renderer.render(&path, &vars, &edits)?;
        edits.apply(mail)?;

        let Some(layout) = self.layout_path() else {
            return Ok(content);
        };

        let mut wrapper = Context::new();
        wrapper.insert("content", &content);
        wrapper.insert("mail", &mail.snapshot());
        tracing::debug!(layout = %layout.display(), "Rendering mail layout");
        let body = self.renderer.render(&layout, &wrapper, &edits)?;
        edits.apply(mail)?;
        Ok(body)
    }
}

/// Names with a separator are paths; bare names live under `base`. Either
/// way the extension is appended unless the name already ends with it.
fn resolve(name: &str, base: &Path, extension: &str) -> PathBuf {
    let suffix = format!(".{extension}");
    let file = if name.ends_with(&suffix) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    };

    if name.contains('/') || name.contains(MAIN_SEPARATOR) {
        PathBuf::from(file)
    } else {
        base.join(file)
    }
}
