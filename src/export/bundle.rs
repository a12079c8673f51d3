//! Bundle assembly and HTML document shells.

use std::path::Path;

use minijinja::{Environment, Value, context};
use thiserror::Error;

use crate::domain::{AssetMap, Bundle, STYLESHEET_NAME};

/// Reset rules shipped when the document has no styles of its own.
pub const BOILERPLATE_STYLESHEET: &str = "* { margin: 0; padding: 0; box-sizing: border-box; }\n\
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; }";

const FAVICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 32 32"><path d="M16 2L28 8V24L16 30L4 24V8L16 2Z" fill="#667eea" stroke="#764ba2" stroke-width="1"/><path d="M11 16L16 11L21 16L16 21L11 16Z" fill="white" fill-opacity="0.9"/></svg>"##;

/// Default document shell.
///
/// Receives `title`, `lang`, `favicon`, `stylesheet_href`, `styles` and
/// `body`. When `styles` is set the rules are embedded, otherwise the
/// stylesheet file is linked.
pub const DEFAULT_SHELL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{{ title }}</title>
    <link rel="icon" type="image/svg+xml" href="{{ favicon|safe }}">
{%- if styles %}
    <style>
{{ styles|safe }}
    </style>
{%- else %}
    <link rel="stylesheet" href="{{ stylesheet_href }}">
{%- endif %}
</head>
<body>
{{ body|safe }}
</body>
</html>
"##;

/// Errors rendering a document shell.
#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("failed to read template {path}: {source}")]
    TemplateFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Returns the generated favicon as an inline `data:` reference.
pub fn favicon_data_url() -> String {
    format!("data:image/svg+xml,{}", urlencoding::encode(FAVICON_SVG))
}

/// Renders `template` as an HTML template with autoescaping.
pub(crate) fn render_template(template: &str, ctx: Value) -> Result<String, AssembleError> {
    let mut env = Environment::new();
    env.add_template("index.html", template)?;
    let tmpl = env.get_template("index.html")?;
    Ok(tmpl.render(ctx)?)
}

/// Title, language and template of the generated root document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentShell {
    title: String,
    lang: String,
    template: Option<String>,
}

impl Default for DocumentShell {
    fn default() -> Self {
        Self {
            title: "Site".to_string(),
            lang: "en".to_string(),
            template: None,
        }
    }
}

impl DocumentShell {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    /// Loads a custom template from disk.
    pub fn with_template_file(self, path: &Path) -> Result<Self, AssembleError> {
        let template =
            std::fs::read_to_string(path).map_err(|source| AssembleError::TemplateFile {
                path: path.display().to_string(),
                source,
            })?;
        Ok(self.with_template(template))
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(DEFAULT_SHELL_TEMPLATE)
    }

    /// Wraps `body` in a shell that links the stylesheet file.
    pub fn render_linked(&self, body: &str) -> Result<String, AssembleError> {
        render_template(
            self.template(),
            context! {
                title => self.title,
                lang => self.lang,
                favicon => favicon_data_url(),
                stylesheet_href => STYLESHEET_NAME,
                styles => Value::from(()),
                body => body,
            },
        )
    }

    /// Wraps `body` in a shell that embeds `styles` in a `<style>` element.
    pub fn render_embedded(&self, body: &str, styles: &str) -> Result<String, AssembleError> {
        render_template(
            self.template(),
            context! {
                title => self.title,
                lang => self.lang,
                favicon => favicon_data_url(),
                stylesheet_href => STYLESHEET_NAME,
                styles => styles,
                body => body,
            },
        )
    }
}

fn stylesheet_or_boilerplate(styles: &str) -> String {
    if styles.trim().is_empty() {
        BOILERPLATE_STYLESHEET.to_string()
    } else {
        styles.to_string()
    }
}

/// Combines markup, styles and extracted assets into a [`Bundle`] using the
/// default shell.
pub fn assemble(markup: &str, styles: &str, assets: AssetMap) -> Result<Bundle, AssembleError> {
    assemble_with(&DocumentShell::default(), markup, styles, assets)
}

/// Combines markup, styles and extracted assets into a [`Bundle`].
///
/// Blank styles are replaced by [`BOILERPLATE_STYLESHEET`]. The markup is
/// placed in the body verbatim.
pub fn assemble_with(
    shell: &DocumentShell,
    markup: &str,
    styles: &str,
    assets: AssetMap,
) -> Result<Bundle, AssembleError> {
    let root_document = shell.render_linked(markup)?;
    let stylesheet = stylesheet_or_boilerplate(styles);
    tracing::debug!(
        document_bytes = root_document.len(),
        stylesheet_bytes = stylesheet.len(),
        assets = assets.len(),
        "assembled bundle"
    );
    Ok(Bundle::new(root_document, stylesheet, assets))
}

/// Renders one self-contained document with the stylesheet embedded.
pub fn assemble_single_file(
    shell: &DocumentShell,
    markup: &str,
    styles: &str,
) -> Result<String, AssembleError> {
    shell.render_embedded(markup, &stylesheet_or_boilerplate(styles))
}
