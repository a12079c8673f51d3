//! Canonically formatted source pair for local download.

use minijinja::context;

use super::bundle::{AssembleError, DocumentShell, render_template};
use super::format::{format_markup, format_styles};
use crate::domain::{DocumentSource, STYLESHEET_NAME};

const PREVIEW_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="{{ lang }}">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="{{ stylesheet_href }}">
</head>
<body>
{{ body|safe }}
</body>
</html>
"#;

/// A readable `index.html` and `styles.css` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePair {
    pub document: String,
    pub stylesheet: String,
}

fn indent_lines(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats both texts and wraps the markup in a minimal page.
///
/// The stylesheet is formatted but never replaced by boilerplate; what the
/// user wrote is what they get back.
pub fn render_preview(
    source: &DocumentSource,
    shell: &DocumentShell,
) -> Result<SourcePair, AssembleError> {
    let body = indent_lines(&format_markup(source.markup()), "  ");
    let document = render_template(
        PREVIEW_TEMPLATE,
        context! {
            title => shell.title(),
            lang => shell.lang(),
            stylesheet_href => STYLESHEET_NAME,
            body => body,
        },
    )?;

    Ok(SourcePair {
        document,
        stylesheet: format_styles(source.styles()),
    })
}
