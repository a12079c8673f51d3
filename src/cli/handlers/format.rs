//! Handler for the `format` command.

use std::path::Path;

use anyhow::Result;

use crate::cli::{FormatArgs, SourceLang};
use crate::export::{format_markup, format_styles};
use crate::infra::read_text;

/// Guesses the language from the file extension: `.css` is styles,
/// anything else is markup.
pub fn infer_lang(path: &Path) -> SourceLang {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("css") => SourceLang::Styles,
        _ => SourceLang::Markup,
    }
}

pub fn format_source(text: &str, lang: SourceLang) -> String {
    match lang {
        SourceLang::Markup => format_markup(text),
        SourceLang::Styles => format_styles(text),
    }
}

/// Handle the `format` command.
pub fn handle_format(args: &FormatArgs) -> Result<()> {
    let text = read_text(&args.file)?;
    let lang = args.lang.unwrap_or_else(|| infer_lang(&args.file));
    tracing::debug!(file = %args.file.display(), ?lang, "formatting");

    println!("{}", format_source(&text, lang));
    Ok(())
}
