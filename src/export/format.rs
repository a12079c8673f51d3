//! Canonical formatting of markup and stylesheet text.
//!
//! Both formatters are single left-to-right scans over the input. They are
//! not parsers: unbalanced or malformed input is formatted on a best-effort
//! basis and never produces an error. Both are idempotent.

use std::sync::LazyLock;

use regex::Regex;

/// Spaces per nesting level.
const INDENT_WIDTH: usize = 2;

/// Elements that never carry children and are never explicitly closed.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

static INTER_TAG_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+<").expect("inter-tag whitespace pattern is valid"));

/// How a single tag token affects nesting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Opening,
    Closing,
    /// Void elements, self-closing tags, comments, doctypes and processing
    /// instructions.
    Standalone,
}

fn classify_tag(token: &str) -> TagKind {
    if token.starts_with("</") {
        return TagKind::Closing;
    }
    if token.starts_with("<!") || token.starts_with("<?") || token.ends_with("/>") {
        return TagKind::Standalone;
    }

    let name: String = token
        .trim_start_matches('<')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if VOID_ELEMENTS
        .iter()
        .any(|void| void.eq_ignore_ascii_case(&name))
    {
        TagKind::Standalone
    } else {
        TagKind::Opening
    }
}

fn push_line(lines: &mut Vec<String>, depth: usize, text: &str) {
    lines.push(format!("{}{}", " ".repeat(depth * INDENT_WIDTH), text));
}

/// Reformats markup so that every tag and every text run sits on its own
/// line, indented two spaces per nesting level.
///
/// Blank input is returned unchanged. Extra closing tags never push the
/// indentation below zero.
///
/// # Example
///
/// ```
/// use pageship::export::format_markup;
///
/// let formatted = format_markup("<div><p>Hi</p></div>");
/// assert_eq!(formatted, "<div>\n  <p>\n    Hi\n  </p>\n</div>");
/// ```
pub fn format_markup(markup: &str) -> String {
    if markup.trim().is_empty() {
        return markup.to_string();
    }

    let collapsed = INTER_TAG_WHITESPACE.replace_all(markup, "><");
    let mut lines = Vec::new();
    let mut depth: usize = 0;
    let mut text = String::new();
    let mut chars = collapsed.chars();

    while let Some(c) = chars.next() {
        if c != '<' {
            // Line breaks inside text runs become plain spaces.
            text.push(if c == '\n' || c == '\r' { ' ' } else { c });
            continue;
        }

        let pending = text.trim();
        if !pending.is_empty() {
            push_line(&mut lines, depth, pending);
        }
        text.clear();

        let mut token = String::from('<');
        for next in chars.by_ref() {
            token.push(next);
            if next == '>' {
                break;
            }
        }
        let token = token.trim();

        match classify_tag(token) {
            TagKind::Closing => {
                depth = depth.saturating_sub(1);
                push_line(&mut lines, depth, token);
            }
            TagKind::Standalone => push_line(&mut lines, depth, token),
            TagKind::Opening => {
                push_line(&mut lines, depth, token);
                depth += 1;
            }
        }
    }

    let pending = text.trim();
    if !pending.is_empty() {
        push_line(&mut lines, depth, pending);
    }

    lines.join("\n").trim().to_string()
}

/// Reformats a stylesheet into one selector or declaration per line.
///
/// Each `selector {` opens a block indented two spaces; each declaration is
/// emitted on its own line with a trailing `;` (inserted when the source
/// omits it before `}`); `}` closes the block on its own line. Top-level
/// rules are separated by a single blank line. Braces and semicolons inside
/// parentheses or quotes (such as `url(data:image/png;base64,...)`) are
/// treated as ordinary text.
///
/// Blank input is returned unchanged.
///
/// # Example
///
/// ```
/// use pageship::export::format_styles;
///
/// let formatted = format_styles(".a{color:red;margin:0}");
/// assert_eq!(formatted, ".a {\n  color:red;\n  margin:0;\n}");
/// ```
pub fn format_styles(styles: &str) -> String {
    if styles.trim().is_empty() {
        return styles.to_string();
    }

    let mut lines: Vec<String> = Vec::new();
    let mut depth: usize = 0;
    let mut buffer = String::new();
    let mut parens: usize = 0;
    let mut quote: Option<char> = None;

    // Separates top-level rules with one blank line.
    let begin_item = |lines: &mut Vec<String>, depth: usize| {
        if depth == 0 && lines.last().is_some_and(|l| l == "}") {
            lines.push(String::new());
        }
    };

    for c in styles.chars() {
        let c = if c == '\n' || c == '\r' { ' ' } else { c };

        if let Some(open) = quote {
            buffer.push(c);
            if c == open {
                quote = None;
            }
            continue;
        }

        match c {
            '"' | '\'' => {
                quote = Some(c);
                buffer.push(c);
            }
            '(' => {
                parens += 1;
                buffer.push(c);
            }
            ')' => {
                parens = parens.saturating_sub(1);
                buffer.push(c);
            }
            '{' if parens == 0 => {
                begin_item(&mut lines, depth);
                let selector = buffer.trim();
                if selector.is_empty() {
                    push_line(&mut lines, depth, "{");
                } else {
                    push_line(&mut lines, depth, &format!("{selector} {{"));
                }
                buffer.clear();
                depth += 1;
            }
            ';' if parens == 0 => {
                let declaration = buffer.trim();
                if !declaration.is_empty() {
                    begin_item(&mut lines, depth);
                    push_line(&mut lines, depth, &format!("{declaration};"));
                }
                buffer.clear();
            }
            '}' if parens == 0 => {
                let declaration = buffer.trim();
                if !declaration.is_empty() {
                    begin_item(&mut lines, depth);
                    push_line(&mut lines, depth, &format!("{declaration};"));
                }
                buffer.clear();
                depth = depth.saturating_sub(1);
                push_line(&mut lines, depth, "}");
            }
            _ => buffer.push(c),
        }
    }

    let rest = buffer.trim();
    if !rest.is_empty() {
        begin_item(&mut lines, depth);
        push_line(&mut lines, depth, rest);
    }

    collapse_blank_runs(&lines.join("\n")).trim().to_string()
}

/// Collapses any run of blank lines to a single blank line.
fn collapse_blank_runs(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines() {
        let blank = line.trim().is_empty();
        if blank && out.last().is_some_and(|prev| prev.trim().is_empty()) {
            continue;
        }
        out.push(if blank { "" } else { line });
    }
    out.join("\n")
}
