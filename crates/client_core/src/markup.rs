//! Small helpers shared by the region renderers.

use std::fmt::Write as _;

pub fn escape_html(content: &str) -> String {
    content
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// `<div class="{prefix}-item"><div class="{prefix}-label">..</div><div class="{prefix}-value">..</div></div>`
pub fn labelled_row(out: &mut String, prefix: &str, label: &str, value: &str) {
    let _ = write!(
        out,
        r#"<div class="{prefix}-item"><div class="{prefix}-label">{}</div><div class="{prefix}-value">{}</div></div>"#,
        escape_html(label),
        escape_html(value),
    );
}

/// Treats empty strings the same as absent values.
pub fn or_placeholder<'a>(value: Option<&'a str>, placeholder: &'a str) -> &'a str {
    match value {
        Some(text) if !text.is_empty() => text,
        _ => placeholder,
    }
}
