// src/utils/html_debug.rs
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

/// Labelled patterns highlighted in annotated label pages.
/// The labels double as the CSS class suffix.
pub const LABEL_PAGE_PATTERNS: &[(&str, &str)] = &[
    (r#"(?i)<h3[^>]*class="[^"]*accordion-header[^"]*"[^>]*>"#, "date-block"),
    (r#"(?i)<div[^>]*class="[^"]*ui-accordion-content[^"]*"[^>]*>"#, "container"),
    (r"(?i)<h4[^>]*>", "section"),
    (r"(?:NDA|BLA)-\d+", "subject"),
];

fn css_class(label: &str) -> &'static str {
    match label {
        "date-block" => "hl-date-block",
        "container" => "hl-container",
        "section" => "hl-section",
        "subject" => "hl-subject",
        _ => "hl-other",
    }
}

/// Wraps each highlight range of `html` in a labelled `<span>`.
/// Ranges are `(start, end, label)` byte offsets; overlapping ranges after
/// the first are dropped.
pub fn annotate(html: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut out = String::from("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    out.push_str(".hl-date-block { background-color: #FFFF00; }\n");
    out.push_str(".hl-container { background-color: #FFA500; }\n");
    out.push_str(".hl-section { background-color: #90EE90; }\n");
    out.push_str(".hl-subject { background-color: #ADD8E6; }\n");
    out.push_str(".hl-other { background-color: #FFC0CB; }\n");
    out.push_str("</style>\n</head>\n<body>\n<pre>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, label) in sorted {
        if start < last_pos || end > html.len() {
            continue;
        }
        out.push_str(&escape(&html[last_pos..start]));
        out.push_str(&format!(
            "<span class=\"{}\" title=\"{} @ {}-{}\">",
            css_class(label),
            label,
            start,
            end
        ));
        out.push_str(&escape(&html[start..end]));
        out.push_str("</span>");
        last_pos = end;
    }
    out.push_str(&escape(&html[last_pos..]));
    out.push_str("\n</pre>\n</body>\n</html>");
    out
}

// The page source is shown as text, so markup must not render.
fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Writes an annotated copy of `html` to `path`, highlighting every match of
/// each `(pattern, label)` pair.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<(), AppError> {
    let mut highlights = Vec::new();

    for (pattern, label) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;
        for mat in re.find_iter(html) {
            highlights.push((mat.start(), mat.end(), *label));
        }
    }

    fs::write(path, annotate(html, &highlights))?;
    tracing::debug!("Saved annotated page to {}", path.display());
    Ok(())
}
