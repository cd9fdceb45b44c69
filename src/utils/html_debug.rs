// src/utils/html_debug.rs
use std::fs;
use std::path::Path;

use regex::Regex;

use crate::utils::error::AppError;

/// Markers worth seeing when a schedule page extracts badly, with their highlight kind.
pub const SCHEDULE_MARKERS: &[(&str, &str)] = &[
    (r"Uge \d+ - \d+", "week"),
    (r#"class=['"][^'"]*\bs2dayHeader\b[^'"]*['"]"#, "day"),
    (r#"class=['"][^'"]*\bs2infoHeader\b[^'"]*['"]"#, "info"),
    (r#"class=['"][^'"]*\bs2skemabrik\b[^'"]*['"]"#, "block"),
    (r#"class=['"][^'"]*\bs2module-info\b[^'"]*['"]"#, "module"),
    (r#"data-date=['"][^'"]*['"]"#, "column"),
    (r"holdElementLinkList", "groups"),
];

/// Writes a copy of the page with each highlight span wrapped in a coloured marker.
/// Overlapping spans keep the earliest one.
pub fn save_debug_html(html: &str, path: &Path, highlights: &[(usize, usize, &str)]) -> Result<(), AppError> {
    let mut debug_html = String::with_capacity(html.len() + highlights.len() * 64);
    debug_html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<style>\n");
    debug_html.push_str(".hl-week { background-color: #FFFF00; }\n");
    debug_html.push_str(".hl-day { background-color: #FFA500; }\n");
    debug_html.push_str(".hl-info { background-color: #FFC0CB; }\n");
    debug_html.push_str(".hl-block { background-color: #90EE90; }\n");
    debug_html.push_str(".hl-module { background-color: #ADD8E6; }\n");
    debug_html.push_str(".hl-other { background-color: #D3D3D3; }\n");
    debug_html.push_str("</style>\n</head>\n<body>\n<pre>\n");

    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0);

    let mut last_pos = 0;
    for (start, end, kind) in sorted {
        if start < last_pos || end > html.len() {
            continue;
        }
        debug_html.push_str(&escape(&html[last_pos..start]));

        let css_class = match kind {
            "week" => "hl-week",
            "day" => "hl-day",
            "info" => "hl-info",
            "block" => "hl-block",
            "module" => "hl-module",
            _ => "hl-other",
        };
        debug_html.push_str(&format!(
            "<span class=\"{}\" title=\"{} @ {}-{}\">",
            css_class, kind, start, end
        ));
        debug_html.push_str(&escape(&html[start..end]));
        debug_html.push_str("</span>");
        last_pos = end;
    }
    debug_html.push_str(&escape(&html[last_pos..]));
    debug_html.push_str("\n</pre>\n</body>\n</html>");

    fs::write(path, debug_html)?;
    tracing::info!("Saved debug HTML to {}", path.display());
    Ok(())
}

/// Creates an annotated copy of a page with every match of `patterns` highlighted.
pub fn create_debug_html(html: &str, path: &Path, patterns: &[(&str, &str)]) -> Result<usize, AppError> {
    let mut highlights = Vec::new();

    for (pattern, kind) in patterns {
        let re = Regex::new(pattern).map_err(|e| {
            AppError::Config(format!("Invalid regex pattern '{}': {}", pattern, e))
        })?;
        highlights.extend(re.find_iter(html).map(|m| (m.start(), m.end(), *kind)));
    }

    save_debug_html(html, path, &highlights)?;
    Ok(highlights.len())
}

// The annotated copy shows markup as source text.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_highlighted_and_source_escaped() {
        let dir = std::env::temp_dir().join(format!("lectio-debug-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("annotated.html");

        let html = r#"<td class="s2weekHeader">Uge 10 - 2024</td><a class='s2skemabrik'>x</a>"#;
        let count = create_debug_html(html, &path, SCHEDULE_MARKERS).unwrap();
        assert_eq!(count, 2);

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("<span class=\"hl-week\""));
        assert!(written.contains("<span class=\"hl-block\""));
        assert!(written.contains("&lt;td class=\"s2weekHeader\"&gt;"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let path = std::env::temp_dir().join("lectio-debug-invalid.html");
        let result = create_debug_html("<p></p>", &path, &[("(unclosed", "other")]);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
