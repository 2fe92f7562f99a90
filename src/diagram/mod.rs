//! Mermaid diagram generators
//!
//! Pure string builders over read-only snapshots: collected data in, graph
//! description out. Nothing here touches the core state.

mod crt;
mod gap;
mod process;
mod standard;
mod swimlane;

pub use crt::generate_crt_diagram;
pub use gap::generate_gap_diagram;
pub use process::{generate_process_diagram, simple_process_diagram};
pub use standard::{reference_stages, standard_diagram};
pub use swimlane::{generate_swimlane_diagram, swimlane_legend};

/// Escape a free-text label so it cannot break Mermaid syntax, truncating
/// anything unreasonably long.
pub fn sanitize_label(label: &str) -> String {
    if label.is_empty() {
        return "Unknown".to_string();
    }

    let mut sanitized: String = label
        .chars()
        .filter_map(|c| match c {
            '"' => Some('\''),
            '[' | '{' => Some('('),
            ']' | '}' => Some(')'),
            '#' => None,
            '\r' => None,
            '\n' => Some(' '),
            other => Some(other),
        })
        .collect();
    sanitized = sanitized.replace('<', "lt").replace('>', "gt").replace('&', "and");

    if sanitized.chars().count() > 60 {
        sanitized = sanitized.chars().take(57).collect::<String>() + "...";
    }
    sanitized
}

/// Shorten a captured value for use inside a node label
pub(crate) fn short_value(value: &str, max: usize) -> String {
    let sanitized = sanitize_label(value);
    if sanitized.chars().count() > max {
        sanitized.chars().take(max).collect()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_label_escapes_breakers() {
        assert_eq!(sanitize_label(r#"say "hi" [now]"#), "say 'hi' (now)");
        assert_eq!(sanitize_label("a & b < c"), "a and b lt c");
        assert_eq!(sanitize_label("line\nbreak"), "line break");
        assert_eq!(sanitize_label(""), "Unknown");
    }

    #[test]
    fn test_sanitize_label_truncates() {
        let long = "x".repeat(100);
        let sanitized = sanitize_label(&long);
        assert_eq!(sanitized.chars().count(), 60);
        assert!(sanitized.ends_with("..."));
    }
}
