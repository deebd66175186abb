//! Cost component names carry labels in brackets, e.g.
//! `Instance usage (Linux/UNIX, on-demand, t3.small)`.

use regex::Regex;
use std::sync::LazyLock;

/// Text before the first bracket pair, and the labels inside it
static NAME_LABELS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(.*?)\s*\((.*?)\)").expect("valid name label pattern"));

const LABEL_SEPARATOR: &str = ", ";

/// Text before ` (`, only for names that carry labels
pub fn name_prefix(name: &str) -> Option<&str> {
    name.split_once(" (").map(|(prefix, _)| prefix)
}

/// Merge past and current names, showing changed labels as `old → new`.
///
/// `Instance usage (Linux/UNIX, on-demand, t3.small)` and
/// `Instance usage (Linux/UNIX, on-demand, t3.medium)` become
/// `Instance usage (Linux/UNIX, on-demand, t3.small → t3.medium)`.
pub fn merge_display_name(past: &str, current: &str) -> String {
    if current.is_empty() {
        return past.to_string();
    }
    if past.is_empty() || past == current {
        return current.to_string();
    }

    let (Some(current_m), Some(past_m)) = (NAME_LABELS.captures(current), NAME_LABELS.captures(past)) else {
        return current.to_string();
    };

    let prefix = &current_m[1];
    let past_labels: Vec<&str> = past_m[2].split(LABEL_SEPARATOR).collect();
    let current_labels: Vec<&str> = current_m[2].split(LABEL_SEPARATOR).collect();

    if past_labels.len() != current_labels.len() {
        return format!("{prefix} ({}) → ({})", &past_m[2], &current_m[2]);
    }

    let labels: Vec<String> = past_labels
        .iter()
        .zip(&current_labels)
        .map(|(old, new)| {
            if old == new {
                new.to_string()
            } else {
                format!("{old} → {new}")
            }
        })
        .collect();

    format!("{prefix} ({})", labels.join(LABEL_SEPARATOR))
}
