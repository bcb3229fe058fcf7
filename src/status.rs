use itertools::Itertools;

use crate::{error::Result, gateway::Tracker};

/// Snapshot of `current`. Active text looks like
/// `2026-10-16 09:12 Code@Work, refactor 0:35`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentStatus {
    pub full: String,
    pub label: String,
    pub active: bool,
}

impl CurrentStatus {
    pub fn query<T: Tracker>(tracker: &T, no_activity: &str) -> Result<Self> {
        let full = tracker.run("current", true)?;
        Ok(Self::from_text(full, no_activity))
    }

    pub fn from_text(full: String, no_activity: &str) -> Self {
        if full == no_activity {
            return Self {
                label: full.clone(),
                full,
                active: false,
            };
        }

        let activity = words_after_timestamp(full.split('@').next().unwrap_or_default());
        let label = format!("{} {}", activity, last_chars(&full, 5));
        Self {
            full,
            label,
            active: true,
        }
    }

    /// Text shown next to the add button: activity, category and nothing
    /// past the first comma.
    pub fn header_label(&self) -> String {
        if self.active {
            words_after_timestamp(self.full.split(',').next().unwrap_or_default())
        } else {
            self.label.clone()
        }
    }
}

fn words_after_timestamp(text: &str) -> String {
    text.split_whitespace().skip(2).join(" ")
}

fn last_chars(text: &str, n: usize) -> &str {
    match text.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &text[idx..],
        _ if n == 0 => "",
        _ => text,
    }
}
