use crate::{
    config::ReportingVariant,
    constants::LISTING_MARKER,
    error::{Error, Result},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FooterTotals {
    pub total: String,
    /// Per-category text shown in parentheses; empty when there is none.
    pub breakdown: String,
}

impl ReportingVariant {
    /// Reads the grand total and breakdown out of a stripped `list` output.
    pub fn compute_totals(self, listing: &str) -> Result<FooterTotals> {
        match self {
            ReportingVariant::One => totals_from_summary_line(listing),
            ReportingVariant::Two => totals_from_category_block(listing),
        }
    }
}

/// `1.5` -> `1h30m`, `2.0` -> `2h`.
pub fn hours_to_hm(hours: f64) -> String {
    let minutes_total = (hours * 3600.0).div_euclid(60.0);
    let h = minutes_total.div_euclid(60.0) as i64;
    let m = minutes_total.rem_euclid(60.0) as i64;
    if m != 0 {
        format!("{}h{}m", h, m)
    } else {
        format!("{}h", h)
    }
}

fn totals_from_summary_line(listing: &str) -> Result<FooterTotals> {
    let summary = listing.split('\n').next_back().unwrap_or_default();
    let mut hours = 0.0;
    for segment in summary.split(',') {
        let value = segment
            .split(':')
            .nth(1)
            .map(|v| drop_last_chars(v, 1).trim())
            .and_then(|v| v.parse::<f64>().ok())
            .ok_or_else(|| Error::parse("list total", summary))?;
        hours += value;
    }
    Ok(FooterTotals {
        total: hours_to_hm(hours),
        breakdown: summary.to_string(),
    })
}

fn totals_from_category_block(listing: &str) -> Result<FooterTotals> {
    let lines: Vec<&str> = listing.split('\n').skip(2).collect();
    let last = lines
        .last()
        .ok_or_else(|| Error::parse("list", listing))?;
    let raw_total = last
        .split(':')
        .nth(1)
        .ok_or_else(|| Error::parse("list total", *last))?;
    let total = drop_last_chars(raw_total, 2)
        .replace(" 0m", "")
        .replace(' ', "");
    let total = if total.is_empty() {
        "0h".to_string()
    } else {
        total
    };

    let breakdown = match lines.iter().position(|l| l.starts_with(LISTING_MARKER)) {
        Some(marker) => lines
            .get(marker + 1..lines.len() - 1)
            .unwrap_or_default()
            .iter()
            .map(|line| {
                drop_last_chars(line, 2)
                    .replace(" 0h 0m", "0h")
                    .replace(" 0m", "")
                    .replace(" 0h", "")
                    .replace(' ', "")
            })
            .collect::<Vec<_>>()
            .join(","),
        None => String::new(),
    };

    Ok(FooterTotals { total, breakdown })
}

fn drop_last_chars(text: &str, n: usize) -> &str {
    match text.char_indices().rev().nth(n.saturating_sub(1)) {
        Some((idx, _)) if n > 0 => &text[..idx],
        _ if n == 0 => text,
        _ => "",
    }
}
