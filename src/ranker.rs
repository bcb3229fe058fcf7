use std::collections::HashMap;

use chrono::{Duration as ChronoDuration, Local, NaiveDate};
use csv::{ReaderBuilder, StringRecord};
use itertools::Itertools;

use crate::{
    config::Config,
    constants::EXPORT_SHAPE,
    error::{Error, Result},
    gateway::Tracker,
};

/// One row of `export tsv`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackedFact {
    pub activity: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub category: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl TrackedFact {
    fn from_record(record: &StringRecord) -> Option<Self> {
        if record.len() != EXPORT_SHAPE.fields {
            return None;
        }
        let tags = match &record[6] {
            "" => Vec::new(),
            raw => raw.split(", ").map(str::to_string).collect(),
        };
        Some(Self {
            activity: record[0].to_string(),
            start: record[1].to_string(),
            end: record[2].to_string(),
            duration: record[3].to_string(),
            category: record[4].to_string(),
            description: record[5].to_string(),
            tags,
        })
    }

    /// The menu label for this fact. It doubles as the dedup key and as the
    /// literal argument of the start action, so the punctuation is fixed:
    /// with a description the tags follow the description's trailing space,
    /// without one they are comma-joined to `activity@category`.
    pub fn label(&self, include_description: bool) -> String {
        let tags = self.tags.iter().map(|tag| format!("#{}", tag)).join(" ");

        if include_description && !self.description.is_empty() {
            let base = format!("{}@{}, {} ", self.activity, self.category, self.description);
            if tags.is_empty() {
                base
            } else {
                format!("{} {}", base, tags)
            }
        } else {
            let base = format!("{}@{}", self.activity, self.category);
            [base, tags].into_iter().filter(|part| !part.is_empty()).join(",")
        }
    }

    pub fn start_date(&self) -> Result<NaiveDate> {
        self.start
            .get(..EXPORT_SHAPE.date_len)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
            .ok_or_else(|| Error::parse("export start", self.start.clone()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankingPolicy {
    /// Presence only; labels come out sorted.
    Alphabetical,
    /// Each occurrence adds `days - age_in_days`; highest total first.
    AgeFrequency,
}

#[derive(Clone, Copy, Debug)]
pub struct RankOptions {
    pub days: u32,
    pub policy: RankingPolicy,
    pub include_description: bool,
}

impl RankOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            days: config.days,
            policy: if config.age_frequency_ranking {
                RankingPolicy::AgeFrequency
            } else {
                RankingPolicy::Alphabetical
            },
            include_description: config.use_description,
        }
    }
}

pub struct ActivityRanker<'a, T: Tracker> {
    tracker: &'a T,
    options: RankOptions,
}

impl<'a, T: Tracker> ActivityRanker<'a, T> {
    pub fn new(tracker: &'a T, options: RankOptions) -> Self {
        Self { tracker, options }
    }

    pub fn recent_activities(&self) -> Result<Vec<String>> {
        self.recent_activities_on(Local::now().date_naive())
    }

    pub fn recent_activities_on(&self, today: NaiveDate) -> Result<Vec<String>> {
        let raw = self
            .tracker
            .run(&export_subcommand(today, self.options.days), false)?;
        let facts = parse_facts(&data_lines(&raw))?;
        log::debug!("export returned {} facts", facts.len());
        let scores = score_facts(&facts, &self.options, today)?;
        Ok(order_labels(scores, self.options.policy))
    }
}

pub fn export_subcommand(today: NaiveDate, days: u32) -> String {
    let before = today - ChronoDuration::days(i64::from(days));
    format!(
        "export tsv {} {}",
        before.format("%Y-%m-%d"),
        today.format("%Y-%m-%d")
    )
}

/// Strips the header line and the two trailer lines of an export.
pub fn data_lines(raw: &str) -> Vec<&str> {
    let lines: Vec<&str> = raw.split('\n').collect();
    let end = lines.len().saturating_sub(EXPORT_SHAPE.trailing_lines);
    if end <= EXPORT_SHAPE.leading_lines {
        return Vec::new();
    }
    lines[EXPORT_SHAPE.leading_lines..end]
        .iter()
        .copied()
        .filter(|line| !line.is_empty())
        .collect()
}

pub fn parse_facts(lines: &[&str]) -> Result<Vec<TrackedFact>> {
    if lines.is_empty() {
        return Ok(Vec::new());
    }

    let block = lines.join("\n");
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(block.as_bytes());

    let mut facts = Vec::with_capacity(lines.len());
    for record in reader.records() {
        let record = record?;
        let fact = TrackedFact::from_record(&record).ok_or_else(|| {
            let line = record
                .position()
                .and_then(|pos| lines.get(pos.line().saturating_sub(1) as usize))
                .map(|line| line.to_string())
                .unwrap_or_else(|| record.iter().join("\t"));
            Error::parse("export", line)
        })?;
        facts.push(fact);
    }
    Ok(facts)
}

pub fn score_facts(
    facts: &[TrackedFact],
    options: &RankOptions,
    today: NaiveDate,
) -> Result<HashMap<String, i64>> {
    let mut scores: HashMap<String, i64> = HashMap::new();
    for fact in facts {
        let label = fact.label(options.include_description);
        match options.policy {
            RankingPolicy::Alphabetical => {
                scores.insert(label, 1);
            }
            RankingPolicy::AgeFrequency => {
                let age_days = (today - fact.start_date()?).num_days();
                *scores.entry(label).or_insert(0) += i64::from(options.days) - age_days;
            }
        }
    }
    Ok(scores)
}

/// Equal scores keep the order of a descending `(score, label)` sort, so the
/// later label wins ties.
pub fn order_labels(scores: HashMap<String, i64>, policy: RankingPolicy) -> Vec<String> {
    match policy {
        RankingPolicy::Alphabetical => scores.into_keys().sorted().collect(),
        RankingPolicy::AgeFrequency => scores
            .into_iter()
            .map(|(label, score)| (score, label))
            .sorted()
            .rev()
            .map(|(_, label)| label)
            .collect(),
    }
}
