// src/extractors/tooltip.rs
//! Field recovery from one block's tooltip text.
//!
//! A tooltip is a handful of trimmed lines: an optional free-text topic,
//! `Hold:`, `Lærer: Name (INIT)`, `Lokale:`, a `D/M-YYYY HH:MM til HH:MM`
//! line (or an all-day marker), a `Lektier:` header followed by `-` bullets,
//! and a `Note:` that runs to the end. Order is not fixed.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::rules::{ExtractionRules, TooltipLabels};
use crate::lectio::models::ALL_DAY;

// --- Regex Patterns (Lazy Static) ---
// `5/3-2024 08:00 til 09:30` or `5/3-2024 08:00 til 6/3-2024 10:00`
static DATE_TIME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}/\d{1,2}-\d{4})\s+(\d{1,2}:\d{2})\s+til\s+(?:(\d{1,2}/\d{1,2}-\d{4})\s+)?(\d{1,2}:\d{2})")
        .expect("Failed to compile DATE_TIME_RE")
});

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|\D)(\d{1,2}/\d{1,2}-\d{4})").expect("Failed to compile DATE_RE")
});

// --- Data Structures ---
/// Raw candidate fields of one tooltip, before classification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TooltipFields {
    /// Text after `Hold:`.
    pub subject: Option<String>,
    /// Unlabelled first line.
    pub topic: Option<String>,
    pub teacher_name: String,
    pub teacher_initials: String,
    pub room: String,
    /// `D/M-YYYY` of the start.
    pub date: Option<String>,
    pub start_time: String,
    pub end_time: String,
    pub all_day: bool,
    /// Line preceding the all-day marker.
    pub title: Option<String>,
    pub homework: Vec<String>,
    pub notes: Option<String>,
}

impl TooltipFields {
    /// Subject the item will carry: `Hold:` first, then the topic, then the title.
    pub fn subject_name(&self) -> Option<&str> {
        [&self.subject, &self.topic, &self.title]
            .into_iter()
            .filter_map(|s| s.as_deref())
            .find(|s| !s.is_empty())
    }

    pub fn has_times(&self) -> bool {
        self.all_day || !self.start_time.is_empty() || !self.end_time.is_empty()
    }

    /// True when the fields are enough to build an item.
    pub fn is_complete(&self) -> bool {
        self.subject_name().is_some() && self.has_times()
    }
}

// --- Parser ---
pub struct TooltipParser<'r> {
    labels: &'r TooltipLabels,
    min_topic_chars: usize,
}

impl<'r> TooltipParser<'r> {
    pub fn new(rules: &'r ExtractionRules) -> Self {
        Self {
            labels: &rules.labels,
            min_topic_chars: rules.min_topic_chars,
        }
    }

    /// Parses a tooltip, or `None` when it names no subject or no time.
    pub fn parse(&self, tooltip: &str) -> Option<TooltipFields> {
        let fields = self.scan(tooltip);
        fields.is_complete().then_some(fields)
    }

    /// Collects whatever fields the tooltip has, complete or not.
    pub fn scan(&self, tooltip: &str) -> TooltipFields {
        let lines: Vec<&str> = tooltip
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let mut fields = TooltipFields {
            topic: lines.first().filter(|line| self.is_topic(line)).map(|line| line.to_string()),
            ..Default::default()
        };
        let labels = self.labels;
        let mut in_homework = false;

        for (i, line) in lines.iter().enumerate() {
            if in_homework {
                if self.ends_homework(line) {
                    in_homework = false;
                } else if let Some(bullet) = line.strip_prefix('-') {
                    fields.homework.push(bullet.trim().to_string());
                    continue;
                }
            }

            if let Some(caps) = DATE_TIME_RE.captures(line) {
                fields.date = Some(caps[1].to_string());
                fields.start_time = normalize_time(&caps[2]);
                fields.end_time = normalize_time(&caps[4]);
                continue;
            }

            if line.contains(&labels.all_day) {
                fields.all_day = true;
                if i > 0 {
                    fields.title = Some(lines[i - 1].to_string());
                }
                continue;
            }

            if let Some(rest) = line.strip_prefix(&labels.subject) {
                fields.subject = Some(rest.trim().to_string());
                continue;
            }

            if let Some(rest) = line.strip_prefix(&labels.teacher) {
                let (name, initials) = split_teacher(rest);
                fields.teacher_name = name;
                fields.teacher_initials = initials;
                continue;
            }

            if let Some(rest) = line.strip_prefix(&labels.room) {
                fields.room = rest.trim().to_string();
                continue;
            }

            if line.contains(&labels.homework) {
                in_homework = true;
                continue;
            }

            if let Some(pos) = line.find(&labels.note) {
                let mut parts = vec![line[pos + labels.note.len()..].trim()];
                parts.extend(lines[i + 1..].iter().copied());
                let notes = parts.into_iter().filter(|p| !p.is_empty()).collect::<Vec<_>>().join(" ");
                fields.notes = Some(notes).filter(|n| !n.is_empty());
                break;
            }
        }

        if fields.all_day {
            fields.start_time.clear();
            fields.end_time = ALL_DAY.to_string();
            if let Some(date) = lines.iter().find_map(|line| DATE_RE.captures(line)) {
                fields.date = Some(date[1].to_string());
            }
        }

        fields
    }

    fn is_topic(&self, line: &str) -> bool {
        let labels = self.labels;
        !DATE_TIME_RE.is_match(line)
            && !line.contains('/')
            && !line.contains(':')
            && !line.contains(&labels.all_day)
            && line.chars().count() > self.min_topic_chars
    }

    fn ends_homework(&self, line: &str) -> bool {
        let labels = self.labels;
        line.contains(&labels.note) || line.contains(&labels.teacher) || line.contains(&labels.room)
    }
}

// --- Helpers ---
/// `John Smith (JSM)` → (`John Smith`, `JSM`); no parentheses → name only.
fn split_teacher(text: &str) -> (String, String) {
    let text = text.trim();
    if let Some(open) = text.find('(') {
        if let Some(close) = text[open..].find(')') {
            let name = text[..open].trim();
            let initials = text[open + 1..open + close].trim();
            if !name.is_empty() {
                return (name.to_string(), initials.to_string());
            }
        }
    }
    (text.to_string(), String::new())
}

/// Zero-pads the hour: `8:05` → `08:05`.
pub fn normalize_time(time: &str) -> String {
    match time.split_once(':') {
        Some((hour, minute)) => match hour.parse::<u32>() {
            Ok(h) => format!("{:02}:{}", h, minute),
            Err(_) => time.to_string(),
        },
        None => time.to_string(),
    }
}
