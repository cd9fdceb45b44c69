// src/extractors/classify.rs
// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::rules::ExtractionRules;
use crate::extractors::tooltip::TooltipFields;
use crate::lectio::models::{ItemStatus, ItemType};

// --- Regex Patterns (Lazy Static) ---
static TOP_OFFSET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|;)\s*top\s*:\s*(\d+(?:\.\d+)?)em").expect("Failed to compile TOP_OFFSET_RE")
});

// --- Data Structures ---
/// Signals about a block that come from its markup rather than its tooltip.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BlockHints {
    /// Carries the changed-state class.
    pub changed: bool,
    /// Carries the cancelled-state class.
    pub cancelled: bool,
    /// Vertical `top` offset in `em`, from the inline style.
    pub top_em: Option<f32>,
    /// Sits in the whole-day info header row rather than the time grid.
    pub header_event: bool,
    /// Has a timeline strip, which only event blocks render.
    pub timeline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub item_type: ItemType,
    pub status: ItemStatus,
    pub module: u8,
}

// --- Classifier ---
pub struct ItemClassifier<'r> {
    rules: &'r ExtractionRules,
}

impl<'r> ItemClassifier<'r> {
    pub fn new(rules: &'r ExtractionRules) -> Self {
        Self { rules }
    }

    pub fn classify(&self, fields: &TooltipFields, tooltip: &str, hints: &BlockHints) -> Classification {
        Classification {
            item_type: self.item_type(tooltip, hints),
            status: status(hints),
            module: self.module(fields, hints),
        }
    }

    fn item_type(&self, tooltip: &str, hints: &BlockHints) -> ItemType {
        let lowered = tooltip.to_lowercase();
        if self.rules.deadline_keywords.iter().any(|k| lowered.contains(&k.to_lowercase())) {
            return ItemType::Deadline;
        }
        if hints.header_event || hints.timeline || self.has_event_marker(tooltip) {
            return ItemType::Event;
        }
        ItemType::Class
    }

    fn has_event_marker(&self, tooltip: &str) -> bool {
        let day_token = self.rules.event_day_token.to_lowercase();
        tooltip
            .lines()
            .filter(|line| !line.contains(&self.rules.labels.subject))
            .map(str::to_lowercase)
            .any(|line| {
                line.contains(&day_token)
                    && self.rules.event_keywords.iter().any(|k| line.contains(&k.to_lowercase()))
            })
    }

    /// Module from the block's offset when known, its start hour otherwise; 0 when neither.
    pub fn module(&self, fields: &TooltipFields, hints: &BlockHints) -> u8 {
        if let Some(top) = hints.top_em {
            return bucket(top, &self.rules.offset_module_limits);
        }
        match start_hour(&fields.start_time) {
            Some(hour) => bucket(hour, &self.rules.hour_module_limits),
            None => 0,
        }
    }
}

// --- Helpers ---
fn status(hints: &BlockHints) -> ItemStatus {
    if hints.changed {
        ItemStatus::Changed
    } else if hints.cancelled {
        ItemStatus::Cancelled
    } else {
        ItemStatus::Normal
    }
}

// 1-based index of the first limit `value` falls under, 5 past the last one.
fn bucket<T: PartialOrd>(value: T, limits: &[T; 4]) -> u8 {
    limits
        .iter()
        .position(|limit| value < *limit)
        .map_or(5, |i| i as u8 + 1)
}

fn start_hour(start_time: &str) -> Option<u32> {
    start_time.split_once(':')?.0.parse().ok()
}

/// Reads `top: <n>em` from an inline style.
pub fn parse_top_em(style: &str) -> Option<f32> {
    TOP_OFFSET_RE.captures(style)?[1].parse().ok()
}
