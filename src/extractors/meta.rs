// src/extractors/meta.rs
//! Week, student, school, module legend and group list.
//!
//! None of these fail: a missing region yields empty strings, zeros or empty
//! lists, and the rest of the extraction carries on.

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::markup::{Marker, Markup};
use crate::extractors::rules::ExtractionRules;
use crate::lectio::models::{Module, Student, StudentGroups};

// --- Regex Patterns (Lazy Static) ---
static WEEK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Uge\s+(\d{1,2})\s+-\s+(\d{4})").expect("Failed to compile WEEK_RE")
});

// `Jane Doe(k), 2a - Skema`
static TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(.+?)\s*\(k\),\s*(.+?)\s+-\s+Skema").expect("Failed to compile TITLE_RE")
});

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeekInfo {
    pub week_number: u32,
    pub year: i32,
    pub week_range: String,
}

// --- Extractors ---
pub fn extract_week_info<M: Markup>(markup: &M, rules: &ExtractionRules) -> WeekInfo {
    let markers = &rules.markers;
    let week_text = markup
        .first(Marker::Class(&markers.week_header))
        .map(|header| {
            let cell = markup.first_within(header, Marker::Tag("td")).unwrap_or(header);
            markup.text(cell).trim().to_string()
        })
        .unwrap_or_default();

    let (week_number, year) = match WEEK_RE.captures(&week_text) {
        Some(caps) => (caps[1].parse().unwrap_or(0), caps[2].parse().unwrap_or(0)),
        None => {
            tracing::warn!("No week marker found in '{}'", week_text);
            (0, 0)
        }
    };

    let week_range = markup
        .first(Marker::Id(&markers.week_picker_id))
        .and_then(|picker| markup.attr(picker, "value"))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(week_text);

    WeekInfo { week_number, year, week_range }
}

pub fn extract_student<M: Markup>(markup: &M) -> Student {
    let title = markup
        .first(Marker::Tag("title"))
        .map(|t| markup.text(t))
        .unwrap_or_default();
    parse_student_title(&title).unwrap_or_else(|| {
        tracing::warn!("Could not read student from title '{}'", title.trim());
        Student::default()
    })
}

/// Splits a page title like `Jane Doe(k), 2a - Skema` into name and class.
pub fn parse_student_title(title: &str) -> Option<Student> {
    let caps = TITLE_RE.captures(title)?;
    Some(Student {
        name: caps[1].trim().to_string(),
        class: caps[2].trim().to_string(),
    })
}

pub fn extract_school<M: Markup>(markup: &M, rules: &ExtractionRules) -> String {
    markup
        .first(Marker::Class(&rules.markers.school_name))
        .map(|el| markup.text(el).trim().to_string())
        .unwrap_or_default()
}

/// Module legend rows with a name line and a time line, numbered from 1 in order.
pub fn extract_modules<M: Markup>(markup: &M, rules: &ExtractionRules) -> Vec<Module> {
    let mut modules = Vec::new();
    for info in markup.select(Marker::Class(&rules.markers.module_info)) {
        let Some(content) = markup.first_within(info, Marker::Tag("div")) else {
            continue;
        };
        let text = markup.text(content);
        let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();
        if let [name, time_range, ..] = lines.as_slice() {
            modules.push(Module {
                number: modules.len() as u32 + 1,
                name: name.to_string(),
                time_range: time_range.to_string(),
            });
        }
    }
    modules
}

pub fn extract_groups<M: Markup>(markup: &M, rules: &ExtractionRules) -> StudentGroups {
    let markers = &rules.markers;
    let mut groups = StudentGroups::default();

    let Some(table) = markup.first(Marker::Id(&markers.groups_table_id)) else {
        tracing::debug!("No group list on page");
        return groups;
    };

    for row in markup.select_within(table, Marker::Tag("tr")) {
        let Some(header) = markup.first_within(row, Marker::Tag("th")) else {
            continue;
        };
        let header_text = markup.text(header);
        let target = if header_text.contains(&markers.subjects_header) {
            &mut groups.subjects
        } else if header_text.contains(&markers.involved_groups_header) {
            &mut groups.involved_groups
        } else if header_text.contains(&markers.own_groups_header) {
            &mut groups.own_groups
        } else {
            continue;
        };
        target.extend(
            markup
                .select_within(row, Marker::Tag("a"))
                .into_iter()
                .map(|link| markup.text(link).trim().to_string())
                .filter(|name| !name.is_empty()),
        );
    }
    groups
}
