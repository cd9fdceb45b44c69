// src/extractors/days.rs
// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::classify::{parse_top_em, BlockHints, Classification, ItemClassifier};
use crate::extractors::markup::{Marker, Markup};
use crate::extractors::rules::ExtractionRules;
use crate::extractors::tooltip::{normalize_time, TooltipFields, TooltipParser};
use crate::lectio::models::{
    DaySchedule, Homework, ItemType, Room, ScheduleItem, Subject, Teacher, ALL_DAY,
};
use crate::utils::error::ExtractError;

// --- Constants ---
pub const DAYS_PER_WEEK: usize = 7;

// --- Regex Patterns (Lazy Static) ---
// `Mandag (4/3)`; the portal sometimes cuts weekend names down to `rdag`/`ndag`.
static DAY_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\w+)\s+\((\d{1,2}/\d{1,2})\)").expect("Failed to compile DAY_HEADER_RE")
});

// --- Main Extractor Structure ---
/// Builds one [`DaySchedule`] per day header, in header order.
pub struct DayExtractor<'r> {
    rules: &'r ExtractionRules,
    tooltips: TooltipParser<'r>,
    classifier: ItemClassifier<'r>,
}

impl<'r> DayExtractor<'r> {
    pub fn new(rules: &'r ExtractionRules) -> Self {
        Self {
            rules,
            tooltips: TooltipParser::new(rules),
            classifier: ItemClassifier::new(rules),
        }
    }

    /// Fails only when the page has no day header cells at all.
    pub fn extract<M: Markup>(&self, markup: &M, year: i32) -> Result<Vec<DaySchedule>, ExtractError> {
        let markers = &self.rules.markers;

        // 1. Day header cells, across every header row
        let header_cells: Vec<M::Node<'_>> = markup
            .select(Marker::Class(&markers.day_header))
            .into_iter()
            .flat_map(|row| markup.select_within(row, Marker::Tag("td")))
            .collect();

        // The first cell is the module legend's corner, not a day.
        if header_cells.len() < 2 {
            return Err(ExtractError::NotSchedulePage(format!(
                "no day headers ('.{}' cells) found",
                markers.day_header
            )));
        }

        // 2. Time-grid columns line up with headers 1..; info cells with headers 0..
        let columns = markup.select(Marker::Attr(&markers.day_column_attr));
        let info_cells = markup.select(Marker::Class(&markers.info_header));
        tracing::debug!(
            "Found {} day header cells, {} day columns, {} info header cells",
            header_cells.len() - 1,
            columns.len(),
            info_cells.len()
        );

        // 3. One day per matching header, grid blocks first, then info-row events
        let mut days = Vec::new();
        for (index, cell) in header_cells.iter().enumerate().skip(1) {
            let header_text = markup.text(*cell);
            let Some(caps) = DAY_HEADER_RE.captures(header_text.trim()) else {
                tracing::trace!("Skipping header cell {}: '{}'", index, header_text.trim());
                continue;
            };
            let day_name = self.rules.day_name(&caps[1]);
            let date = caps[2].to_string();

            let mut items = Vec::new();
            if let Some(column) = columns.get(index - 1) {
                for block in markup.select_within(*column, Marker::Class(&markers.block)) {
                    items.extend(self.block_item(markup, block, &date, year, false));
                }
            }
            if let Some(info) = info_cells.get(index) {
                for block in markup.select_within(*info, Marker::Class(&markers.block)) {
                    items.extend(self.block_item(markup, block, &date, year, true));
                }
            }

            tracing::debug!("{} ({}): {} items", day_name, date, items.len());
            let is_weekend = self.rules.is_weekend(&day_name);
            days.push(DaySchedule { date, day_name, items, is_weekend });

            if days.len() == DAYS_PER_WEEK {
                break;
            }
        }

        Ok(days)
    }

    /// Turns one schedule block into an item, or drops it.
    fn block_item<'a, M: Markup>(
        &self,
        markup: &'a M,
        block: M::Node<'a>,
        day_date: &str,
        year: i32,
        header_event: bool,
    ) -> Option<ScheduleItem> {
        let markers = &self.rules.markers;
        let tooltip = markup.attr(block, &markers.tooltip_attr).unwrap_or_default();
        if tooltip.trim().is_empty() {
            tracing::trace!("Dropping block without tooltip on {}", day_date);
            return None;
        }

        let activity_id = markup
            .attr(block, &markers.block_id_attr)
            .filter(|id| !id.is_empty());
        let timeline = markup.first_within(block, Marker::Class(&markers.timeline));
        let hints = BlockHints {
            changed: markup.has_class(block, &markers.changed),
            cancelled: markup.has_class(block, &markers.cancelled),
            top_em: markup.attr(block, "style").as_deref().and_then(parse_top_em),
            header_event,
            timeline: timeline.is_some(),
        };

        // Tooltip first, then markup fallbacks for whatever it lacks
        let mut fields = self.tooltips.scan(&tooltip);

        if let Some(timeline) = timeline {
            let text = markup.text(timeline);
            if let Some((start, end)) = text.trim().split_once('-') {
                if !start.trim().is_empty() && !end.trim().is_empty() {
                    fields.start_time = normalize_time(start.trim());
                    fields.end_time = normalize_time(end.trim());
                }
            }
        }
        if fields.subject_name().is_none() {
            self.apply_block_content(markup, block, &mut fields, &hints);
        }
        if header_event {
            if fields.subject_name().is_none() {
                fields.title = tooltip.lines().map(str::trim).find(|l| !l.is_empty()).map(str::to_string);
            }
            if !fields.has_times() {
                fields.all_day = true;
                fields.end_time = ALL_DAY.to_string();
            }
        }

        if !fields.is_complete() {
            tracing::debug!("Dropping block {:?} on {}: no subject or time", activity_id, day_date);
            return None;
        }

        let date = fields.date.clone().unwrap_or_else(|| format!("{}-{}", day_date, year));
        if day_of_month(&date) != day_of_month(day_date) {
            tracing::debug!("Dropping block {:?}: dated {} under header {}", activity_id, date, day_date);
            return None;
        }

        let class = self.classifier.classify(&fields, &tooltip, &hints);
        Some(build_item(fields, activity_id, date, class))
    }

    /// Recovers subject, initials, room and topic from the visible block text
    /// (`subject • initials • room [• topic]`) when the tooltip lacks them.
    fn apply_block_content<'a, M: Markup>(
        &self,
        markup: &'a M,
        block: M::Node<'a>,
        fields: &mut TooltipFields,
        hints: &BlockHints,
    ) {
        let Some(content) = markup.first_within(block, Marker::Class(&self.rules.markers.block_content)) else {
            return;
        };
        let text = markup.text(content);
        let parts: Vec<&str> = text.split('•').map(str::trim).collect();

        if parts.len() >= 3 {
            fields.subject = Some(parts[0].to_string());
            fields.teacher_initials = parts[1].to_string();
            fields.room = parts[2].to_string();
            if parts.len() > 3 {
                fields.topic = Some(parts[3..].join(" "));
            }
        } else if parts.len() == 1 && (hints.header_event || hints.timeline) && !parts[0].is_empty() {
            fields.title = Some(parts[0].to_string());
            fields.subject = Some(parts[0].to_string());
        }

        if fields.topic.is_none() {
            fields.topic = markup
                .select_within(content, Marker::Tag("span"))
                .into_iter()
                .find(|span| markup.attr(*span, "style").is_some_and(|s| s.contains("word-wrap")))
                .map(|span| markup.text(span).trim().to_string())
                .filter(|t| !t.is_empty());
        }
    }
}

// --- Helpers ---
fn build_item(fields: TooltipFields, activity_id: Option<String>, date: String, class: Classification) -> ScheduleItem {
    let Classification { item_type, status, module } = class;
    let subject = fields.subject_name().unwrap_or_default().to_string();
    let title = fields
        .title
        .or_else(|| (item_type != ItemType::Class).then(|| subject.clone()));
    let homework = (!fields.homework.is_empty()).then(|| {
        fields
            .homework
            .into_iter()
            .map(|description| Homework { description })
            .collect()
    });

    ScheduleItem {
        id: activity_id.clone(),
        activity_id,
        subject: Subject { name: subject.clone(), code: subject },
        teacher: Teacher { name: fields.teacher_name, initials: fields.teacher_initials },
        room: Room { name: fields.room },
        start_time: fields.start_time,
        end_time: fields.end_time,
        date,
        module,
        status,
        homework,
        notes: fields.notes,
        title,
        topic: fields.topic,
        item_type,
    }
}

/// Leading day number of `D/M` or `D/M-YYYY`.
fn day_of_month(date: &str) -> Option<u32> {
    date.split('/').next()?.trim().parse().ok()
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::markup::{DomMarkup, ScanMarkup};
    use crate::extractors::test_fixtures::WEEK_PAGE;
    use crate::lectio::models::ItemStatus;

    fn days_from<M: Markup>(markup: &M) -> Vec<DaySchedule> {
        let rules = ExtractionRules::default();
        DayExtractor::new(&rules).extract(markup, 2024).unwrap()
    }

    #[test]
    fn test_days_in_header_order_with_weekend_repair() {
        let days = days_from(&DomMarkup::parse(WEEK_PAGE));
        let names: Vec<&str> = days.iter().map(|d| d.day_name.as_str()).collect();
        assert_eq!(names, vec!["Mandag", "Tirsdag", "Lørdag"]);
        assert_eq!(days[2].date, "9/3");
        assert!(days[2].is_weekend);
        assert!(!days[0].is_weekend);
        assert!(days[2].items.is_empty());
    }

    #[test]
    fn test_monday_items() {
        let days = days_from(&DomMarkup::parse(WEEK_PAGE));
        let monday = &days[0];
        let ids: Vec<Option<&str>> = monday.items.iter().map(|i| i.activity_id.as_deref()).collect();
        // ABS1003 is dated the 5th and ABS1004 has no subject: both dropped.
        assert_eq!(ids, vec![Some("ABS1001"), Some("ABS1002"), None]);

        let dansk = &monday.items[0];
        assert_eq!(dansk.subject.name, "2a Dansk");
        assert_eq!(dansk.topic.as_deref(), Some("Romantikken"));
        assert_eq!(dansk.module, 1);
        assert_eq!(dansk.homework_count(), 2);
        assert_eq!(dansk.notes.as_deref(), Some("Husk bogen"));
        assert_eq!(dansk.item_type, ItemType::Class);

        let math = &monday.items[1];
        assert_eq!(math.status, ItemStatus::Changed);
        assert_eq!(math.module, 3);

        let deadline = &monday.items[2];
        assert_eq!(deadline.item_type, ItemType::Deadline);
        assert_eq!(deadline.subject.name, "Afleveringsfrist: Dansk opgave");
        assert_eq!(deadline.end_time, ALL_DAY);
        assert_eq!(deadline.date, "4/3-2024");
        assert_eq!(deadline.module, 0);
    }

    #[test]
    fn test_tuesday_items() {
        let days = days_from(&DomMarkup::parse(WEEK_PAGE));
        let tuesday = &days[1];
        assert_eq!(tuesday.items.len(), 3);

        let english = &tuesday.items[0];
        assert_eq!(english.status, ItemStatus::Cancelled);
        assert_eq!(english.module, 2);

        let sports = &tuesday.items[1];
        assert_eq!(sports.item_type, ItemType::Event);
        assert_eq!(sports.title.as_deref(), Some("Idrætsdag"));
        assert!(sports.is_all_day());
        assert_eq!(sports.start_time, "");

        let chemistry = &tuesday.items[2];
        assert_eq!(chemistry.subject.name, "2a Kemi");
        assert_eq!(chemistry.teacher.initials, "KL");
        assert_eq!(chemistry.room.name, "204");
        assert_eq!(chemistry.topic.as_deref(), Some("Syrer"));
        assert_eq!(chemistry.module, 4);
        assert_eq!(chemistry.item_type, ItemType::Class);
    }

    #[test]
    fn test_scanner_matches_dom() {
        assert_eq!(days_from(&ScanMarkup::parse(WEEK_PAGE)), days_from(&DomMarkup::parse(WEEK_PAGE)));
    }

    #[test]
    fn test_class_items_always_have_subject() {
        for day in days_from(&DomMarkup::parse(WEEK_PAGE)) {
            for item in day.items.iter().filter(|i| i.item_type == ItemType::Class) {
                assert!(!item.subject.name.is_empty());
            }
        }
    }

    #[test]
    fn test_missing_tooltip_date_inherits_header_and_year() {
        let html = r#"<table><tr class="s2dayHeader"><td></td><td>Onsdag (6/3)</td></tr>
            <tr><td data-date="x"><a class="s2skemabrik"><div class="s2skemabrikcontent">Bio • KL • 1</div>
            <div class="s2timeline">9:00 - 10:00</div></a></td></tr></table>"#;
        let page = html.replace("<a class=\"s2skemabrik\">", "<a class=\"s2skemabrik\" data-tooltip=\"Ekskursion\">");
        let days = days_from(&DomMarkup::parse(&page));
        let item = &days[0].items[0];
        assert_eq!(item.date, "6/3-2024");
        assert_eq!(item.start_time, "09:00");
        assert_eq!(item.item_type, ItemType::Event, "timeline blocks are events");
        assert_eq!(item.module, 1);
    }

    #[test]
    fn test_no_day_headers_is_fatal() {
        let rules = ExtractionRules::default();
        let result = DayExtractor::new(&rules).extract(&DomMarkup::parse("<p>Log ind</p>"), 2024);
        assert!(matches!(result, Err(ExtractError::NotSchedulePage(_))));
    }

    #[test]
    fn test_at_most_seven_days() {
        let headers: String = (1..=9).map(|d| format!("<td>Dag ({}/3)</td>", d)).collect();
        let html = format!(r#"<table><tr class="s2dayHeader"><td></td>{}</tr></table>"#, headers);
        for days in [days_from(&DomMarkup::parse(&html)), days_from(&ScanMarkup::parse(&html))] {
            assert_eq!(days.len(), DAYS_PER_WEEK);
            assert_eq!(days[6].date, "7/3");
        }
    }

    #[test]
    fn test_unmatched_headers_give_no_days() {
        let html = r#"<table><tr class="s2dayHeader"><td></td><td>Uge 10</td><td>-</td></tr></table>"#;
        let rules = ExtractionRules::default();
        let result = DayExtractor::new(&rules).extract(&DomMarkup::parse(html), 2024);
        assert_eq!(result, Ok(vec![]));
    }

    #[test]
    fn test_day_of_month() {
        assert_eq!(day_of_month("5/3-2024"), Some(5));
        assert_eq!(day_of_month("12/3"), Some(12));
        assert_eq!(day_of_month(""), None);
    }
}
