// src/lectio/models.rs
use serde::{Deserialize, Serialize};

/// End time carried by whole-day entries instead of a clock time.
pub const ALL_DAY: &str = "Hele dagen";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Teacher {
    pub name: String,
    pub initials: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Homework {
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    #[default]
    Normal,
    Changed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    #[default]
    Class,
    Event,
    Deadline,
}

/// One lesson, event or deadline as shown in the week grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
    pub subject: Subject,
    pub teacher: Teacher,
    pub room: Room,
    /// `HH:MM`, empty for whole-day entries.
    pub start_time: String,
    /// `HH:MM`, or [`ALL_DAY`].
    pub end_time: String,
    /// `D/M-YYYY`.
    pub date: String,
    /// Teaching period 1-5, 0 when it could not be inferred.
    pub module: u8,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homework: Option<Vec<Homework>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

impl ScheduleItem {
    pub fn is_all_day(&self) -> bool {
        self.end_time == ALL_DAY
    }

    pub fn homework_count(&self) -> usize {
        self.homework.as_ref().map_or(0, Vec::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    /// `D/M` as printed in the day header; the year lives on [`WeekSchedule`].
    pub date: String,
    pub day_name: String,
    pub items: Vec<ScheduleItem>,
    pub is_weekend: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub number: u32,
    pub name: String,
    pub time_range: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub class: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGroups {
    pub subjects: Vec<String>,
    pub involved_groups: Vec<String>,
    pub own_groups: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_classes: u32,
    pub total_homework: u32,
    pub changed_classes: u32,
    pub cancelled_classes: u32,
    pub special_events: u32,
    pub deadlines: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekSchedule {
    pub week_number: u32,
    pub year: i32,
    pub week_range: String,
    pub student: Student,
    pub school: String,
    pub days: Vec<DaySchedule>,
    pub modules: Vec<Module>,
    pub student_groups: StudentGroups,
    pub summary: ScheduleSummary,
}

/// JSON envelope handed to API consumers, with a change hash for conditional requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResponse {
    pub schedule: WeekSchedule,
    pub next_hash: String,
    /// Milliseconds since the Unix epoch.
    pub updated_at: i64,
}

impl ScheduleResponse {
    pub fn new(schedule: WeekSchedule) -> Self {
        let updated_at = chrono::Utc::now().timestamp_millis();
        Self::at(schedule, updated_at)
    }

    pub fn at(schedule: WeekSchedule, updated_at: i64) -> Self {
        let next_hash = summary_hash(&schedule.summary);
        Self { schedule, next_hash, updated_at }
    }

    /// Quoted entity tag for the `ETag` header.
    pub fn etag(&self) -> String {
        format!("\"{}\"", self.next_hash)
    }

    /// True when an `If-None-Match` value names this response's hash.
    pub fn is_not_modified(&self, if_none_match: &str) -> bool {
        if_none_match.replace('"', "").trim() == self.next_hash
    }
}

/// FNV-1a (32 bit) over the summary's JSON, as 8 lowercase hex digits.
pub fn summary_hash(summary: &ScheduleSummary) -> String {
    // A struct of plain integers always serializes.
    let json = serde_json::to_string(summary).unwrap_or_default();
    format!("{:08x}", fnv1a(json.as_bytes()))
}

fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5_u32, |h, b| {
        (h ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    })
}
