// src/extractors/rules.rs
//! Heuristic knobs for reading a portal page.
//!
//! The page format is not a contract, so every label, keyword, CSS marker and
//! threshold the extractor relies on lives here. A JSON override only needs
//! the fields it changes; everything else keeps its default.

// --- Imports ---
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractionRules {
    pub labels: TooltipLabels,
    pub markers: PageMarkers,
    /// Case-insensitive; any hit makes an item a deadline.
    pub deadline_keywords: Vec<String>,
    /// A line outside a `Hold:` context that contains `event_day_token` and
    /// one of these (case-insensitive) makes the block an event.
    pub event_keywords: Vec<String>,
    pub event_day_token: String,
    /// Truncated day names the portal renders, and their full form.
    pub day_name_fixes: Vec<(String, String)>,
    pub weekend_days: Vec<String>,
    /// Block `top` offsets (em) below which modules 1..=4 start; anything larger is module 5.
    pub offset_module_limits: [f32; 4],
    /// Start hours below which modules 1..=4 start; anything later is module 5.
    /// Kept separate from the offset table: the two do not line up on every page.
    pub hour_module_limits: [u32; 4],
    /// A first tooltip line must be longer than this to count as a topic.
    pub min_topic_chars: usize,
}

/// Line labels inside a tooltip block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TooltipLabels {
    pub subject: String,
    pub teacher: String,
    pub room: String,
    pub homework: String,
    pub note: String,
    pub all_day: String,
}

/// Classes, ids and attributes that locate page regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageMarkers {
    pub week_header: String,
    pub week_picker_id: String,
    pub school_name: String,
    pub module_info: String,
    pub day_header: String,
    pub day_column_attr: String,
    pub info_header: String,
    pub block: String,
    pub block_content: String,
    pub timeline: String,
    pub tooltip_attr: String,
    pub block_id_attr: String,
    pub changed: String,
    pub cancelled: String,
    pub groups_table_id: String,
    pub subjects_header: String,
    pub involved_groups_header: String,
    pub own_groups_header: String,
}

// --- Defaults ---
impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            labels: TooltipLabels::default(),
            markers: PageMarkers::default(),
            deadline_keywords: strings(&["frist", "deadline"]),
            event_keywords: strings(&["idrætsdag", "weekend", "hele dagen"]),
            event_day_token: "dag".to_string(),
            day_name_fixes: vec![
                ("rdag".to_string(), "Lørdag".to_string()),
                ("ndag".to_string(), "Søndag".to_string()),
            ],
            weekend_days: strings(&["Lørdag", "Søndag"]),
            offset_module_limits: [2.0, 9.0, 18.0, 25.0],
            hour_module_limits: [10, 12, 14, 16],
            min_topic_chars: 3,
        }
    }
}

impl Default for TooltipLabels {
    fn default() -> Self {
        Self {
            subject: "Hold:".to_string(),
            teacher: "Lærer:".to_string(),
            room: "Lokale:".to_string(),
            homework: "Lektier:".to_string(),
            note: "Note:".to_string(),
            all_day: "Hele dagen".to_string(),
        }
    }
}

impl Default for PageMarkers {
    fn default() -> Self {
        Self {
            week_header: "s2weekHeader".to_string(),
            week_picker_id: "s_m_Content_Content_SkemaMedNavigation_datePicker_tb".to_string(),
            school_name: "ls-master-header-institution-name".to_string(),
            module_info: "s2module-info".to_string(),
            day_header: "s2dayHeader".to_string(),
            day_column_attr: "data-date".to_string(),
            info_header: "s2infoHeader".to_string(),
            block: "s2skemabrik".to_string(),
            block_content: "s2skemabrikcontent".to_string(),
            timeline: "s2timeline".to_string(),
            tooltip_attr: "data-tooltip".to_string(),
            block_id_attr: "data-brikid".to_string(),
            changed: "s2changed".to_string(),
            cancelled: "s2cancelled".to_string(),
            groups_table_id: "s_m_Content_Content_holdElementLinkList".to_string(),
            subjects_header: "Hold:".to_string(),
            involved_groups_header: "Indb. grupper:".to_string(),
            own_groups_header: "Egne grupper:".to_string(),
        }
    }
}

impl ExtractionRules {
    /// Loads an override file; missing fields fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Full day name for a header fragment, repairing truncated weekend names.
    pub fn day_name(&self, raw: &str) -> String {
        self.day_name_fixes
            .iter()
            .find(|(fragment, _)| fragment == raw)
            .map_or_else(|| raw.to_string(), |(_, full)| full.clone())
    }

    pub fn is_weekend(&self, day_name: &str) -> bool {
        self.weekend_days.iter().any(|d| d == day_name)
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
