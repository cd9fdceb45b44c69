// src/extractors/summary.rs
// --- Imports ---
use crate::lectio::models::{DaySchedule, ItemStatus, ItemType, ScheduleSummary};

/// Folds the week's items into counts. Homework and status counts only look at classes.
pub fn summarize(days: &[DaySchedule]) -> ScheduleSummary {
    days.iter()
        .flat_map(|day| &day.items)
        .fold(ScheduleSummary::default(), |mut summary, item| {
            match item.item_type {
                ItemType::Class => {
                    summary.total_classes += 1;
                    summary.total_homework += item.homework_count() as u32;
                    match item.status {
                        ItemStatus::Changed => summary.changed_classes += 1,
                        ItemStatus::Cancelled => summary.cancelled_classes += 1,
                        ItemStatus::Normal => {}
                    }
                }
                ItemType::Event => summary.special_events += 1,
                ItemType::Deadline => summary.deadlines += 1,
            }
            summary
        })
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::lectio::models::{Homework, Room, ScheduleItem, Subject, Teacher};

    fn item(item_type: ItemType, status: ItemStatus, homework: usize) -> ScheduleItem {
        ScheduleItem {
            id: None,
            activity_id: None,
            subject: Subject { name: "X".to_string(), code: "X".to_string() },
            teacher: Teacher::default(),
            room: Room::default(),
            start_time: "08:00".to_string(),
            end_time: "09:00".to_string(),
            date: "4/3-2024".to_string(),
            module: 1,
            status,
            homework: (homework > 0).then(|| {
                (0..homework).map(|i| Homework { description: format!("hw {}", i) }).collect()
            }),
            notes: None,
            title: None,
            topic: None,
            item_type,
        }
    }

    #[test]
    fn test_counts_gate_on_classes() {
        let days = vec![
            DaySchedule {
                date: "4/3".to_string(),
                day_name: "Mandag".to_string(),
                items: vec![
                    item(ItemType::Class, ItemStatus::Normal, 2),
                    item(ItemType::Class, ItemStatus::Changed, 0),
                    // Homework and status on non-classes do not count.
                    item(ItemType::Event, ItemStatus::Cancelled, 3),
                ],
                is_weekend: false,
            },
            DaySchedule {
                date: "5/3".to_string(),
                day_name: "Tirsdag".to_string(),
                items: vec![
                    item(ItemType::Class, ItemStatus::Cancelled, 1),
                    item(ItemType::Deadline, ItemStatus::Changed, 0),
                ],
                is_weekend: false,
            },
        ];

        assert_eq!(
            summarize(&days),
            ScheduleSummary {
                total_classes: 3,
                total_homework: 3,
                changed_classes: 1,
                cancelled_classes: 1,
                special_events: 1,
                deadlines: 1,
            }
        );
    }

    #[test]
    fn test_empty_week() {
        assert_eq!(summarize(&[]), ScheduleSummary::default());
    }
}
