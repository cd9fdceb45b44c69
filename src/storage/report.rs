// src/storage/report.rs
use std::fmt::Write;

use crate::lectio::models::{ItemStatus, ItemType, ScheduleItem, WeekSchedule};

/// Plain-text rendering of a week: a header, one block per day, then the summary.
pub fn render_report(schedule: &WeekSchedule) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, schedule);
    out
}

fn write_report(out: &mut String, schedule: &WeekSchedule) -> std::fmt::Result {
    writeln!(out, "Uge {} - {}", schedule.week_number, schedule.year)?;
    if !schedule.week_range.is_empty() {
        writeln!(out, "{}", schedule.week_range)?;
    }
    if !schedule.student.name.is_empty() {
        writeln!(out, "{} ({})", schedule.student.name, schedule.student.class)?;
    }
    if !schedule.school.is_empty() {
        writeln!(out, "{}", schedule.school)?;
    }

    if !schedule.modules.is_empty() {
        writeln!(out)?;
        writeln!(out, "Moduler")?;
        for module in &schedule.modules {
            writeln!(out, "  {}  {:<10} {}", module.number, module.name, module.time_range)?;
        }
    }

    for day in &schedule.days {
        writeln!(out)?;
        writeln!(out, "{} {}", day.day_name, day.date)?;
        if day.items.is_empty() {
            writeln!(out, "  -")?;
        }
        for item in &day.items {
            writeln!(out, "  {}", item_line(item))?;
            if let Some(topic) = &item.topic {
                writeln!(out, "      {}", topic)?;
            }
            for homework in item.homework.iter().flatten() {
                writeln!(out, "      * {}", homework.description)?;
            }
            if let Some(notes) = &item.notes {
                writeln!(out, "      Note: {}", notes)?;
            }
        }
    }

    let groups = &schedule.student_groups;
    for (label, names) in [
        ("Hold", &groups.subjects),
        ("Indb. grupper", &groups.involved_groups),
        ("Egne grupper", &groups.own_groups),
    ] {
        if !names.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}: {}", label, names.join(", "))?;
        }
    }

    let s = &schedule.summary;
    writeln!(out)?;
    writeln!(
        out,
        "{} classes, {} homework, {} changed, {} cancelled, {} events, {} deadlines",
        s.total_classes, s.total_homework, s.changed_classes, s.cancelled_classes, s.special_events, s.deadlines
    )
}

fn item_line(item: &ScheduleItem) -> String {
    let time = if item.is_all_day() {
        item.end_time.clone()
    } else {
        format!("{}-{}", item.start_time, item.end_time)
    };
    let mut line = format!("{:<11} {}", time, item.subject.name);
    if !item.teacher.initials.is_empty() {
        line.push_str(&format!(" [{}]", item.teacher.initials));
    }
    if !item.room.name.is_empty() {
        line.push_str(&format!(" @ {}", item.room.name));
    }
    match item.item_type {
        ItemType::Event => line.push_str(" (event)"),
        ItemType::Deadline => line.push_str(" (deadline)"),
        ItemType::Class => {}
    }
    match item.status {
        ItemStatus::Changed => line.push_str(" *changed*"),
        ItemStatus::Cancelled => line.push_str(" *cancelled*"),
        ItemStatus::Normal => {}
    }
    line
}
