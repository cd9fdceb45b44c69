// src/lectio/mod.rs
pub mod client;
pub mod models;

pub use models::{
    DaySchedule, Homework, ItemStatus, ItemType, Module, Room, ScheduleItem, ScheduleResponse,
    ScheduleSummary, Student, StudentGroups, Subject, Teacher, WeekSchedule, ALL_DAY,
};
