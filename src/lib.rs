// src/lib.rs
//! Turns a rendered Lectio weekly schedule page into a typed [`WeekSchedule`].

pub mod extractors;
pub mod lectio;
pub mod storage;
pub mod utils;

pub use extractors::{extract, Backend, ExtractionRules, ScheduleExtractor};
pub use lectio::{ScheduleResponse, WeekSchedule};
pub use utils::{AppError, ExtractError, PortalError, StorageError};
