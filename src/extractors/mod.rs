// src/extractors/mod.rs
pub mod classify;
pub mod days;
pub mod instrument;
pub mod markup;
pub mod meta;
pub mod rules;
pub mod schedule;
pub mod summary;
pub mod tooltip;

#[cfg(test)]
pub(crate) mod test_fixtures;

// Re-export key extraction types for convenience
pub use instrument::{Instrument, NoopInstrument, StageTimer};
pub use markup::{DomMarkup, Markup, Marker, ScanMarkup};
pub use rules::ExtractionRules;
pub use schedule::{extract, Backend, ScheduleExtractor};
