// src/extractors/schedule.rs

// --- Imports ---
use crate::extractors::days::DayExtractor;
use crate::extractors::instrument::{timed, Instrument, NoopInstrument};
use crate::extractors::markup::{DomMarkup, Markup, ScanMarkup};
use crate::extractors::meta;
use crate::extractors::rules::ExtractionRules;
use crate::extractors::summary::summarize;
use crate::lectio::models::WeekSchedule;
use crate::utils::error::ExtractError;

/// Which [`Markup`] provider reads the page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    /// Full html5ever DOM.
    #[default]
    Dom,
    /// Regex tag scanner, no DOM.
    Scanner,
}

/// Turns a rendered schedule page into a [`WeekSchedule`].
///
/// Holds nothing but its rules, so one extractor can serve any number of
/// pages, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct ScheduleExtractor {
    rules: ExtractionRules,
}

impl ScheduleExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: ExtractionRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &ExtractionRules {
        &self.rules
    }

    /// Extracts with the DOM backend and no instrumentation.
    pub fn extract(&self, html: &str) -> Result<WeekSchedule, ExtractError> {
        self.extract_with(html, Backend::Dom, &NoopInstrument)
    }

    pub fn extract_with(
        &self,
        html: &str,
        backend: Backend,
        instrument: &dyn Instrument,
    ) -> Result<WeekSchedule, ExtractError> {
        tracing::debug!("Extracting schedule from {} bytes with {:?} backend", html.len(), backend);
        match backend {
            Backend::Dom => {
                let markup = timed(instrument, "markup-parsing", || DomMarkup::parse(html));
                self.extract_markup(&markup, instrument)
            }
            Backend::Scanner => {
                let markup = timed(instrument, "markup-parsing", || ScanMarkup::parse(html));
                self.extract_markup(&markup, instrument)
            }
        }
    }

    /// Runs every stage over already-parsed markup.
    pub fn extract_markup<M: Markup>(
        &self,
        markup: &M,
        instrument: &dyn Instrument,
    ) -> Result<WeekSchedule, ExtractError> {
        let rules = &self.rules;
        instrument.start("extraction-total");

        let week = timed(instrument, "extract-week-info", || meta::extract_week_info(markup, rules));
        let student = timed(instrument, "extract-student-info", || meta::extract_student(markup));
        let school = timed(instrument, "extract-school-info", || meta::extract_school(markup, rules));
        let modules = timed(instrument, "extract-modules", || meta::extract_modules(markup, rules));
        let days = timed(instrument, "extract-days", || {
            DayExtractor::new(rules).extract(markup, week.year)
        });
        let days = match days {
            Ok(days) => days,
            Err(e) => {
                instrument.stop("extraction-total");
                return Err(e);
            }
        };
        let student_groups = timed(instrument, "extract-student-groups", || meta::extract_groups(markup, rules));
        let summary = timed(instrument, "generate-summary", || summarize(&days));

        instrument.stop("extraction-total");
        tracing::debug!(
            "Extracted week {} ({}): {} days, {} classes",
            week.week_number,
            week.year,
            days.len(),
            summary.total_classes
        );

        Ok(WeekSchedule {
            week_number: week.week_number,
            year: week.year,
            week_range: week.week_range,
            student,
            school,
            days,
            modules,
            student_groups,
            summary,
        })
    }
}

/// Extracts a schedule page with the default rules and the DOM backend.
pub fn extract(html: &str) -> Result<WeekSchedule, ExtractError> {
    ScheduleExtractor::new().extract(html)
}
