// src/extractors/instrument.rs
// --- Imports ---
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Receives named start/stop events for each extraction stage.
pub trait Instrument {
    fn start(&self, stage: &str);
    fn stop(&self, stage: &str);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInstrument;

impl Instrument for NoopInstrument {
    fn start(&self, _stage: &str) {}
    fn stop(&self, _stage: &str) {}
}

// --- Stage Timer ---
#[derive(Debug)]
struct StageRecord {
    name: String,
    started: Instant,
    elapsed: Option<Duration>,
}

/// Measures wall time per stage and logs each one at debug level.
#[derive(Debug, Default)]
pub struct StageTimer {
    records: Mutex<Vec<StageRecord>>,
}

impl StageTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finished stages in the order they were started.
    pub fn durations(&self) -> Vec<(String, Duration)> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .iter()
            .filter_map(|r| r.elapsed.map(|elapsed| (r.name.clone(), elapsed)))
            .collect()
    }

    pub fn summary(&self) -> String {
        let durations = self.durations();
        let mut out = String::from("Timing summary\n");
        let width = durations.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
        for (name, elapsed) in &durations {
            out.push_str(&format!("  {:<width$}  {:>9.2}ms\n", name, millis(*elapsed), width = width));
        }
        out
    }
}

impl Instrument for StageTimer {
    fn start(&self, stage: &str) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records.push(StageRecord { name: stage.to_string(), started: Instant::now(), elapsed: None });
    }

    fn stop(&self, stage: &str) {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(record) = records.iter_mut().find(|r| r.name == stage && r.elapsed.is_none()) {
            let elapsed = record.started.elapsed();
            record.elapsed = Some(elapsed);
            tracing::debug!("{}: {:.2}ms", stage, millis(elapsed));
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Runs `f` between `start(stage)` and `stop(stage)`.
pub fn timed<T>(instrument: &dyn Instrument, stage: &str, f: impl FnOnce() -> T) -> T {
    instrument.start(stage);
    let result = f();
    instrument.stop(stage);
    result
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_records_finished_stages_in_order() {
        let timer = StageTimer::new();
        timed(&timer, "outer", || {
            timed(&timer, "inner", || ());
        });
        timer.start("unfinished");

        let names: Vec<String> = timer.durations().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["outer".to_string(), "inner".to_string()]);
        assert!(timer.summary().contains("inner"));
        assert!(!timer.summary().contains("unfinished"));
    }

    #[test]
    fn test_stop_without_start_is_ignored() {
        let timer = StageTimer::new();
        timer.stop("never-started");
        assert!(timer.durations().is_empty());
    }
}
