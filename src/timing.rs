//! Per-stage latency accounting for the retrieval pipeline.
//!
//! Timing is advisory: a stage is measured whether it succeeds or fails,
//! and nothing recorded here may influence control flow or results.

use std::time::{Duration, Instant};

/// Pipeline stages measured per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Embedding,
    Search,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Embedding => "embedding",
            Stage::Search => "search",
        }
    }
}

/// Observer for stage latencies. Called on success and failure paths;
/// implementations must not block.
pub trait RetrievalMetrics: Send + Sync {
    fn record_stage(&self, stage: Stage, latency: Duration, ok: bool);
}

/// Wall-clock bracket around one stage.
pub(crate) struct StageSpan {
    stage: Stage,
    start: Instant,
}

impl StageSpan {
    pub(crate) fn start(stage: Stage) -> Self {
        Self {
            stage,
            start: Instant::now(),
        }
    }

    /// Stop the span. The elapsed time reflects time-to-failure when the
    /// stage did not succeed.
    pub(crate) fn finish(self, metrics: Option<&dyn RetrievalMetrics>, ok: bool) -> Duration {
        let elapsed = self.start.elapsed();
        if let Some(metrics) = metrics {
            metrics.record_stage(self.stage, elapsed, ok);
        }
        tracing::debug!(
            stage = self.stage.as_str(),
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            ok,
            "stage finished"
        );
        elapsed
    }
}

/// Elapsed wall-clock time per stage for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageTimings {
    pub embedding: Duration,
    pub search: Duration,
}

impl StageTimings {
    /// Total elapsed time, defined as the sum of the stage times.
    pub fn total(&self) -> Duration {
        self.embedding + self.search
    }

    /// Percentage share of the total spent in `stage`; zero when the total
    /// itself is zero.
    pub fn percent(&self, stage: Stage) -> f64 {
        let total = self.total().as_secs_f64();
        if total == 0.0 {
            return 0.0;
        }
        let part = match stage {
            Stage::Embedding => self.embedding,
            Stage::Search => self.search,
        };
        part.as_secs_f64() / total * 100.0
    }

    /// Per-stage breakdown rows for logs and API responses.
    pub fn breakdown(&self) -> [StageShare; 2] {
        [
            StageShare {
                stage: Stage::Embedding.as_str(),
                elapsed_ms: self.embedding.as_secs_f64() * 1000.0,
                percent: self.percent(Stage::Embedding),
            },
            StageShare {
                stage: Stage::Search.as_str(),
                elapsed_ms: self.search.as_secs_f64() * 1000.0,
                percent: self.percent(Stage::Search),
            },
        ]
    }
}

/// One row of the derived latency breakdown.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct StageShare {
    pub stage: &'static str,
    pub elapsed_ms: f64,
    pub percent: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_is_sum_of_stages() {
        let timings = StageTimings {
            embedding: Duration::from_millis(60),
            search: Duration::from_millis(40),
        };
        assert_eq!(timings.total(), Duration::from_millis(100));
    }

    #[test]
    fn percentages_sum_to_one_hundred() {
        let timings = StageTimings {
            embedding: Duration::from_millis(75),
            search: Duration::from_millis(25),
        };
        let sum = timings.percent(Stage::Embedding) + timings.percent(Stage::Search);
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((timings.percent(Stage::Embedding) - 75.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_yields_zero_shares() {
        let timings = StageTimings {
            embedding: Duration::ZERO,
            search: Duration::ZERO,
        };
        assert_eq!(timings.percent(Stage::Embedding), 0.0);
        assert_eq!(timings.percent(Stage::Search), 0.0);
    }

    #[test]
    fn breakdown_labels_both_stages() {
        let timings = StageTimings {
            embedding: Duration::from_millis(10),
            search: Duration::from_millis(30),
        };
        let rows = timings.breakdown();
        assert_eq!(rows[0].stage, "embedding");
        assert_eq!(rows[1].stage, "search");
        assert!((rows[0].elapsed_ms - 10.0).abs() < 1e-9);
        assert!((rows[1].percent - 75.0).abs() < 1e-9);
    }

    #[test]
    fn span_reports_failure_outcome_to_observer() {
        use std::sync::Mutex;

        #[derive(Default)]
        struct Events(Mutex<Vec<(&'static str, bool)>>);
        impl RetrievalMetrics for Events {
            fn record_stage(&self, stage: Stage, _latency: Duration, ok: bool) {
                self.0.lock().unwrap().push((stage.as_str(), ok));
            }
        }

        let events = Events::default();
        StageSpan::start(Stage::Embedding).finish(Some(&events), false);
        StageSpan::start(Stage::Search).finish(Some(&events), true);

        let seen = events.0.lock().unwrap().clone();
        assert_eq!(seen, vec![("embedding", false), ("search", true)]);
    }
}
