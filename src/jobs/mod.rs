/// Ingestion and aggregation jobs driven by the scheduler
///
/// Each job receives its collaborators at construction and reports
/// aggregate counters. Per-batch and per-symbol failures are logged and
/// counted, never propagated; only an unreachable watch-list escapes as
/// an error, because no job can do anything without it.

pub mod daily_bars;
pub mod daily_summary;
pub mod minute_bars;

pub use daily_bars::DailyBarsJob;
pub use daily_summary::{DailySummaryJob, SummaryStats};
pub use minute_bars::MinuteBarsJob;

use crate::database::repositories::InsertOutcome;

/// Counters for one ingestion tick
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Batches attempted
    pub batches: usize,

    /// Batches that failed to fetch or to insert
    pub failed_batches: usize,

    /// Bars received across all successful batches
    pub bars_received: usize,

    /// Rows actually written
    pub rows_inserted: usize,

    /// Rows skipped because their identity already existed
    pub duplicates: usize,
}

impl IngestStats {
    /// Fold one finished batch task into the tick's counters
    pub(crate) fn absorb(&mut self, outcome: BatchOutcome) {
        match outcome {
            BatchOutcome::Ingested { bars, insert } => {
                self.bars_received += bars;
                self.rows_inserted += insert.inserted;
                self.duplicates += insert.duplicates;
            }
            BatchOutcome::Failed => self.failed_batches += 1,
        }
    }
}

/// What one spawned fetch-and-insert task produced
#[derive(Debug)]
pub(crate) enum BatchOutcome {
    Ingested { bars: usize, insert: InsertOutcome },
    Failed,
}
