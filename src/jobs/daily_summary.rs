use crate::database::repositories::{BarRepository, CompanyRepository, SummaryRepository};
use crate::database::DatabaseError;
use crate::indicators::{compute_daily_summary, SummaryOutcome, REQUIRED_DAILY_BARS};
use chrono::{DateTime, Datelike, Utc, Weekday};
use std::sync::Arc;

/// Counters for one end-of-day summary pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SummaryStats {
    /// Symbols on the watch-list
    pub symbols: usize,

    /// Summaries computed from a full history window
    pub computed: usize,

    /// Symbols skipped for lack of history
    pub insufficient: usize,

    /// Symbols whose history could not be read
    pub failed: usize,

    /// Summary rows actually written
    pub rows_inserted: usize,

    /// Summary rows skipped because today's row already existed
    pub duplicates: usize,

    /// Whole pass skipped because the date falls on a weekend
    pub skipped_weekend: bool,
}

/// Daily summary job
///
/// Runs once per trading day after the daily bars have landed. For
/// every watched symbol it loads the most recent daily bars, derives
/// the day's technical indicators, and bulk inserts the summary rows.
/// Symbols without enough history are skipped and picked up once their
/// history fills out.
pub struct DailySummaryJob {
    company_repository: Arc<dyn CompanyRepository>,
    bar_repository: Arc<dyn BarRepository>,
    summary_repository: Arc<dyn SummaryRepository>,
}

impl DailySummaryJob {
    /// Create a new daily summary job
    pub fn new(
        company_repository: Arc<dyn CompanyRepository>,
        bar_repository: Arc<dyn BarRepository>,
        summary_repository: Arc<dyn SummaryRepository>,
    ) -> Self {
        Self {
            company_repository,
            bar_repository,
            summary_repository,
        }
    }

    /// Compute and store today's summary for every watched symbol
    ///
    /// `now` decides the weekend skip; the summary dates themselves
    /// come from the newest stored bar of each symbol.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<SummaryStats, DatabaseError> {
        if is_weekend(now.weekday()) {
            tracing::info!("Market is closed for the weekend, skipping the daily summary pass");
            return Ok(SummaryStats {
                skipped_weekend: true,
                ..SummaryStats::default()
            });
        }

        let companies = self.company_repository.get_all()?;

        let mut stats = SummaryStats {
            symbols: companies.len(),
            ..SummaryStats::default()
        };
        let mut summaries = Vec::new();

        for company in &companies {
            let bars = match self
                .bar_repository
                .recent_daily_bars(&company.symbol, REQUIRED_DAILY_BARS as i64)
            {
                Ok(bars) => bars,
                Err(e) => {
                    tracing::error!("Failed to load daily bars for {}: {}", company.symbol, e);
                    stats.failed += 1;
                    continue;
                }
            };

            match compute_daily_summary(&company.symbol, &bars) {
                SummaryOutcome::Computed(summary) => {
                    summaries.push(summary);
                    stats.computed += 1;
                }
                SummaryOutcome::InsufficientData { have, need } => {
                    tracing::info!(
                        "Skipping daily summary for {}: {} of {} required daily bars",
                        company.symbol,
                        have,
                        need
                    );
                    stats.insufficient += 1;
                }
            }
        }

        if !summaries.is_empty() {
            match self.summary_repository.insert_summaries(summaries) {
                Ok(insert) => {
                    stats.rows_inserted = insert.inserted;
                    stats.duplicates = insert.duplicates;
                }
                Err(e) => {
                    // Inputs are still in the bars tables; the next
                    // closed-market pass recomputes from the same data
                    tracing::error!("Failed to insert daily summaries: {}", e);
                }
            }
        }

        tracing::info!(
            "Daily summary pass completed: {} symbols, {} computed, {} insufficient, {} failed, {} inserted, {} duplicates",
            stats.symbols,
            stats.computed,
            stats.insufficient,
            stats.failed,
            stats.rows_inserted,
            stats.duplicates
        );

        Ok(stats)
    }
}

/// Exchange calendars never put a session on Saturday or Sunday
pub(crate) fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}
