use crate::alpaca::{batch_symbols, MarketData, MAX_REQUEST_TARGET_LEN};
use crate::database::models::NewDailyBar;
use crate::database::repositories::{BarRepository, CompanyRepository};
use crate::database::DatabaseError;
use crate::jobs::{BatchOutcome, IngestStats};
use futures::future::join_all;
use std::sync::Arc;

/// Daily bar ingestion job
///
/// Runs once after the market closes. Fetches today's daily bar for
/// every watched symbol and bulk inserts the results. The feed returns
/// a list per symbol; only the first bar is today's aggregate, so the
/// rest are dropped.
pub struct DailyBarsJob {
    market_data: Arc<dyn MarketData>,
    company_repository: Arc<dyn CompanyRepository>,
    bar_repository: Arc<dyn BarRepository>,
    max_concurrent_batches: usize,
}

impl DailyBarsJob {
    /// Create a new daily bar ingestion job
    pub fn new(
        market_data: Arc<dyn MarketData>,
        company_repository: Arc<dyn CompanyRepository>,
        bar_repository: Arc<dyn BarRepository>,
        max_concurrent_batches: usize,
    ) -> Self {
        Self {
            market_data,
            company_repository,
            bar_repository,
            max_concurrent_batches: max_concurrent_batches.max(1),
        }
    }

    /// Ingest today's daily bar for every watched symbol
    pub async fn run(&self) -> Result<IngestStats, DatabaseError> {
        let companies = self.company_repository.get_all()?;

        if companies.is_empty() {
            tracing::info!("Watch-list is empty, nothing to ingest");
            return Ok(IngestStats::default());
        }

        let symbols: Vec<String> = companies.into_iter().map(|c| c.symbol).collect();
        tracing::debug!("Loaded {} watched symbols", symbols.len());

        let batches = batch_symbols(
            &symbols,
            self.market_data.daily_request_overhead(),
            MAX_REQUEST_TARGET_LEN,
        );

        let mut stats = IngestStats {
            batches: batches.len(),
            ..IngestStats::default()
        };

        for group in batches.chunks(self.max_concurrent_batches) {
            let tasks: Vec<_> = group
                .iter()
                .map(|batch| {
                    let market_data = Arc::clone(&self.market_data);
                    let bar_repository = Arc::clone(&self.bar_repository);
                    let batch = batch.clone();

                    tokio::spawn(async move {
                        ingest_batch(market_data, bar_repository, batch).await
                    })
                })
                .collect();

            for joined in join_all(tasks).await {
                match joined {
                    Ok(outcome) => stats.absorb(outcome),
                    Err(e) => {
                        tracing::error!("Daily bar batch task panicked: {}", e);
                        stats.failed_batches += 1;
                    }
                }
            }
        }

        if stats.bars_received == 0 {
            tracing::info!("No daily bars found to insert");
        }

        tracing::info!(
            "Daily bar ingestion completed: {} batches ({} failed), {} bars received, {} inserted, {} duplicates",
            stats.batches,
            stats.failed_batches,
            stats.bars_received,
            stats.rows_inserted,
            stats.duplicates
        );

        Ok(stats)
    }
}

/// Fetch one symbol batch and insert the first bar of every history
async fn ingest_batch(
    market_data: Arc<dyn MarketData>,
    bar_repository: Arc<dyn BarRepository>,
    batch: String,
) -> BatchOutcome {
    let bars = match market_data.daily_bars_today(&batch).await {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch daily bars for a batch of {} symbols: {}",
                batch.split(',').count(),
                e
            );
            return BatchOutcome::Failed;
        }
    };

    let new_bars: Vec<NewDailyBar> = bars
        .into_iter()
        .filter_map(|(symbol, bars)| {
            bars.into_iter()
                .next()
                .map(|bar| NewDailyBar::from_api(symbol, &bar))
        })
        .collect();
    let received = new_bars.len();

    match bar_repository.insert_daily_bars(new_bars) {
        Ok(insert) => BatchOutcome::Ingested {
            bars: received,
            insert,
        },
        Err(e) => {
            tracing::error!("Failed to insert daily bars: {}", e);
            BatchOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::test_support::{FakeBarRepository, FakeCompanyRepository, FakeMarketData};

    fn job_with(
        market_data: FakeMarketData,
        companies: FakeCompanyRepository,
        bars: Arc<FakeBarRepository>,
    ) -> DailyBarsJob {
        DailyBarsJob::new(Arc::new(market_data), Arc::new(companies), bars, 4)
    }

    #[tokio::test]
    async fn test_run_keeps_only_the_first_bar_per_symbol() {
        // The fake answers with two bars per symbol, closes 100 then 99
        let bars = Arc::new(FakeBarRepository::default());
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::with_symbols(&["AAPL", "MSFT"]),
            Arc::clone(&bars),
        );

        let stats = job.run().await.unwrap();

        assert_eq!(stats.bars_received, 2);
        assert_eq!(stats.rows_inserted, 2);

        let rows = bars.daily_rows.lock().unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.close == 100.0));
    }

    #[tokio::test]
    async fn test_repeated_runs_only_count_duplicates() {
        let bars = Arc::new(FakeBarRepository::default());
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::with_symbols(&["AAPL", "MSFT", "NVDA"]),
            Arc::clone(&bars),
        );

        let first = job.run().await.unwrap();
        let second = job.run().await.unwrap();

        assert_eq!(first.rows_inserted, 3);
        assert_eq!(second.rows_inserted, 0);
        assert_eq!(second.duplicates, 3);
        assert_eq!(bars.daily_rows.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_failure_counts_the_batch_as_failed() {
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::with_symbols(&["AAPL"]),
            Arc::new(FakeBarRepository::failing_inserts()),
        );

        let stats = job.run().await.unwrap();

        assert_eq!(stats.failed_batches, 1);
        assert_eq!(stats.rows_inserted, 0);
    }

    #[tokio::test]
    async fn test_unreadable_watch_list_is_fatal() {
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::failing(),
            Arc::new(FakeBarRepository::default()),
        );

        assert!(job.run().await.is_err());
    }
}
