use crate::alpaca::{batch_symbols, MarketData, MAX_REQUEST_TARGET_LEN};
use crate::database::models::NewMinuteBar;
use crate::database::repositories::{BarRepository, CompanyRepository};
use crate::database::DatabaseError;
use crate::jobs::{BatchOutcome, IngestStats};
use futures::future::join_all;
use std::sync::Arc;

/// Minute bar ingestion job
///
/// Runs once per minute while the market is open. Fetches the latest
/// minute bar for every watched symbol, batched to stay under the API
/// request-target ceiling, and bulk inserts the results. Batches are
/// fetched concurrently in bounded groups and each group is joined
/// before the next starts.
pub struct MinuteBarsJob {
    market_data: Arc<dyn MarketData>,
    company_repository: Arc<dyn CompanyRepository>,
    bar_repository: Arc<dyn BarRepository>,
    max_concurrent_batches: usize,
}

impl MinuteBarsJob {
    /// Create a new minute bar ingestion job
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

    /// Ingest the latest minute bar for every watched symbol
    ///
    /// Failed batches are logged and counted without aborting the rest
    /// of the tick. Only an unreadable watch-list is returned as an
    /// error.
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
            self.market_data.minute_request_overhead(),
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
                        tracing::error!("Minute bar batch task panicked: {}", e);
                        stats.failed_batches += 1;
                    }
                }
            }
        }

        tracing::info!(
            "Minute bar ingestion completed: {} batches ({} failed), {} bars received, {} inserted, {} duplicates",
            stats.batches,
            stats.failed_batches,
            stats.bars_received,
            stats.rows_inserted,
            stats.duplicates
        );

        Ok(stats)
    }
}

/// Fetch one symbol batch and bulk insert whatever came back
async fn ingest_batch(
    market_data: Arc<dyn MarketData>,
    bar_repository: Arc<dyn BarRepository>,
    batch: String,
) -> BatchOutcome {
    let bars = match market_data.latest_minute_bars(&batch).await {
        Ok(bars) => bars,
        Err(e) => {
            tracing::warn!(
                "Failed to fetch latest minute bars for a batch of {} symbols: {}",
                batch.split(',').count(),
                e
            );
            return BatchOutcome::Failed;
        }
    };

    let new_bars: Vec<NewMinuteBar> = bars
        .into_iter()
        .map(|(symbol, bar)| NewMinuteBar::from_api(symbol, &bar))
        .collect();
    let received = new_bars.len();

    match bar_repository.insert_minute_bars(new_bars) {
        Ok(insert) => BatchOutcome::Ingested {
            bars: received,
            insert,
        },
        Err(e) => {
            tracing::error!("Failed to insert minute bars: {}", e);
            BatchOutcome::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::test_support::{FakeBarRepository, FakeCompanyRepository, FakeMarketData};
    use std::sync::atomic::Ordering;

    fn job_with(
        market_data: FakeMarketData,
        companies: FakeCompanyRepository,
        bars: Arc<FakeBarRepository>,
    ) -> MinuteBarsJob {
        MinuteBarsJob::new(Arc::new(market_data), Arc::new(companies), bars, 4)
    }

    #[tokio::test]
    async fn test_run_ingests_every_watched_symbol() {
        let bars = Arc::new(FakeBarRepository::default());
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::with_symbols(&["AAPL", "MSFT", "NVDA"]),
            Arc::clone(&bars),
        );

        let stats = job.run().await.unwrap();

        assert_eq!(stats.batches, 1);
        assert_eq!(stats.failed_batches, 0);
        assert_eq!(stats.bars_received, 3);
        assert_eq!(stats.rows_inserted, 3);
        assert_eq!(stats.duplicates, 0);

        let mut stored: Vec<String> = bars
            .minute_rows
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.symbol.clone())
            .collect();
        stored.sort();
        assert_eq!(stored, vec!["AAPL", "MSFT", "NVDA"]);
    }

    #[tokio::test]
    async fn test_repeated_ticks_only_count_duplicates() {
        let bars = Arc::new(FakeBarRepository::default());
        let job = job_with(
            FakeMarketData::new(),
            FakeCompanyRepository::with_symbols(&["AAPL", "MSFT"]),
            Arc::clone(&bars),
        );

        let first = job.run().await.unwrap();
        let second = job.run().await.unwrap();

        assert_eq!(first.rows_inserted, 2);
        assert_eq!(second.rows_inserted, 0);
        assert_eq!(second.duplicates, 2);
        assert_eq!(bars.minute_rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_batch_does_not_abort_the_others() {
        // Overhead 2040 against the 2048 ceiling leaves room for two
        // three-character symbols per request
        let mut market_data = FakeMarketData::with_poison("CCC");
        market_data.request_overhead = 2040;

        let bars = Arc::new(FakeBarRepository::default());
        let job = job_with(
            market_data,
            FakeCompanyRepository::with_symbols(&["AAA", "BBB", "CCC", "DDD"]),
            Arc::clone(&bars),
        );

        let stats = job.run().await.unwrap();

        assert_eq!(stats.batches, 2);
        assert_eq!(stats.failed_batches, 1);
        assert_eq!(stats.rows_inserted, 2);

        let mut stored: Vec<String> = bars
            .minute_rows
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.symbol.clone())
            .collect();
        stored.sort();
        assert_eq!(stored, vec!["AAA", "BBB"]);
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
    async fn test_empty_watch_list_makes_no_requests() {
        let market_data = Arc::new(FakeMarketData::new());
        let job = MinuteBarsJob::new(
            Arc::clone(&market_data) as Arc<dyn MarketData>,
            Arc::new(FakeCompanyRepository::with_symbols(&[])),
            Arc::new(FakeBarRepository::default()),
            4,
        );

        let stats = job.run().await.unwrap();

        assert_eq!(stats, IngestStats::default());
        assert_eq!(market_data.minute_calls.load(Ordering::SeqCst), 0);
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
