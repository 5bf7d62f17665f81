use crate::alpaca::{MarketData, MarketStatus};
use crate::config::SchedulerConfig;
use crate::database::DatabaseError;
use crate::jobs::{DailyBarsJob, DailySummaryJob, MinuteBarsJob};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

/// Scheduler errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Where the ingestion loop currently is
///
/// Every pass through the loop consumes the current state and yields
/// the next one; there is no terminal state short of shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Ask the market clock what to do next
    Checking,

    /// Market is open: ingest the latest minute bars, then sleep past
    /// the next minute boundary
    OpenPolling,

    /// Market is closed: ingest today's daily bars, derive summaries,
    /// then sleep until the next session opens
    ClosedAggregating { next_open: DateTime<Utc> },

    /// Wait, then go back to the clock
    Sleeping { duration: Duration },
}

/// Market-clock driven ingestion scheduler
///
/// Owns the three jobs and decides when each runs. The loop follows
/// the exchange calendar through the clock endpoint instead of fixed
/// cron times, so half days and holidays need no special casing.
pub struct Scheduler {
    market_data: Arc<dyn MarketData>,
    minute_bars_job: MinuteBarsJob,
    daily_bars_job: DailyBarsJob,
    daily_summary_job: DailySummaryJob,
    config: SchedulerConfig,
}

impl Scheduler {
    /// Create a new scheduler
    pub fn new(
        market_data: Arc<dyn MarketData>,
        minute_bars_job: MinuteBarsJob,
        daily_bars_job: DailyBarsJob,
        daily_summary_job: DailySummaryJob,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            market_data,
            minute_bars_job,
            daily_bars_job,
            daily_summary_job,
            config,
        }
    }

    /// Drive the ingestion loop until shutdown is signalled
    ///
    /// Clock failures back off and retry; job-level batch failures are
    /// already absorbed inside the jobs. Only a lost database
    /// connection ends the loop with an error.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<(), SchedulerError> {
        tracing::info!("🕐 Scheduler started");

        let mut state = SchedulerState::Checking;

        loop {
            if *shutdown.borrow() {
                break;
            }

            state = match state {
                SchedulerState::Checking => match self.market_data.market_status().await {
                    Ok(status) => Self::after_clock(&status),
                    Err(e) => {
                        tracing::warn!(
                            "Failed to read the market clock, retrying in {:?}: {}",
                            self.config.clock_retry_backoff,
                            e
                        );
                        SchedulerState::Sleeping {
                            duration: self.config.clock_retry_backoff,
                        }
                    }
                },
                SchedulerState::OpenPolling => {
                    self.minute_bars_job.run().await?;

                    SchedulerState::Sleeping {
                        duration: minute_poll_delay(Utc::now(), self.config.minute_lag),
                    }
                }
                SchedulerState::ClosedAggregating { next_open } => {
                    self.daily_bars_job.run().await?;
                    self.daily_summary_job.run(Utc::now()).await?;

                    let pause = sleep_until_open(next_open, Utc::now());
                    if pause.is_zero() {
                        SchedulerState::Checking
                    } else {
                        tracing::info!("Market closed, sleeping {:?} until the next open", pause);
                        SchedulerState::Sleeping { duration: pause }
                    }
                }
                SchedulerState::Sleeping { duration } => {
                    tokio::select! {
                        _ = tokio::time::sleep(duration) => {}
                        _ = shutdown.changed() => {}
                    }

                    SchedulerState::Checking
                }
            };
        }

        tracing::info!("✅ Scheduler stopped");

        Ok(())
    }

    fn after_clock(status: &MarketStatus) -> SchedulerState {
        if status.is_open {
            tracing::debug!("Market is open, polling minute bars");
            SchedulerState::OpenPolling
        } else {
            tracing::debug!("Market is closed, aggregating (next open {})", status.next_open);
            SchedulerState::ClosedAggregating {
                next_open: status.next_open,
            }
        }
    }
}

/// Delay from `now` to just past the next minute boundary
///
/// The feed finalizes a minute bar shortly after its minute rolls
/// over, so each poll lands `lag` seconds after the boundary.
fn minute_poll_delay(now: DateTime<Utc>, lag: Duration) -> Duration {
    let into_minute = now.timestamp().rem_euclid(60) as u64;

    Duration::from_secs(60 - into_minute) + lag
}

/// Time left until the next session opens, zero if already past
fn sleep_until_open(next_open: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (next_open - now).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::test_support::{
        closed_status, open_status, FakeBarRepository, FakeCompanyRepository, FakeMarketData,
        FakeSummaryRepository,
    };
    use chrono::TimeZone;
    use std::sync::atomic::Ordering;

    fn test_config() -> SchedulerConfig {
        SchedulerConfig {
            max_concurrent_batches: 4,
            minute_lag: Duration::from_secs(10),
            clock_retry_backoff: Duration::from_millis(50),
        }
    }

    fn scheduler_with(
        market_data: Arc<FakeMarketData>,
        bars: Arc<FakeBarRepository>,
        summaries: Arc<FakeSummaryRepository>,
    ) -> Scheduler {
        let companies = Arc::new(FakeCompanyRepository::with_symbols(&["AAPL"]));
        let config = test_config();

        Scheduler::new(
            Arc::clone(&market_data),
            MinuteBarsJob::new(
                Arc::clone(&market_data),
                Arc::clone(&companies),
                Arc::clone(&bars),
                config.max_concurrent_batches,
            ),
            DailyBarsJob::new(
                Arc::clone(&market_data),
                Arc::clone(&companies),
                Arc::clone(&bars),
                config.max_concurrent_batches,
            ),
            DailySummaryJob::new(companies, bars, summaries),
            config,
        )
    }

    #[test]
    fn test_open_market_moves_to_minute_polling() {
        let state = Scheduler::after_clock(&open_status());

        assert_eq!(state, SchedulerState::OpenPolling);
    }

    #[test]
    fn test_closed_market_moves_to_aggregation() {
        let status = closed_status(chrono::Duration::hours(2));
        let state = Scheduler::after_clock(&status);

        assert_eq!(
            state,
            SchedulerState::ClosedAggregating {
                next_open: status.next_open
            }
        );
    }

    #[test]
    fn test_minute_poll_delay_lands_past_the_boundary() {
        let lag = Duration::from_secs(10);

        let mid_minute = Utc.with_ymd_and_hms(2024, 11, 1, 15, 0, 30).unwrap();
        assert_eq!(minute_poll_delay(mid_minute, lag), Duration::from_secs(40));

        let on_boundary = Utc.with_ymd_and_hms(2024, 11, 1, 15, 0, 0).unwrap();
        assert_eq!(minute_poll_delay(on_boundary, lag), Duration::from_secs(70));
    }

    #[test]
    fn test_sleep_until_open() {
        let now = Utc.with_ymd_and_hms(2024, 11, 1, 21, 0, 0).unwrap();

        let ahead = now + chrono::Duration::minutes(5);
        assert_eq!(sleep_until_open(ahead, now), Duration::from_secs(300));

        let behind = now - chrono::Duration::minutes(5);
        assert_eq!(sleep_until_open(behind, now), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_closed_cycle_runs_each_aggregation_job_exactly_once() {
        // next_open an hour out: after one aggregation pass the loop
        // parks in Sleeping until the shutdown below wakes it
        let market_data = Arc::new(FakeMarketData::new());
        market_data.push_clock(closed_status(chrono::Duration::hours(1)));

        let bars = Arc::new(FakeBarRepository::default());
        let summaries = Arc::new(FakeSummaryRepository::default());
        let scheduler = scheduler_with(
            Arc::clone(&market_data),
            Arc::clone(&bars),
            Arc::clone(&summaries),
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(rx));

        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();

        handle.await.unwrap().unwrap();

        assert_eq!(market_data.daily_calls.load(Ordering::SeqCst), 1);
        assert_eq!(market_data.minute_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bars.daily_rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_open_market_run_polls_minute_bars() {
        let market_data = Arc::new(FakeMarketData::new());
        market_data.push_clock(open_status());

        let bars = Arc::new(FakeBarRepository::default());
        let scheduler = scheduler_with(
            Arc::clone(&market_data),
            Arc::clone(&bars),
            Arc::new(FakeSummaryRepository::default()),
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(rx));

        tokio::time::sleep(Duration::from_millis(200)).await;
        tx.send(true).unwrap();

        handle.await.unwrap().unwrap();

        assert_eq!(market_data.minute_calls.load(Ordering::SeqCst), 1);
        assert_eq!(market_data.daily_calls.load(Ordering::SeqCst), 0);
        assert_eq!(bars.minute_rows.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clock_failure_backs_off_and_recovers() {
        let market_data = Arc::new(FakeMarketData::new());
        market_data.push_clock_failure();
        market_data.push_clock(closed_status(chrono::Duration::hours(1)));

        let bars = Arc::new(FakeBarRepository::default());
        let scheduler = scheduler_with(
            Arc::clone(&market_data),
            Arc::clone(&bars),
            Arc::new(FakeSummaryRepository::default()),
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(scheduler.run(rx));

        tokio::time::sleep(Duration::from_millis(300)).await;
        tx.send(true).unwrap();

        handle.await.unwrap().unwrap();

        assert_eq!(market_data.daily_calls.load(Ordering::SeqCst), 1);
        assert_eq!(bars.daily_rows.lock().unwrap().len(), 1);
    }
}
