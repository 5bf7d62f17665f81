use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::{DailyBar, NewDailyBar, NewMinuteBar};
use crate::database::repositories::InsertOutcome;
use crate::database::schema::{daily_bars, minute_bars};
use diesel::prelude::*;
use std::sync::Arc;

/// Bar repository trait - conflict-skipping batch inserts for both bar
/// tables plus the history read the indicator engine needs
#[async_trait::async_trait]
pub trait BarRepository: Send + Sync {
    /// Batch insert minute bars, silently skipping rows that already exist
    fn insert_minute_bars(
        &self,
        new_bars: Vec<NewMinuteBar>,
    ) -> Result<InsertOutcome, DatabaseError>;

    /// Batch insert daily bars, silently skipping rows that already exist
    fn insert_daily_bars(
        &self,
        new_bars: Vec<NewDailyBar>,
    ) -> Result<InsertOutcome, DatabaseError>;

    /// Most recent daily bars for a symbol, newest first
    fn recent_daily_bars(&self, symbol: &str, limit: i64) -> Result<Vec<DailyBar>, DatabaseError>;
}

/// Concrete implementation of BarRepository
pub struct BarRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl BarRepositoryImpl {
    /// Create new bar repository with connection provider
    pub fn new<F>(get_conn: F) -> Self
    where
        F: Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync + 'static,
    {
        Self {
            get_conn: Arc::new(get_conn),
        }
    }
}

#[async_trait::async_trait]
impl BarRepository for BarRepositoryImpl {
    fn insert_minute_bars(
        &self,
        new_bars: Vec<NewMinuteBar>,
    ) -> Result<InsertOutcome, DatabaseError> {
        if new_bars.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let mut conn = (self.get_conn)()?;

        // One transaction per batch: the whole batch commits or rolls back.
        // ON CONFLICT DO NOTHING absorbs duplicates, including duplicates
        // inside the batch itself.
        let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(minute_bars::table)
                .values(&new_bars)
                .on_conflict_do_nothing()
                .execute(conn)
        })?;

        let outcome = InsertOutcome::new(new_bars.len(), inserted);

        tracing::debug!(
            "Batch inserted {} minute bars ({} duplicates, attempted {})",
            outcome.inserted,
            outcome.duplicates,
            outcome.requested
        );

        Ok(outcome)
    }

    fn insert_daily_bars(
        &self,
        new_bars: Vec<NewDailyBar>,
    ) -> Result<InsertOutcome, DatabaseError> {
        if new_bars.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let mut conn = (self.get_conn)()?;

        let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(daily_bars::table)
                .values(&new_bars)
                .on_conflict_do_nothing()
                .execute(conn)
        })?;

        let outcome = InsertOutcome::new(new_bars.len(), inserted);

        tracing::debug!(
            "Batch inserted {} daily bars ({} duplicates, attempted {})",
            outcome.inserted,
            outcome.duplicates,
            outcome.requested
        );

        Ok(outcome)
    }

    fn recent_daily_bars(&self, symbol: &str, limit: i64) -> Result<Vec<DailyBar>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        daily_bars::table
            .filter(daily_bars::symbol.eq(symbol))
            .order(daily_bars::timestamp.desc())
            .limit(limit)
            .load::<DailyBar>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
