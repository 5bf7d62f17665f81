use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::NewSymbolDailySummary;
use crate::database::repositories::InsertOutcome;
use crate::database::schema::symbol_daily_summaries;
use diesel::prelude::*;
use std::sync::Arc;

/// Summary repository trait - write access for the indicator engine output
#[async_trait::async_trait]
pub trait SummaryRepository: Send + Sync {
    /// Batch insert daily summaries, silently skipping (symbol, date)
    /// pairs that were already written
    fn insert_summaries(
        &self,
        new_summaries: Vec<NewSymbolDailySummary>,
    ) -> Result<InsertOutcome, DatabaseError>;
}

/// Concrete implementation of SummaryRepository
pub struct SummaryRepositoryImpl {
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl SummaryRepositoryImpl {
    /// Create new summary repository with connection provider
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
impl SummaryRepository for SummaryRepositoryImpl {
    fn insert_summaries(
        &self,
        new_summaries: Vec<NewSymbolDailySummary>,
    ) -> Result<InsertOutcome, DatabaseError> {
        if new_summaries.is_empty() {
            return Ok(InsertOutcome::default());
        }

        let mut conn = (self.get_conn)()?;

        let inserted = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::insert_into(symbol_daily_summaries::table)
                .values(&new_summaries)
                .on_conflict_do_nothing()
                .execute(conn)
        })?;

        let outcome = InsertOutcome::new(new_summaries.len(), inserted);

        tracing::debug!(
            "Batch inserted {} daily summaries ({} duplicates, attempted {})",
            outcome.inserted,
            outcome.duplicates,
            outcome.requested
        );

        Ok(outcome)
    }
}
