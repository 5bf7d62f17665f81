use crate::database::connection::{DatabaseError, PgPooledConnection};
use crate::database::models::Company;
use crate::database::schema::companies;
use diesel::prelude::*;
use std::sync::Arc;

/// Company repository trait - read access to the watch-list
#[async_trait::async_trait]
pub trait CompanyRepository: Send + Sync {
    /// Get every watched company, ordered by symbol
    fn get_all(&self) -> Result<Vec<Company>, DatabaseError>;
}

/// Concrete implementation of CompanyRepository
pub struct CompanyRepositoryImpl {
    // A connection provider keeps the repository decoupled from pool ownership
    get_conn: Arc<dyn Fn() -> Result<PgPooledConnection, DatabaseError> + Send + Sync>,
}

impl CompanyRepositoryImpl {
    /// Create new company repository with connection provider
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
impl CompanyRepository for CompanyRepositoryImpl {
    fn get_all(&self) -> Result<Vec<Company>, DatabaseError> {
        let mut conn = (self.get_conn)()?;

        companies::table
            .order(companies::symbol.asc())
            .load::<Company>(&mut conn)
            .map_err(DatabaseError::from)
    }
}
