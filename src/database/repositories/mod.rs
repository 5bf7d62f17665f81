/// Repository pattern implementations adhering to SOLID principles
///
/// - **Single Responsibility**: Each repository handles one entity type
/// - **Interface Segregation**: Focused repository interfaces
/// - **Dependency Inversion**: Callers depend on traits, not concrete types

pub mod bar_repository;
pub mod company_repository;
pub mod summary_repository;

pub use bar_repository::{BarRepository, BarRepositoryImpl};
pub use company_repository::{CompanyRepository, CompanyRepositoryImpl};
pub use summary_repository::{SummaryRepository, SummaryRepositoryImpl};

/// Result of one conflict-skipping bulk insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InsertOutcome {
    /// Rows handed to the statement
    pub requested: usize,

    /// Rows actually written
    pub inserted: usize,

    /// Rows skipped because their identity already existed
    pub duplicates: usize,
}

impl InsertOutcome {
    /// Build an outcome from the attempted row count and the driver's
    /// affected-row count.
    pub fn new(requested: usize, inserted: usize) -> Self {
        Self {
            requested,
            inserted,
            duplicates: requested.saturating_sub(inserted),
        }
    }

    /// Fold another batch's outcome into this one
    pub fn absorb(&mut self, other: InsertOutcome) {
        self.requested += other.requested;
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
    }
}
