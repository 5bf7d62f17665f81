use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Company entity - one row per watched symbol
///
/// Reference data maintained outside this service; the loader only reads
/// it, once per scheduling cycle, so watch-list edits apply on the next
/// tick without a restart.
#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Serialize, Deserialize)]
#[diesel(table_name = crate::database::schema::companies)]
#[diesel(primary_key(id))]
pub struct Company {
    /// Auto-incrementing ID
    pub id: i32,

    /// Ticker symbol, unique across the table
    pub symbol: String,

    /// Free-form company description
    pub company_description: String,

    /// Sector classification
    pub sector: String,
}
