/// Technical indicator toolkit
///
/// Pure functions over close and volume series, plus the summary engine
/// that combines them into one row per symbol per trading day. Everything
/// returns `Option` on short or degenerate windows; nothing in here
/// touches the database or the network.

pub mod bollinger;
pub mod engine;
pub mod rsi;
pub mod stats;

pub use engine::{compute_daily_summary, SummaryOutcome, REQUIRED_DAILY_BARS};
