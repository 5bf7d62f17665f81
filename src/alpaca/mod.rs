/// Alpaca API integration
///
/// This module provides:
/// - Serde models for the bar and clock wire shapes
/// - Request-target batching under the API's URL length ceiling
/// - A reqwest-backed client behind the `MarketData` trait

pub mod batch;
pub mod client;
pub mod models;

pub use batch::{batch_symbols, MAX_REQUEST_TARGET_LEN};
pub use client::{AlpacaClient, AlpacaError, MarketData};
pub use models::{ApiBar, MarketStatus};
