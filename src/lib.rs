// Library Crate Root
// lib.rs

pub mod alpaca;
pub mod config;
pub mod database;
pub mod indicators;
pub mod jobs;
pub mod scheduler;

// pub use = re-export at crate root
pub use alpaca::{AlpacaClient, MarketData};
pub use config::AppConfig;
pub use scheduler::Scheduler;
