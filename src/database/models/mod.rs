pub mod bar;
pub mod company;
pub mod summary;

pub use bar::{DailyBar, MinuteBar, NewDailyBar, NewMinuteBar};
pub use company::Company;
pub use summary::{NewSymbolDailySummary, SymbolDailySummary};
