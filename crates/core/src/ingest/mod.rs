pub mod error;
pub mod parse;
pub mod prices;
pub mod provider;
pub mod types;

pub use error::ScrapeError;
pub use provider::{normalize_ticker, CompanyDataSource, ScreenerClient};
