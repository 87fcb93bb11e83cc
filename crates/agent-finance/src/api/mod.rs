//! API clients for external data services

pub mod news;
pub mod wikipedia;
pub mod yahoo;

pub use news::{Article, HeadlineQuery, NewsClient};
pub use wikipedia::WikipediaClient;
pub use yahoo::{BalanceSheetField, BalanceSheetRow, YahooFinanceClient};
