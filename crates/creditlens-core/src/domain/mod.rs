//! # Domain Models
//!
//! Raw inputs consumed by the scoring pipeline, in ticker-agnostic form.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`MarketBar`] | Daily OHLCV bar |
//! | [`NewsArticle`] | Headline plus optional metadata |
//! | [`Filing`] | Regulatory filing reference |
//! | [`MacroSnapshot`] | Latest value per macro indicator |
//! | [`MacroIndicator`] | Canonical macro series |
//! | [`Ticker`] | Validated, upper-cased ticker |
//! | [`TradingDate`] | Calendar day of a bar |
//! | [`PublishedAt`] | article publication instant (UTC) |

mod models;
mod ticker;
mod timestamp;

pub use models::{Filing, MacroIndicator, MacroSnapshot, MarketBar, NewsArticle};
pub use ticker::Ticker;
pub use timestamp::{PublishedAt, TradingDate};
