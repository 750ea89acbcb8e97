//! Yahoo Finance data providers.

pub mod quotes;

pub use quotes::{DEFAULT_RATE_LIMIT, YahooQuoteProvider, validate_request};
