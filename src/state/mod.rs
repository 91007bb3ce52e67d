//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of one documentation crawl run
//! - `FailureBreaker`: consecutive-failure circuit breaker that aborts a run

mod breaker;
mod crawl_state;

pub use breaker::FailureBreaker;
pub use crawl_state::CrawlState;
