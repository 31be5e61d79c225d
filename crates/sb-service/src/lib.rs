//! sigblock Service
//!
//! Ties filter sources, configuration and the matching engine together
//! behind an async API: `UriTester::reload` rebuilds the engine from the
//! configured sources and `UriTester::test_uri` answers per-request
//! verdicts once a load has completed.

pub mod config;
pub mod feed;
pub mod tester;

pub use config::{ConfigError, FilterConfig};
pub use feed::{FeedError, FileFeed, FilterFeed, MemoryFeed};
pub use tester::{HideCss, ReloadStats, UriTester};
