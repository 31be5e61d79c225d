//! sigblock Filter List Compiler
//!
//! This crate classifies ABP filter list lines and feeds them into a
//! `sb_core::FilterEngine`: URL rules are compiled into the indices and
//! element hiding rules into the CSS aggregates.

pub mod loader;
pub mod parser;

pub use loader::{load_filter_list, LoadStats, SkipCounts};
pub use parser::{parse_line, ParsedLine, SkipReason};
