//! sigblock Core Library
//!
//! This crate provides the request matching engine for the sigblock content
//! blocker: filter expressions are translated to regexes, indexed by short
//! literal signatures, and queried on every request with a per-side cache.
//!
//! # Architecture
//!
//! Each side (exception rules, block rules) owns a signature index, a
//! pattern index and a verdict cache. A query normalizes the request URL,
//! looks up its 8-byte windows in the signature index, and only falls back
//! to scanning the pattern index when no signature hit.
//!
//! # Modules
//!
//! - `translate`: ABP filter expression to regex source
//! - `pattern`: compiled, shareable regex handles
//! - `index`: signature and pattern indices for one side
//! - `cache`: per-side verdict cache
//! - `matcher`: the query pipeline
//! - `css`: element hiding aggregates
//! - `engine`: the owned engine value tying it all together
//! - `types`: shared type definitions

pub mod cache;
pub mod css;
pub mod engine;
pub mod index;
pub mod matcher;
pub mod pattern;
pub mod translate;
pub mod types;

// Re-export commonly used types
pub use css::CssHideRules;
pub use engine::FilterEngine;
pub use index::{IndexPlacement, RuleSet, SIGNATURE_SIZE};
pub use pattern::{CompileError, CompiledPattern};
pub use translate::translate;
pub use types::{AnchorType, FilterRule, MatchDecision, RuleAction, TestFlags};
