//! Compiled filter patterns
//!
//! A `CompiledPattern` is shared through `Arc` between every signature slot
//! and the pattern index entry that refers to it.

use fancy_regex::{Regex, RegexBuilder};

use crate::types::has_option;

/// Backtracking budget per match attempt (fancy-regex's default).
const BACKTRACK_LIMIT: usize = 1_000_000;

/// Error type for pattern compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: Box<fancy_regex::Error>,
    },
}

/// A compiled regex together with the options of the rule it came from.
#[derive(Debug)]
pub struct CompiledPattern {
    id: usize,
    regex: Regex,
    options: String,
    third_party: bool,
}

impl CompiledPattern {
    /// Compile translated regex source. Case-sensitive, single-line.
    pub fn compile(id: usize, source: &str, options: &str) -> Result<Self, CompileError> {
        Self::compile_with_limit(id, source, options, BACKTRACK_LIMIT)
    }

    fn compile_with_limit(
        id: usize,
        source: &str,
        options: &str,
        backtrack_limit: usize,
    ) -> Result<Self, CompileError> {
        let regex = RegexBuilder::new(source)
            .backtrack_limit(backtrack_limit)
            .build()
            .map_err(|e| CompileError::InvalidRegex {
                pattern: source.to_string(),
                source: Box::new(e),
            })?;

        Ok(Self {
            id,
            regex,
            options: options.to_string(),
            third_party: has_option(options, "third-party"),
        })
    }

    /// Identifier unique within one engine build.
    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    /// Translated regex source.
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    pub fn options(&self) -> &str {
        &self.options
    }

    /// True if the regex finds a non-empty match in `text`.
    /// Zero-length matches never count. A runtime error (backtrack limit)
    /// is logged and treated as a miss.
    pub fn is_match(&self, text: &str) -> bool {
        match self.try_match(text) {
            Ok(matched) => matched,
            Err(e) => {
                log::warn!("regexp={} failed on {}: {}", self.source(), text, e);
                false
            }
        }
    }

    fn try_match(&self, text: &str) -> Result<bool, fancy_regex::Error> {
        for found in self.regex.find_iter(text) {
            if !found?.as_str().is_empty() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Match `url`, then apply the third-party exclusion: a `third-party`
    /// rule is suppressed when the same regex also matches the referring page.
    pub fn matches_request(&self, url: &str, page_url: Option<&str>) -> bool {
        if !self.is_match(url) {
            return false;
        }

        if self.third_party {
            if let Some(page) = page_url {
                if self.is_match(page) {
                    return false;
                }
            }
        }

        true
    }
}

/// True for explicit slash-delimited regex syntax, i.e. text shaped like
/// `^/.*[\^\$\*].*/$`. Such patterns never get signatures.
pub fn is_regexp_like(pattern: &str) -> bool {
    let bytes = pattern.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'/' || bytes[bytes.len() - 1] != b'/' {
        return false;
    }

    let inner = &bytes[1..bytes.len() - 1];
    !inner.contains(&b'\n') && inner.iter().any(|&b| matches!(b, b'^' | b'$' | b'*'))
}
