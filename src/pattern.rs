//! Whole-string regular expression lists.
//!
//! Type names are matched against include, exclude and allow-empty lists.
//! A pattern only matches when its leftmost match covers the entire name,
//! so `foo` does not match `foobar` while `foo.*` does.

use regex::Regex;
use std::fmt;
use thiserror::Error;

/// Errors produced while compiling a pattern list.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("pattern can't be empty")]
    Empty,
    #[error("pattern compilation failed for {pattern:?}: {source}")]
    CompilationFailed {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Ordered list of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternList {
    patterns: Vec<Regex>,
}

impl PatternList {
    /// Compile a list of pattern strings.
    ///
    /// Fails on the first empty or invalid pattern.
    pub fn new<I, S>(strs: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = Self::default();
        for s in strs {
            list.push(s.as_ref())?;
        }
        Ok(list)
    }

    /// Compile and append a single pattern.
    pub fn push(&mut self, pattern: &str) -> Result<(), PatternError> {
        if pattern.is_empty() {
            return Err(PatternError::Empty);
        }

        let regex = Regex::new(pattern).map_err(|source| PatternError::CompilationFailed {
            pattern: pattern.to_string(),
            source,
        })?;
        self.patterns.push(regex);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if any pattern matches the whole of `name`.
    ///
    /// The leftmost-first match is taken and must span the full input;
    /// a later, longer match is not searched for.
    pub fn match_full(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| {
            re.find(name)
                .map(|m| m.start() == 0 && m.end() == name.len())
                .unwrap_or(false)
        })
    }
}

impl fmt::Display for PatternList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<String> = self
            .patterns
            .iter()
            .map(|re| format!("{:?}", re.as_str()))
            .collect();
        write!(f, "{}", quoted.join(", "))
    }
}
