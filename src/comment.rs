//! Comments, directive parsing, and comment-to-node association.
//!
//! Directives are written as line comments:
//! - `//exhaustruct:ignore` - skip the literal
//! - `//exhaustruct:enforce` - check the literal even if patterns exclude it
//!
//! Either may be followed by whitespace and a free-form reason.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use crate::syntax::{Position, Span};

lazy_static::lazy_static! {
    static ref DIRECTIVE_PATTERN: Regex =
        Regex::new(r"^//exhaustruct:(ignore|enforce)(?:\s|$)").unwrap();
}

/// Override annotation for a single literal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Directive {
    #[default]
    Unspecified,
    Enforce,
    Ignore,
}

impl Directive {
    /// Parse a single comment's text, e.g. `//exhaustruct:ignore`.
    ///
    /// Unrecognized spellings yield `None`.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = DIRECTIVE_PATTERN.captures(text)?;
        match caps.get(1).map(|m| m.as_str()) {
            Some("ignore") => Some(Directive::Ignore),
            Some("enforce") => Some(Directive::Enforce),
            _ => None,
        }
    }

    pub fn is_specified(&self) -> bool {
        *self != Directive::Unspecified
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Directive::Unspecified => write!(f, "unspecified"),
            Directive::Enforce => write!(f, "enforce"),
            Directive::Ignore => write!(f, "ignore"),
        }
    }
}

/// A single comment with its source span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub span: Span,
}

impl Comment {
    pub fn new(text: &str, span: Span) -> Self {
        Self {
            text: text.to_string(),
            span,
        }
    }
}

/// Consecutive comments with no code or blank line between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommentGroup {
    pub comments: Vec<Comment>,
}

impl CommentGroup {
    pub fn new(comments: Vec<Comment>) -> Self {
        Self { comments }
    }

    /// Single-line group holding one comment.
    pub fn line(text: &str, line: usize, column: usize) -> Self {
        let span = Span::on_line(line, column, column + text.len());
        Self::new(vec![Comment::new(text, span)])
    }

    pub fn start(&self) -> Position {
        self.comments.first().map(|c| c.span.start).unwrap_or_default()
    }

    pub fn end(&self) -> Position {
        self.comments.last().map(|c| c.span.end).unwrap_or_default()
    }
}

/// The last recognized directive across the groups, in textual order.
pub fn last_directive(groups: &[&CommentGroup]) -> Directive {
    groups
        .iter()
        .flat_map(|g| g.comments.iter())
        .filter_map(|c| Directive::parse(&c.text))
        .last()
        .unwrap_or_default()
}

/// Read-only index of one file's comment groups.
#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    groups: Vec<CommentGroup>,
}

impl CommentIndex {
    pub fn new(mut groups: Vec<CommentGroup>) -> Self {
        groups.retain(|g| !g.comments.is_empty());
        groups.sort_by_key(|g| g.start());
        Self { groups }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups bound to a node spanning `span`.
    ///
    /// A group is related when it ends on the line right above the node, or
    /// starts on the node's last line after the node ends.
    pub fn related(&self, span: &Span) -> Vec<&CommentGroup> {
        self.groups
            .iter()
            .filter(|g| {
                let above = span.start.line > 1 && g.end().line == span.start.line - 1;
                let trailing =
                    g.start().line == span.end.line && g.start().column > span.end.column;
                above || trailing
            })
            .collect()
    }

    /// The directive bound to a node, last one winning.
    pub fn directive_for(&self, span: &Span) -> Directive {
        last_directive(&self.related(span))
    }
}

/// Per-run cache of comment indexes keyed by file path.
#[derive(Debug, Default)]
pub struct CommentCache {
    files: RwLock<HashMap<String, Arc<CommentIndex>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl CommentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached index for `path`, building it with `load` on a miss.
    pub fn get_or_insert_with<F>(&self, path: &str, load: F) -> Arc<CommentIndex>
    where
        F: FnOnce() -> CommentIndex,
    {
        {
            let files = match self.files.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(index) = files.get(path) {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Arc::clone(index);
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let index = Arc::new(load());

        let mut files = match self.files.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        files.insert(path.to_string(), Arc::clone(&index));

        index
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}
