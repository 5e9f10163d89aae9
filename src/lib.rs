//! Exhaustruct - find Go struct literals that leave required fields unset.
//!
//! The engine decides, for every composite literal of a struct type, whether
//! the literal omits fields it should set. Parsing and type checking happen
//! in an external Go front end, which hands over a JSON program dump.
//!
//! # Architecture
//!
//! - `syntax`, `structure`, `frontend`: the data handed over by the front end
//! - `pattern`: whole-name regular expression lists
//! - `comment`, `directive`, `source`: `//exhaustruct:` comment directives
//! - `gaps`, `returns`: which fields are missing and when that is acceptable
//! - `analyzer`: per-literal decisions and the run's caches
//! - `config`, `runner`, `report`, `cli`: the command-line tool

pub mod analyzer;
pub mod cli;
pub mod comment;
pub mod config;
pub mod directive;
pub mod frontend;
pub mod gaps;
pub mod pattern;
pub mod report;
pub mod returns;
pub mod runner;
pub mod source;
pub mod structure;
pub mod syntax;

pub use analyzer::{Analyzer, CheckResult, Diagnostic, LiteralEvent};
pub use comment::{CommentIndex, Directive};
pub use config::{Config, ConfigError, Settings};
pub use frontend::{Package, Program, SourceFile};
pub use pattern::{PatternError, PatternList};
pub use runner::Runner;
pub use structure::{RecordType, TypeId, TypeTable};
pub use syntax::LiteralSite;
