//! Per-literal decision logic.
//!
//! An [`Analyzer`] owns the settings and every cache of one analysis run.
//! Each literal is decided independently, so literals from different
//! packages can be visited from multiple threads at once.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::comment::{CommentCache, CommentIndex, Directive};
use crate::config::Settings;
use crate::directive;
use crate::frontend::{Package, SourceFile};
use crate::gaps::{self, LiteralShape};
use crate::pattern::PatternList;
use crate::returns::is_exempt_empty_return;
use crate::source;
use crate::structure::{InfoCache, StructInfo, TypeInfo, TypeTable};
use crate::syntax::{LiteralContext, LiteralSite};

/// A struct literal with unset required fields.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Diagnostic {
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// One literal visit as delivered by the front end.
#[derive(Debug, Clone, Copy)]
pub struct LiteralEvent<'a> {
    /// Import path of the package being analyzed.
    pub package_path: &'a str,
    pub file: &'a str,
    pub site: &'a LiteralSite,
    pub comments: &'a CommentIndex,
}

/// Outcome of checking one or more packages.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckResult {
    pub diagnostics: Vec<Diagnostic>,
    pub files_scanned: usize,
    pub literals_visited: usize,
}

impl CheckResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, other: CheckResult) {
        self.diagnostics.extend(other.diagnostics);
        self.files_scanned += other.files_scanned;
        self.literals_visited += other.literals_visited;
    }

    /// Order diagnostics by file, position and message.
    pub fn sort(&mut self) {
        self.diagnostics.sort();
    }

    pub fn passed(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Memoized pattern decisions keyed by a type's matching key.
#[derive(Debug, Default)]
struct MatchCache {
    entries: RwLock<HashMap<String, bool>>,
}

impl MatchCache {
    fn get_or_compute<F>(&self, key: &str, compute: F) -> bool
    where
        F: FnOnce() -> bool,
    {
        {
            let entries = match self.entries.read() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            if let Some(&hit) = entries.get(key) {
                return hit;
            }
        }

        let value = compute();
        let mut entries = match self.entries.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_string(), value);
        value
    }

    fn len(&self) -> usize {
        match self.entries.read() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }
}

/// Decides, literal by literal, whether a diagnostic is due.
pub struct Analyzer {
    settings: Settings,
    types: TypeTable,
    infos: InfoCache,
    comments: CommentCache,
    processing: MatchCache,
    allow_empty: MatchCache,
}

impl Analyzer {
    pub fn new(settings: Settings, types: TypeTable) -> Self {
        Self {
            settings,
            types,
            infos: InfoCache::new(),
            comments: CommentCache::new(),
            processing: MatchCache::default(),
            allow_empty: MatchCache::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Decide one literal.
    pub fn visit(&self, event: &LiteralEvent<'_>) -> Option<Diagnostic> {
        let site = event.site;
        let type_id = site.ty?;
        let info = match self.infos.get(&self.types, type_id) {
            Some(info) => info,
            None => {
                log::debug!(
                    "{}:{}: type {} not in type table, skipping literal",
                    event.file,
                    site.span.start,
                    type_id.0
                );
                return None;
            }
        };

        let shape = LiteralShape::from_elements(&site.elements);
        if shape.is_empty() && (is_exempt_empty_return(site) || self.is_allowed_empty(&info, site)) {
            return None;
        }

        let directive = self.directive_for(&info, event);
        if directive.is_specified() {
            log::debug!("{}:{}: {} directive", event.file, site.span.start, directive);
        }
        let force = match directive {
            Directive::Ignore => return None,
            Directive::Enforce => true,
            Directive::Unspecified => false,
        };

        if !force && !self.should_process(&info.info) {
            return None;
        }

        let only_exported = event.package_path != info.info.package_path;
        let missing = gaps::skipped_fields(&shape, &info.fields, only_exported);
        if missing.is_empty() {
            return None;
        }

        let message = if missing.len() == 1 {
            format!("{} is missing field {}", info.info.short_name(), missing)
        } else {
            format!("{} is missing fields {}", info.info.short_name(), missing)
        };

        Some(Diagnostic {
            file: event.file.to_string(),
            line: site.span.start.line,
            column: site.span.start.column,
            message,
        })
    }

    /// Check every literal of a package.
    ///
    /// Files without embedded comments have them read from disk, relative
    /// to `source_root` when given.
    pub fn check_package(&self, package: &Package, source_root: Option<&Path>) -> CheckResult {
        let mut result = CheckResult::new();

        for file in &package.files {
            if self.settings.is_file_excluded(&file.path) {
                log::debug!("{}: excluded by file pattern", file.path);
                continue;
            }

            let comments = self.comments_for(file, source_root);
            result.files_scanned += 1;

            for site in &file.literals {
                result.literals_visited += 1;
                let event = LiteralEvent {
                    package_path: &package.path,
                    file: &file.path,
                    site,
                    comments: &comments,
                };
                if let Some(diagnostic) = self.visit(&event) {
                    result.diagnostics.push(diagnostic);
                }
            }
        }

        result
    }

    /// Log cache statistics for the run.
    pub fn log_stats(&self) {
        log::debug!(
            "struct info cache: {} entries, {} hits, {} misses",
            self.infos.len(),
            self.infos.hits(),
            self.infos.misses()
        );
        log::debug!(
            "comment cache: {} hits, {} misses",
            self.comments.hits(),
            self.comments.misses()
        );
        log::debug!(
            "pattern caches: {} processing decisions, {} allow-empty decisions",
            self.processing.len(),
            self.allow_empty.len()
        );
    }

    fn comments_for(&self, file: &SourceFile, source_root: Option<&Path>) -> Arc<CommentIndex> {
        self.comments.get_or_insert_with(&file.path, || {
            if let Some(groups) = &file.comments {
                return CommentIndex::new(groups.clone());
            }
            if !self.settings.use_directives {
                return CommentIndex::default();
            }

            let path = file.resolve(source_root);
            match source::load_comment_groups(&path) {
                Ok(groups) => CommentIndex::new(groups),
                Err(e) => {
                    log::warn!("no comments for {}: {}", file.path, e);
                    CommentIndex::default()
                }
            }
        })
    }

    fn directive_for(&self, info: &StructInfo, event: &LiteralEvent<'_>) -> Directive {
        if !self.settings.use_directives {
            return Directive::Unspecified;
        }
        match directive::resolve(event.site, event.comments) {
            Directive::Unspecified => info.directive,
            literal => literal,
        }
    }

    fn should_process(&self, info: &TypeInfo) -> bool {
        if !self.settings.filters_types() {
            return true;
        }

        let key = info.matching_key();
        self.processing.get_or_compute(&key, || {
            included(&self.settings.include, &self.settings.exclude, &key)
        })
    }

    fn is_allowed_empty(&self, info: &StructInfo, site: &LiteralSite) -> bool {
        if self.settings.allow_empty {
            return true;
        }

        match LiteralContext::of(site) {
            LiteralContext::Return if self.settings.allow_empty_returns => return true,
            LiteralContext::Declaration if self.settings.allow_empty_declarations => return true,
            _ => {}
        }

        if self.settings.allow_empty_patterns.is_empty() {
            return false;
        }
        let key = info.info.matching_key();
        self.allow_empty
            .get_or_compute(&key, || self.settings.allow_empty_patterns.match_full(&key))
    }
}

fn included(include: &PatternList, exclude: &PatternList, key: &str) -> bool {
    if !include.is_empty() && !include.match_full(key) {
        return false;
    }
    !exclude.match_full(key)
}
