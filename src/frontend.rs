//! Program dumps produced by the Go front end.
//!
//! The front end parses and type-checks the packages, then writes one JSON
//! document per run: the resolved struct types plus every composite literal
//! it visited, grouped by package and file.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::comment::CommentGroup;
use crate::structure::{RecordType, TypeTable};
use crate::syntax::LiteralSite;

/// One analysis run's worth of front-end output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    /// Type arena; a `TypeId` is an index into this list.
    #[serde(default)]
    pub types: Vec<RecordType>,
    #[serde(default)]
    pub packages: Vec<Package>,
}

/// A Go package.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Package {
    pub name: String,
    /// Import path, e.g. `example.com/project/api`.
    pub path: String,
    #[serde(default)]
    pub files: Vec<SourceFile>,
}

/// A source file and the literals found in it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceFile {
    pub path: String,
    /// Comment groups of the file. When absent they are read from the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentGroup>>,
    #[serde(default)]
    pub literals: Vec<LiteralSite>,
}

impl SourceFile {
    /// Location of the file on disk, resolved against `source_root` when relative.
    pub fn resolve(&self, source_root: Option<&Path>) -> PathBuf {
        let path = Path::new(&self.path);
        match source_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Program {
    /// Load a program dump from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read program dump {}", path.display()))?;
        Self::from_json_str(&content)
            .with_context(|| format!("failed to parse program dump {}", path.display()))
    }

    /// Parse a program dump from JSON text.
    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let program: Program = serde_json::from_str(content)?;
        Ok(program)
    }

    /// Split the dump into its type arena and packages.
    pub fn into_parts(self) -> (TypeTable, Vec<Package>) {
        (TypeTable::new(self.types), self.packages)
    }

    /// Number of literal sites across all packages.
    pub fn literal_count(&self) -> usize {
        self.packages
            .iter()
            .flat_map(|p| p.files.iter())
            .map(|f| f.literals.len())
            .sum()
    }
}
