//! Runner that checks program dumps.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analyzer::{Analyzer, CheckResult};
use crate::config::Settings;
use crate::frontend::Program;

/// Checks one or more program dumps with a fixed configuration.
pub struct Runner {
    settings: Settings,
    source_root: Option<PathBuf>,
}

impl Runner {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            source_root: None,
        }
    }

    /// Directory that relative source file paths are resolved against.
    ///
    /// Defaults to the directory holding each dump.
    pub fn source_root<P: AsRef<Path>>(mut self, root: Option<P>) -> Self {
        self.source_root = root.map(|r| r.as_ref().to_path_buf());
        self
    }

    /// Check a single program. Packages are checked in parallel.
    pub fn check_program(&self, program: Program, source_root: Option<&Path>) -> CheckResult {
        let (types, packages) = program.into_parts();
        let analyzer = Analyzer::new(self.settings.clone(), types);

        let results: Vec<CheckResult> = packages
            .par_iter()
            .map(|package| analyzer.check_package(package, source_root))
            .collect();

        let mut result = CheckResult::new();
        for r in results {
            result.merge(r);
        }
        result.sort();

        analyzer.log_stats();
        result
    }

    /// Load and check every dump; each dump is a separate run.
    pub fn run(&self, dumps: &[PathBuf]) -> anyhow::Result<CheckResult> {
        let mut result = CheckResult::new();

        for dump in dumps {
            let program = Program::from_json_file(dump)?;
            log::debug!(
                "{}: {} types, {} packages, {} literals",
                dump.display(),
                program.types.len(),
                program.packages.len(),
                program.literal_count()
            );

            let root = self
                .source_root
                .clone()
                .or_else(|| dump.parent().map(Path::to_path_buf));
            result.merge(self.check_program(program, root.as_deref()));
        }

        result.sort();
        Ok(result)
    }
}

/// Collect the dumps to check: `path` itself, or every `*.json` below it.
pub fn collect_dumps(path: &Path) -> anyhow::Result<Vec<PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut dumps = Vec::new();
    for entry in WalkDir::new(path).follow_links(true).into_iter().filter_entry(|e| {
        // Skip hidden directories
        !(e.file_type().is_dir() && e.depth() > 0 && e.file_name().to_string_lossy().starts_with('.'))
    }) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some("json")
        {
            dumps.push(entry.path().to_path_buf());
        }
    }

    dumps.sort();
    Ok(dumps)
}
