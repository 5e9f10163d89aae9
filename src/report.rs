//! Output formatting for check results.
//!
//! Supports three output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption
//! - SARIF: Static Analysis Results Interchange Format for IDE/CI integration

use colored::*;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use crate::analyzer::{CheckResult, Diagnostic};

/// Rule identifier attached to every diagnostic.
pub const RULE_ID: &str = "exhaustruct";

/// Output format selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pretty,
    Json,
    Sarif,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" => Ok(Format::Pretty),
            "json" => Ok(Format::Json),
            "sarif" => Ok(Format::Sarif),
            other => Err(format!(
                "invalid format {:?}, must be 'pretty', 'json', or 'sarif'",
                other
            )),
        }
    }
}

// =============================================================================
// JSON Format
// =============================================================================

#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub path: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub literals_visited: usize,
    pub diagnostics: Vec<JsonDiagnostic>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonDiagnostic {
    pub rule: String,
    pub file: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<&Diagnostic> for JsonDiagnostic {
    fn from(d: &Diagnostic) -> Self {
        Self {
            rule: RULE_ID.to_string(),
            file: d.file.clone(),
            line: d.line,
            column: d.column,
            message: d.message.clone(),
        }
    }
}

/// Build the JSON report document.
pub fn json_report(path: &str, result: &CheckResult) -> JsonReport {
    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        path: path.to_string(),
        passed: result.passed(),
        files_scanned: result.files_scanned,
        literals_visited: result.literals_visited,
        diagnostics: result.diagnostics.iter().map(JsonDiagnostic::from).collect(),
    }
}

/// Write results in JSON format.
pub fn write_json<W: Write>(out: &mut W, path: &str, result: &CheckResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&json_report(path, result))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// SARIF Format
// =============================================================================

const SARIF_VERSION: &str = "2.1.0";
const SARIF_SCHEMA: &str = "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json";
const TOOL_NAME: &str = "exhaustruct";
const INFO_URI: &str = "https://github.com/GaijinEntertainment/go-exhaustruct";

#[derive(Serialize, Deserialize)]
pub struct SarifReport {
    pub version: String,
    #[serde(rename = "$schema")]
    pub schema: String,
    pub runs: Vec<SarifRun>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRun {
    pub tool: SarifTool,
    pub results: Vec<SarifResult>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifTool {
    pub driver: SarifDriver,
}

#[derive(Serialize, Deserialize)]
pub struct SarifDriver {
    pub name: String,
    pub version: String,
    #[serde(rename = "informationUri")]
    pub information_uri: String,
    pub rules: Vec<SarifRule>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "shortDescription")]
    pub short_description: SarifMessage,
    #[serde(rename = "fullDescription")]
    pub full_description: SarifMessage,
    #[serde(rename = "defaultConfiguration")]
    pub default_config: SarifRuleConfig,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRuleConfig {
    pub level: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifResult {
    #[serde(rename = "ruleId")]
    pub rule_id: String,
    pub level: String,
    pub message: SarifMessage,
    pub locations: Vec<SarifLocation>,
}

#[derive(Serialize, Deserialize)]
pub struct SarifMessage {
    pub text: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifLocation {
    #[serde(rename = "physicalLocation")]
    pub physical_location: SarifPhysicalLocation,
}

#[derive(Serialize, Deserialize)]
pub struct SarifPhysicalLocation {
    #[serde(rename = "artifactLocation")]
    pub artifact_location: SarifArtifact,
    pub region: SarifRegion,
}

#[derive(Serialize, Deserialize)]
pub struct SarifArtifact {
    pub uri: String,
}

#[derive(Serialize, Deserialize)]
pub struct SarifRegion {
    #[serde(rename = "startLine")]
    pub start_line: usize,
    #[serde(rename = "startColumn")]
    pub start_column: usize,
}

fn make_relative_path(file_path: &str, base_path: &Path) -> String {
    if base_path.to_string_lossy().is_empty() {
        return file_path.to_string();
    }

    Path::new(file_path)
        .strip_prefix(base_path)
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_else(|_| file_path.replace('\\', "/"))
}

/// Build the SARIF report document.
pub fn sarif_report(base_path: &Path, result: &CheckResult) -> SarifReport {
    let rule = SarifRule {
        id: RULE_ID.to_string(),
        name: "Exhaustruct".to_string(),
        short_description: SarifMessage {
            text: "Detects struct literals with unset required fields".to_string(),
        },
        full_description: SarifMessage {
            text: "Reports struct literals that do not set every required field. Fields tagged \
                   exhaustruct:\"optional\" are not required, and //exhaustruct:ignore or \
                   //exhaustruct:enforce comments override the configured type patterns."
                .to_string(),
        },
        default_config: SarifRuleConfig {
            level: "error".to_string(),
        },
    };

    let results = result
        .diagnostics
        .iter()
        .map(|d| SarifResult {
            rule_id: RULE_ID.to_string(),
            level: "error".to_string(),
            message: SarifMessage {
                text: d.message.clone(),
            },
            locations: vec![SarifLocation {
                physical_location: SarifPhysicalLocation {
                    artifact_location: SarifArtifact {
                        uri: make_relative_path(&d.file, base_path),
                    },
                    region: SarifRegion {
                        start_line: d.line.max(1),
                        start_column: d.column.max(1),
                    },
                },
            }],
        })
        .collect();

    SarifReport {
        version: SARIF_VERSION.to_string(),
        schema: SARIF_SCHEMA.to_string(),
        runs: vec![SarifRun {
            tool: SarifTool {
                driver: SarifDriver {
                    name: TOOL_NAME.to_string(),
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    information_uri: INFO_URI.to_string(),
                    rules: vec![rule],
                },
            },
            results,
        }],
    }
}

/// Write results in SARIF format.
pub fn write_sarif<W: Write>(out: &mut W, base_path: &Path, result: &CheckResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&sarif_report(base_path, result))?;
    writeln!(out, "{}", json)?;
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty<W: Write>(out: &mut W, path: &str, result: &CheckResult) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "  {} v{}", "exhaustruct".cyan().bold(), env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    writeln!(out, "  {}{}", "Checking: ".dimmed(), path)?;
    writeln!(
        out,
        "  {}",
        format!(
            "{} files, {} literals",
            result.files_scanned, result.literals_visited
        )
        .dimmed()
    )?;
    writeln!(out)?;

    if !result.diagnostics.is_empty() {
        writeln!(out, "  {} ({}):", "Diagnostics".bold(), result.diagnostics.len())?;
        writeln!(out)?;
        for d in &result.diagnostics {
            write_diagnostic(out, d)?;
        }
    }

    if result.passed() {
        writeln!(out, "  {}", "✓ PASS".green())?;
    } else {
        writeln!(out, "  {}", "✗ FAIL".red())?;
    }
    writeln!(out)?;
    Ok(())
}

fn write_diagnostic<W: Write>(out: &mut W, d: &Diagnostic) -> io::Result<()> {
    writeln!(
        out,
        "    {} {}{}",
        "ERROR".red(),
        d.file.blue(),
        format!(":{}:{}", d.line, d.column).dimmed()
    )?;
    writeln!(out, "          {}", d.message)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CheckResult {
        CheckResult {
            diagnostics: vec![Diagnostic {
                file: "/work/pkg/a.go".to_string(),
                line: 12,
                column: 7,
                message: "pkg.Test is missing field D".to_string(),
            }],
            files_scanned: 3,
            literals_visited: 10,
        }
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("pretty".parse::<Format>(), Ok(Format::Pretty));
        assert_eq!("json".parse::<Format>(), Ok(Format::Json));
        assert_eq!("sarif".parse::<Format>(), Ok(Format::Sarif));
        assert!("xml".parse::<Format>().unwrap_err().contains("invalid format"));
    }

    #[test]
    fn test_json_report() {
        let report = json_report(".", &sample());
        assert!(!report.passed);
        assert_eq!(report.files_scanned, 3);
        assert_eq!(report.diagnostics[0].rule, RULE_ID);
        assert_eq!(report.diagnostics[0].column, 7);

        let mut buf = Vec::new();
        write_json(&mut buf, ".", &sample()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["literals_visited"], 10);
        assert_eq!(value["diagnostics"][0]["message"], "pkg.Test is missing field D");
    }

    #[test]
    fn test_sarif_report() {
        let report = sarif_report(Path::new("/work"), &sample());
        assert_eq!(report.version, "2.1.0");
        let run = &report.runs[0];
        assert_eq!(run.tool.driver.rules.len(), 1);
        assert_eq!(run.tool.driver.rules[0].id, "exhaustruct");

        let location = &run.results[0].locations[0].physical_location;
        assert_eq!(location.artifact_location.uri, "pkg/a.go");
        assert_eq!(location.region.start_line, 12);
        assert_eq!(location.region.start_column, 7);
    }

    #[test]
    fn test_make_relative_path() {
        assert_eq!(make_relative_path("/a/b/c.go", Path::new("/a")), "b/c.go");
        assert_eq!(make_relative_path("/x/c.go", Path::new("/a")), "/x/c.go");
        assert_eq!(make_relative_path("c.go", Path::new("")), "c.go");
    }

    #[test]
    fn test_pretty_output() {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        write_pretty(&mut buf, "dump.json", &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("Diagnostics (1)"));
        assert!(text.contains("/work/pkg/a.go:12:7"));
        assert!(text.contains("pkg.Test is missing field D"));
        assert!(text.contains("FAIL"));

        let mut buf = Vec::new();
        write_pretty(&mut buf, "dump.json", &CheckResult::default()).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("PASS"));
    }
}
