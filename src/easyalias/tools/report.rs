use std::fmt;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::easyalias::tools::batch::{AssignmentFailure, AssignmentRequest, AssignmentResult};
use crate::easyalias::tools::error::Result;
use crate::easyalias::tools::model::SheetCell;
use crate::easyalias::tools::sanitize::Alias;

/// Per-request outcome of a run, in selection order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignmentReport {
    pub entries: Vec<ReportEntry>,
}

/// One selected cell and what happened to its neighbour.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportEntry {
    pub source: SheetCell,
    pub text: String,
    pub target: SheetCell,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Assigned {
        alias: Alias,
    },
    Failed {
        kind: &'static str,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        alias: Option<Alias>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        conflicts: Vec<SheetCell>,
    },
}

impl From<AssignmentResult<SheetCell>> for Outcome {
    fn from(result: AssignmentResult<SheetCell>) -> Self {
        match result {
            AssignmentResult::Success(alias) => Outcome::Assigned { alias },
            AssignmentResult::Failure(failure) => {
                let kind = failure.kind();
                let message = failure.to_string();
                let alias = failure.alias().cloned();
                let conflicts = match failure {
                    AssignmentFailure::Duplicate { conflicts, .. } => conflicts,
                    _ => Vec::new(),
                };
                Outcome::Failed {
                    kind,
                    message,
                    alias,
                    conflicts,
                }
            }
        }
    }
}

impl AssignmentReport {
    /// Zips sources, requests and results, which share the same order.
    pub fn new(
        sources: Vec<SheetCell>,
        requests: Vec<AssignmentRequest<SheetCell>>,
        results: Vec<AssignmentResult<SheetCell>>,
    ) -> Self {
        let entries = sources
            .into_iter()
            .zip(requests)
            .zip(results)
            .map(|((source, request), result)| ReportEntry {
                source,
                text: request.text,
                target: request.target,
                outcome: result.into(),
            })
            .collect();
        Self { entries }
    }

    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, Outcome::Failed { .. }))
    }

    /// Writes the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?} -> {}: ", self.source, self.text, self.target.cell)?;
        match &self.outcome {
            Outcome::Assigned { alias } => write!(f, "assigned '{alias}'"),
            Outcome::Failed {
                message, conflicts, ..
            } => {
                write!(f, "{message}")?;
                if !conflicts.is_empty() {
                    let cells: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
                    write!(f, " (conflicting cells: {})", cells.join(", "))?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easyalias::tools::cell::CellRef;

    fn cell(label: &str) -> SheetCell {
        SheetCell::new("Sheet1", CellRef::parse(label).unwrap())
    }

    fn report() -> AssignmentReport {
        let radius = Alias::parse("radius").unwrap();
        AssignmentReport::new(
            vec![cell("A1"), cell("A2"), cell("A3")],
            vec![
                AssignmentRequest::new("radius", cell("B1")),
                AssignmentRequest::new("radius ", cell("B2")),
                AssignmentRequest::new("  ", cell("B3")),
            ],
            vec![
                AssignmentResult::Failure(AssignmentFailure::Duplicate {
                    alias: radius.clone(),
                    conflicts: vec![cell("B1"), cell("B2")],
                }),
                AssignmentResult::Failure(AssignmentFailure::Duplicate {
                    alias: radius,
                    conflicts: vec![cell("B1"), cell("B2")],
                }),
                AssignmentResult::Failure(AssignmentFailure::EmptySource),
            ],
        )
    }

    #[test]
    fn failure_lines_name_source_and_conflicts() {
        let report = report();
        let lines: Vec<String> = report.failures().map(ToString::to_string).collect();

        assert_eq!(report.failed(), 3);
        assert_eq!(
            lines[0],
            "Sheet1!A1 \"radius\" -> B1: duplicate alias: radius (conflicting cells: Sheet1!B1, Sheet1!B2)"
        );
        assert_eq!(lines[2], "Sheet1!A3 \"  \" -> B3: empty source text");
    }

    #[test]
    fn json_carries_status_and_conflicts() {
        let value = serde_json::to_value(report()).unwrap();
        let first = &value["entries"][0];

        assert_eq!(first["status"], "failed");
        assert_eq!(first["kind"], "duplicate");
        assert_eq!(first["alias"], "radius");
        assert_eq!(first["conflicts"][1]["cell"], "B2");
        assert_eq!(first["source"]["sheet"], "Sheet1");
        assert!(value["entries"][2].get("alias").is_none());
    }
}
