//! [`AliasHost`] implementation backed by the in-memory workbook model.
//!
//! Aliases are workbook-level defined names that refer to a single cell.
//! Names are compared ignoring ASCII case, as Excel does.

use std::collections::HashMap;

use crate::easyalias::tools::batch::{AliasHost, AssignmentRequest};
use crate::easyalias::tools::cell::{CellRef, MAX_COLUMNS, MAX_ROWS, column_index};
use crate::easyalias::tools::error::{Result, ToolError};
use crate::easyalias::tools::model::{DefinedName, NameTarget, SheetCell, Workbook};
use crate::easyalias::tools::sanitize::Alias;

/// Longest defined name Excel accepts.
pub const MAX_NAME_LEN: usize = 255;

/// Owns a workbook while aliases are being assigned to it.
#[derive(Debug, Clone)]
pub struct WorkbookHost {
    workbook: Workbook,
}

impl WorkbookHost {
    pub fn new(workbook: Workbook) -> Self {
        Self { workbook }
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    /// Builds one request per selected cell: the cell text is the source and
    /// the neighbour in the next column is the target.
    pub fn requests_for(
        &self,
        sheet: &str,
        selection: &[CellRef],
    ) -> Result<Vec<AssignmentRequest<SheetCell>>> {
        let source = self
            .workbook
            .sheet(sheet)
            .ok_or_else(|| ToolError::MissingSheet(sheet.to_string()))?;

        Ok(selection
            .iter()
            .map(|cell| {
                AssignmentRequest::new(
                    source.text(*cell),
                    SheetCell::new(sheet, cell.next_column()),
                )
            })
            .collect())
    }

    fn validate(&self, target: &SheetCell, alias: &Alias) -> std::result::Result<(), String> {
        if self.workbook.sheet(&target.sheet).is_none() {
            return Err(format!("worksheet '{}' does not exist", target.sheet));
        }
        if target.cell.row > MAX_ROWS || target.cell.column > MAX_COLUMNS {
            return Err(format!("cell {} is outside the worksheet", target.cell));
        }
        if alias.as_str().len() > MAX_NAME_LEN {
            return Err(format!(
                "alias '{alias}' is longer than {MAX_NAME_LEN} characters"
            ));
        }
        if looks_like_cell_reference(alias.as_str()) {
            return Err(format!(
                "invalid alias '{alias}': it looks like a cell reference"
            ));
        }
        let clash = self.workbook.names.iter().find(|name| {
            name.name.eq_ignore_ascii_case(alias.as_str())
                && name.target != NameTarget::Cell(target.clone())
        });
        if let Some(existing) = clash {
            return Err(format!(
                "alias '{alias}' is already in use as '{}'",
                existing.name
            ));
        }
        Ok(())
    }
}

impl AliasHost for WorkbookHost {
    type Target = SheetCell;

    fn existing_aliases(&self) -> HashMap<String, Option<SheetCell>> {
        self.workbook
            .names
            .iter()
            .filter(|name| !name.is_builtin())
            .map(|name| {
                let holder = match &name.target {
                    NameTarget::Cell(cell) => Some(cell.clone()),
                    NameTarget::Formula(_) => None,
                };
                (name.name.clone(), holder)
            })
            .collect()
    }

    fn alias_key(&self, alias: &str) -> String {
        alias.to_ascii_lowercase()
    }

    fn set_alias(&mut self, target: &SheetCell, alias: &Alias) -> std::result::Result<(), String> {
        self.validate(target, alias)?;

        let cell_target = NameTarget::Cell(target.clone());
        self.workbook
            .names
            .retain(|name| name.is_builtin() || name.target != cell_target);
        self.workbook.names.push(DefinedName {
            name: alias.to_string(),
            target: cell_target,
        });
        Ok(())
    }
}

/// Excel refuses names that could be read as `A1` or `R1C1` references.
fn looks_like_cell_reference(name: &str) -> bool {
    looks_like_a1(name) || looks_like_r1c1(name)
}

fn looks_like_a1(name: &str) -> bool {
    let split = name
        .find(|ch: char| !ch.is_ascii_alphabetic())
        .unwrap_or(name.len());
    let (letters, digits) = name.split_at(split);
    !letters.is_empty()
        && !digits.is_empty()
        && digits.bytes().all(|byte| byte.is_ascii_digit())
        && column_index(letters).is_some_and(|column| column <= MAX_COLUMNS)
}

fn looks_like_r1c1(name: &str) -> bool {
    let upper = name.to_ascii_uppercase();
    let Some(rest) = upper.strip_prefix('R') else {
        return upper == "C" || is_c_part(&upper);
    };
    let row_digits = rest.len() - rest.trim_start_matches(|ch: char| ch.is_ascii_digit()).len();
    let rest = &rest[row_digits..];
    rest.is_empty() || is_c_part(rest)
}

fn is_c_part(text: &str) -> bool {
    text.strip_prefix('C')
        .is_some_and(|digits| digits.bytes().all(|byte| byte.is_ascii_digit()))
}
