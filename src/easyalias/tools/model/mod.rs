use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::easyalias::tools::cell::CellRef;

/// Prefix Excel reserves for built-in names such as `_xlnm.Print_Area`.
pub const BUILTIN_NAME_PREFIX: &str = "_xlnm.";

/// Represents a literal value stored in a cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Plain string literal.
    String(String),
    /// Floating point number literal.
    Number(f64),
    /// Boolean literal.
    Boolean(bool),
}

impl CellValue {
    /// Text shown for the cell, used as the alias source.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::String(value) => value.clone(),
            CellValue::Number(value) => value.to_string(),
            CellValue::Boolean(value) => value.to_string().to_uppercase(),
        }
    }
}

/// A worksheet and its non-empty cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub cells: BTreeMap<CellRef, CellValue>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cells: BTreeMap::new(),
        }
    }

    /// Text of `cell`, empty when the cell holds nothing.
    pub fn text(&self, cell: CellRef) -> String {
        self.cells
            .get(&cell)
            .map(CellValue::display_text)
            .unwrap_or_default()
    }
}

/// A cell on a named sheet. This is the target handle used for aliases.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SheetCell {
    pub sheet: String,
    pub cell: CellRef,
}

impl SheetCell {
    pub fn new(sheet: impl Into<String>, cell: CellRef) -> Self {
        Self {
            sheet: sheet.into(),
            cell,
        }
    }

    /// Absolute reference in formula syntax, e.g. `'My Sheet'!$B$2`.
    pub fn to_formula_reference(&self) -> String {
        format!("{}!{}", quote_sheet_name(&self.sheet), self.cell.to_absolute())
    }
}

impl fmt::Display for SheetCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}!{}", quote_sheet_name(&self.sheet), self.cell)
    }
}

/// What a defined name refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum NameTarget {
    /// A single cell, i.e. an alias.
    Cell(SheetCell),
    /// Any other formula, kept verbatim without the leading `=`.
    Formula(String),
}

/// A workbook-level defined name.
#[derive(Debug, Clone, PartialEq)]
pub struct DefinedName {
    pub name: String,
    pub target: NameTarget,
}

impl DefinedName {
    pub fn is_builtin(&self) -> bool {
        self.name.starts_with(BUILTIN_NAME_PREFIX)
    }

    /// The formula written back to the workbook.
    pub fn formula(&self) -> String {
        match &self.target {
            NameTarget::Cell(cell) => format!("={}", cell.to_formula_reference()),
            NameTarget::Formula(formula) => format!("={formula}"),
        }
    }
}

/// In-memory view of a workbook: sheet contents plus defined names.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
    pub names: Vec<DefinedName>,
}

impl Workbook {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }

    /// The alias currently assigned to `target`, if any.
    pub fn alias_of(&self, target: &SheetCell) -> Option<&str> {
        self.names.iter().find_map(|name| match &name.target {
            NameTarget::Cell(cell) if cell == target => Some(name.name.as_str()),
            _ => None,
        })
    }
}

/// Quotes a sheet name for use in a formula when it is not a plain word.
pub fn quote_sheet_name(name: &str) -> String {
    let plain = !name.is_empty()
        && !name.starts_with(|ch: char| ch.is_ascii_digit())
        && name.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_');
    if plain {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}
