use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::easyalias::tools::error::{Result, ToolError};

/// Offset of the character before `A`, used for bijective base-26 columns.
const COLUMN_BASE: u32 = 'A' as u32 - 1;

/// Largest row index of an Excel worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Largest column index of an Excel worksheet (`XFD`).
pub const MAX_COLUMNS: u32 = 16_384;
/// Most cells a single selection may expand to.
pub const MAX_SELECTION_CELLS: u64 = MAX_ROWS as u64;

/// A single cell address in A1 notation. Rows and columns start at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl CellRef {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }

    /// Parses `B12`, `b12` or `$B$12`. Addresses beyond `XFD1048576` are
    /// rejected.
    pub fn parse(label: &str) -> Result<Self> {
        let invalid = || ToolError::InvalidCellReference(label.to_string());
        let trimmed = label.trim();
        let unanchored = trimmed.strip_prefix('$').unwrap_or(trimmed);

        let split = unanchored
            .find(|ch: char| !ch.is_ascii_alphabetic())
            .ok_or_else(invalid)?;
        let (letters, rest) = unanchored.split_at(split);
        let digits = rest.strip_prefix('$').unwrap_or(rest);

        if letters.is_empty()
            || digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|byte| byte.is_ascii_digit())
        {
            return Err(invalid());
        }

        let column = column_index(letters).ok_or_else(invalid)?;
        let row = digits.parse::<u32>().map_err(|_| invalid())?;
        if row > MAX_ROWS || column > MAX_COLUMNS {
            return Err(invalid());
        }
        Ok(Self { row, column })
    }

    /// The neighbour one column to the right on the same row. Right of `XFD`
    /// this is off the worksheet, which hosts reject on assignment.
    pub fn next_column(self) -> Self {
        Self {
            row: self.row,
            column: self.column.saturating_add(1),
        }
    }

    /// Zero-based `(row, column)` as used by the spreadsheet libraries.
    pub fn zero_based(self) -> (u32, u32) {
        (self.row - 1, self.column - 1)
    }

    pub fn from_zero_based(row: u32, column: u32) -> Self {
        Self {
            row: row.saturating_add(1),
            column: column.saturating_add(1),
        }
    }

    /// Absolute form, e.g. `$B$12`.
    pub fn to_absolute(self) -> String {
        format!("${}${}", column_label(self.column), self.row)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_label(self.column), self.row)
    }
}

impl FromStr for CellRef {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl Serialize for CellRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Converts column letters to a 1-based index (`A` → 1, `AA` → 27).
pub fn column_index(letters: &str) -> Option<u32> {
    if letters.is_empty() {
        return None;
    }
    letters.chars().try_fold(0u32, |acc, ch| {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        let digit = ch.to_ascii_uppercase() as u32 - COLUMN_BASE;
        acc.checked_mul(26)?.checked_add(digit)
    })
}

/// Converts a 1-based column index to letters (`1` → `A`, `27` → `AA`).
pub fn column_label(column: u32) -> String {
    let mut label = Vec::new();
    let mut dividend = column;
    while dividend > 0 {
        let remainder = (dividend - 1) % 26;
        label.push(char::from_u32(remainder + 'A' as u32).unwrap_or('A'));
        dividend = (dividend - 1) / 26;
    }
    label.iter().rev().collect()
}

/// A rectangular block of cells, e.g. `A1:A5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Parses `A1:B3` or a single cell. Reversed corners are normalised.
    pub fn parse(text: &str) -> Result<Self> {
        let (first, second) = match text.split_once(':') {
            Some((first, second)) => (CellRef::parse(first)?, CellRef::parse(second)?),
            None => {
                let cell = CellRef::parse(text)?;
                (cell, cell)
            }
        };

        Ok(Self {
            start: CellRef::new(first.row.min(second.row), first.column.min(second.column)),
            end: CellRef::new(first.row.max(second.row), first.column.max(second.column)),
        })
    }

    /// Number of cells covered by the range.
    pub fn cell_count(&self) -> u64 {
        let rows = u64::from(self.end.row - self.start.row) + 1;
        let columns = u64::from(self.end.column - self.start.column) + 1;
        rows * columns
    }

    /// Cells of the range, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.column..=self.end.column).map(move |column| CellRef::new(row, column))
        })
    }
}

impl FromStr for CellRange {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

/// Expands a selection of ranges, keeping the first occurrence of each cell.
pub fn expand_selection(ranges: &[CellRange]) -> Result<Vec<CellRef>> {
    let cells = ranges
        .iter()
        .fold(0u64, |total, range| total.saturating_add(range.cell_count()));
    if cells > MAX_SELECTION_CELLS {
        return Err(ToolError::SelectionTooLarge {
            cells,
            limit: MAX_SELECTION_CELLS,
        });
    }

    let mut seen = std::collections::HashSet::new();
    Ok(ranges
        .iter()
        .flat_map(CellRange::cells)
        .filter(|cell| seen.insert(*cell))
        .collect())
}
