use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use tracing::debug;

use crate::easyalias::tools::cell::CellRef;
use crate::easyalias::tools::error::{Result, ToolError};
use crate::easyalias::tools::model::{CellValue, DefinedName, NameTarget, Sheet, SheetCell, Workbook};

/// Reads cell values and defined names from an Excel workbook.
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let names = workbook
        .defined_names()
        .iter()
        .map(|(name, formula)| DefinedName {
            name: name.clone(),
            target: parse_name_target(formula),
        })
        .collect::<Vec<_>>();

    let mut sheets = Vec::new();
    for sheet_name in workbook.sheet_names().to_vec() {
        let range = read_required_sheet(&mut workbook, &sheet_name)?;
        sheets.push(ingest_sheet(sheet_name, &range));
    }

    debug!(
        sheet_count = sheets.len(),
        name_count = names.len(),
        "workbook loaded"
    );
    Ok(Workbook { sheets, names })
}

fn read_required_sheet<R: std::io::Read + std::io::Seek>(
    workbook: &mut Xlsx<R>,
    name: &str,
) -> Result<calamine::Range<DataType>> {
    let range_result = workbook
        .worksheet_range(name)
        .ok_or_else(|| ToolError::InvalidWorkbook(format!("missing sheet '{name}'")))?;
    let range = range_result.map_err(ToolError::from)?;
    Ok(range)
}

fn ingest_sheet(name: String, range: &calamine::Range<DataType>) -> Sheet {
    let mut sheet = Sheet::new(name);
    let Some((start_row, start_column)) = range.start() else {
        return sheet;
    };

    for (row, column, cell) in range.cells() {
        if let Some(value) = cell_to_value(cell) {
            let position =
                CellRef::from_zero_based(start_row + row as u32, start_column + column as u32);
            sheet.cells.insert(position, value);
        }
    }
    sheet
}

fn cell_to_value(cell: &DataType) -> Option<CellValue> {
    match cell {
        DataType::Empty => None,
        DataType::String(value) => Some(CellValue::String(value.clone())),
        DataType::Float(value) => Some(CellValue::Number(*value)),
        DataType::Int(value) => Some(CellValue::Number(*value as f64)),
        DataType::Bool(value) => Some(CellValue::Boolean(*value)),
        other => Some(CellValue::String(other.to_string())),
    }
}

/// Interprets a defined-name formula such as `'My Sheet'!$B$2`. Anything that
/// is not a single cell on a sheet is kept as an opaque formula.
pub fn parse_name_target(formula: &str) -> NameTarget {
    let body = formula.trim().trim_start_matches('=');
    let single_cell = body.rsplit_once('!').and_then(|(sheet, cell)| {
        let sheet = unquote_sheet_name(sheet)?;
        let cell = CellRef::parse(cell).ok()?;
        Some(SheetCell::new(sheet, cell))
    });

    match single_cell {
        Some(cell) => NameTarget::Cell(cell),
        None => NameTarget::Formula(body.to_string()),
    }
}

fn unquote_sheet_name(raw: &str) -> Option<String> {
    if let Some(inner) = raw
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Some(inner.replace("''", "'"));
    }
    let plain = !raw.is_empty()
        && !raw.contains(|ch: char| matches!(ch, '\'' | ' ' | '(' | ')' | ',' | ':' | '!'));
    plain.then(|| raw.to_string())
}
