use std::path::Path;

use rust_xlsxwriter::Workbook as XlsxWorkbook;
use tracing::debug;

use crate::easyalias::tools::error::Result;
use crate::easyalias::tools::model::{CellValue, Workbook};

/// Writes the provided workbook model to the given path.
///
/// Only cell values and user defined names are saved. Built-in `_xlnm.` names
/// (print areas, filter ranges) are sheet-scoped and are not written back, so
/// they are lost in the output workbook.
pub fn write_workbook(path: &Path, workbook: &Workbook) -> Result<()> {
    let mut workbook_writer = XlsxWorkbook::new();

    for sheet in &workbook.sheets {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&sheet.name)?;

        for (cell, value) in &sheet.cells {
            let (row, column) = cell.zero_based();
            let column = column as u16;
            match value {
                CellValue::String(text) => {
                    worksheet.write_string(row, column, text)?;
                }
                CellValue::Number(number) => {
                    worksheet.write_number(row, column, *number)?;
                }
                CellValue::Boolean(flag) => {
                    worksheet.write_boolean(row, column, *flag)?;
                }
            }
        }
    }

    for name in workbook.names.iter().filter(|name| !name.is_builtin()) {
        workbook_writer.define_name(&name.name, &name.formula())?;
    }

    debug!(
        sheet_count = workbook.sheets.len(),
        name_count = workbook.names.len(),
        path = %path.display(),
        "saving workbook"
    );
    workbook_writer.save(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::easyalias::tools::cell::CellRef;
    use crate::easyalias::tools::io::excel_read::read_workbook;
    use crate::easyalias::tools::model::{DefinedName, NameTarget, Sheet, SheetCell};

    #[test]
    fn builtin_names_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.xlsx");

        let mut sheet = Sheet::new("Parameters");
        sheet
            .cells
            .insert(CellRef::new(1, 1), CellValue::String("radius".into()));
        let radius = SheetCell::new("Parameters", CellRef::new(1, 2));
        let model = Workbook {
            sheets: vec![sheet],
            names: vec![
                DefinedName {
                    name: "_xlnm.Print_Area".to_string(),
                    target: NameTarget::Formula("Parameters!$A$1:$B$9".to_string()),
                },
                DefinedName {
                    name: "radius".to_string(),
                    target: NameTarget::Cell(radius.clone()),
                },
            ],
        };

        write_workbook(&path, &model).unwrap();
        let saved = read_workbook(&path).unwrap();

        assert_eq!(
            saved.names,
            vec![DefinedName {
                name: "radius".to_string(),
                target: NameTarget::Cell(radius),
            }]
        );
    }
}
