use std::path::Path;

use tracing::{debug, info, instrument};

use crate::easyalias::tools::batch::{AssignOptions, BatchAssigner};
use crate::easyalias::tools::cell::{CellRange, expand_selection};
use crate::easyalias::tools::error::{Result, ToolError};
use crate::easyalias::tools::host::WorkbookHost;
use crate::easyalias::tools::io::{excel_read, excel_write};
use crate::easyalias::tools::model::{SheetCell, Workbook};
use crate::easyalias::tools::report::AssignmentReport;

/// Which cells to process and how.
#[derive(Debug, Clone, Default)]
pub struct ApplyOptions {
    /// Worksheet holding the selection; the first sheet when `None`.
    pub sheet: Option<String>,
    /// Selected source cells. Aliases go to the cell to the right of each.
    pub selection: Vec<CellRange>,
    pub assign: AssignOptions,
}

/// Assigns aliases inside an in-memory workbook and returns the updated
/// workbook together with the report.
#[instrument(level = "debug", skip_all, fields(sheet = ?options.sheet))]
pub fn apply_to_workbook(
    workbook: Workbook,
    options: &ApplyOptions,
) -> Result<(Workbook, AssignmentReport)> {
    let sheet = resolve_sheet(&workbook, options.sheet.as_deref())?;
    let selection = expand_selection(&options.selection)?;
    debug!(%sheet, cells = selection.len(), "selection expanded");

    let mut host = WorkbookHost::new(workbook);
    let requests = host.requests_for(&sheet, &selection)?;
    let results = BatchAssigner::new(options.assign).assign(&mut host, &requests);

    let sources = selection
        .iter()
        .map(|cell| SheetCell::new(sheet.as_str(), *cell))
        .collect();
    let report = AssignmentReport::new(sources, requests, results);
    Ok((host.into_workbook(), report))
}

/// Reads `input`, assigns aliases for the selection and writes the result to
/// `output`. With no output path the workbook is left untouched.
#[instrument(
    level = "info",
    skip_all,
    fields(input = %input.display(), output = ?output.map(Path::display))
)]
pub fn apply_aliases(
    input: &Path,
    output: Option<&Path>,
    options: &ApplyOptions,
) -> Result<AssignmentReport> {
    let workbook = excel_read::read_workbook(input)?;
    info!(
        sheet_count = workbook.sheets.len(),
        name_count = workbook.names.len(),
        "read workbook"
    );

    let (workbook, report) = apply_to_workbook(workbook, options)?;
    info!(
        total = report.total(),
        failed = report.failed(),
        "alias assignment finished"
    );

    if let Some(output) = output {
        excel_write::write_workbook(output, &workbook)?;
    }
    Ok(report)
}

fn resolve_sheet(workbook: &Workbook, requested: Option<&str>) -> Result<String> {
    match requested {
        Some(name) => workbook
            .sheet(name)
            .map(|sheet| sheet.name.clone())
            .ok_or_else(|| ToolError::MissingSheet(name.to_string())),
        None => workbook
            .sheets
            .first()
            .map(|sheet| sheet.name.clone())
            .ok_or_else(|| ToolError::InvalidWorkbook("workbook has no worksheets".into())),
    }
}
