use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use easyalias_tools::apply::{self, ApplyOptions};
use easyalias_tools::batch::AssignOptions;
use easyalias_tools::cell::CellRange;
use easyalias_tools::logging;
use easyalias_tools::{Result, ToolError};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    logging::init(cli.verbose)?;
    match cli.command {
        Command::Assign(args) => execute_assign(args),
    }
}

fn execute_assign(args: AssignArgs) -> Result<()> {
    if !args.input.exists() {
        return Err(ToolError::MissingInput(args.input));
    }

    let options = ApplyOptions {
        sheet: args.sheet,
        selection: args.cells,
        assign: AssignOptions {
            custom_alias: !args.no_custom_alias,
        },
    };

    let output = if args.dry_run {
        None
    } else {
        args.output.as_deref()
    };
    let report = apply::apply_aliases(&args.input, output, &options)?;

    if let Some(path) = &args.report {
        report.write_json(path)?;
    }

    for entry in report.failures() {
        eprintln!("{entry}");
    }

    match report.failed() {
        0 => Ok(()),
        failed => Err(ToolError::AssignmentsFailed {
            failed,
            total: report.total(),
        }),
    }
}

fn parse_range(value: &str) -> std::result::Result<CellRange, String> {
    CellRange::parse(value).map_err(|error| error.to_string())
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Turn spreadsheet labels into aliases for the cells next to them."
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assign aliases to the right-hand neighbours of the selected cells.
    Assign(AssignArgs),
}

#[derive(clap::Args)]
struct AssignArgs {
    /// Workbook to read.
    #[arg(long)]
    input: PathBuf,

    /// Where to write the updated workbook.
    #[arg(long, required_unless_present = "dry_run")]
    output: Option<PathBuf>,

    /// Worksheet holding the selection. Defaults to the first sheet.
    #[arg(long)]
    sheet: Option<String>,

    /// Selected label cells, e.g. `A1:A10`. May be repeated.
    #[arg(long, required = true, num_args = 1.., value_parser = parse_range)]
    cells: Vec<CellRange>,

    /// Report what would happen without writing a workbook.
    #[arg(long)]
    dry_run: bool,

    /// Write a JSON report of every processed cell.
    #[arg(long)]
    report: Option<PathBuf>,

    /// Use the whole label even when it ends in `(alias)`.
    #[arg(long)]
    no_custom_alias: bool,
}
