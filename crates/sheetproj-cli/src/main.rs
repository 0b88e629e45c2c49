//! sheetproj CLI - spreadsheet import for project schedules
//!
//! Checks CSV and workbook schedules and converts between the two formats.

mod diagnostics;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use sheetproj_core::{DayTimeUnitStack, Project};
use sheetproj_import::{
    export::outline, ImportConfig, ImportError, ImportReport, SpreadsheetFormat,
    SpreadsheetImporter,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use diagnostics::{
    Diagnostic, DiagnosticConfig, DiagnosticEmitter, ExitCode, JsonEmitter, TerminalEmitter,
};

#[derive(Parser)]
#[command(name = "sheetproj")]
#[command(author, version, about = "Spreadsheet import for project schedules", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a schedule and report what was built
    Check {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        report: ReportArgs,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// List the imported tasks as an outline
        #[arg(long)]
        tree: bool,
    },

    /// Import a schedule and write it out as CSV or xlsx
    Convert {
        /// Input file path
        #[arg(value_name = "INPUT")]
        input_file: PathBuf,

        /// Output file path; the extension picks the format
        #[arg(value_name = "OUTPUT")]
        output_file: PathBuf,

        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        report: ReportArgs,
    },
}

/// How to read the input
#[derive(Args)]
struct InputArgs {
    /// Input format, guessed from the extension when omitted
    #[arg(long, value_enum, value_name = "FORMAT")]
    input_format: Option<InputFormat>,

    /// TOML file with import settings
    #[arg(short, long, value_name = "FILE", env = "SHEETPROJ_CONFIG")]
    config: Option<PathBuf>,

    /// Date pattern in cells, e.g. %Y-%m-%d
    #[arg(long)]
    date_format: Option<String>,

    /// Field delimiter for CSV input
    #[arg(long)]
    delimiter: Option<char>,

    /// Project start date for tasks without dates (default: today)
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<NaiveDate>,
}

/// How to report diagnostics
#[derive(Args)]
struct ReportArgs {
    /// Treat warnings as errors
    #[arg(long)]
    strict: bool,

    /// Only show errors
    #[arg(short, long)]
    quiet: bool,
}

impl ReportArgs {
    fn diagnostic_config(&self) -> DiagnosticConfig {
        DiagnosticConfig {
            strict: self.strict,
            quiet: self.quiet,
            base_path: None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    Csv,
    /// xlsx, xls, xlsb or ods workbook
    Xlsx,
}

impl From<InputFormat> for SpreadsheetFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Csv => SpreadsheetFormat::Csv,
            InputFormat::Xlsx => SpreadsheetFormat::Xlsx,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Check {
            file,
            input,
            report,
            format,
            tree,
        } => cmd_check(&file, &input, &report, format, tree),
        Commands::Convert {
            input_file,
            output_file,
            input,
            report,
        } => cmd_convert(&input_file, &output_file, &input, &report),
    };

    match result {
        Ok(code) => code.into(),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::Failure.into()
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "error",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

// ============================================================================
// Import
// ============================================================================

/// Settings from `--config`, then command-line overrides
fn load_config(args: &InputArgs) -> Result<ImportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse config {}", path.display()))?
        }
        None => ImportConfig::default(),
    };
    if let Some(format) = &args.date_format {
        config = config.with_date_format(format.clone());
    }
    if let Some(delimiter) = args.delimiter {
        config = config.with_csv_delimiter(delimiter);
    }
    Ok(config)
}

fn import(
    path: &Path,
    args: &InputArgs,
    config: &ImportConfig,
) -> Result<(Project, Result<ImportReport, ImportError>)> {
    let format = match args.input_format {
        Some(format) => format.into(),
        None => SpreadsheetFormat::from_path(path)
            .with_context(|| format!("Cannot tell the format of {}, use --input-format", path.display()))?,
    };
    let start = args
        .start
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    info!(file = %path.display(), ?format, %start, "importing");
    let mut project = Project::new(name, start);
    let result = match File::open(path) {
        Ok(file) => SpreadsheetImporter::new(file, &mut project, &DayTimeUnitStack, format)
            .with_config(config.clone())
            .load(),
        Err(e) => Err(ImportError::Io(e)),
    };
    Ok((project, result))
}

fn emit_all(emitter: &mut impl DiagnosticEmitter, path: &Path, result: &Result<ImportReport, ImportError>) {
    match result {
        Ok(report) => {
            for warning in &report.warnings {
                emitter.emit(Diagnostic::warning(warning, path));
            }
        }
        Err(e) => emitter.emit(Diagnostic::error(e, path)),
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Serialize)]
struct CheckSummary<'a> {
    file: String,
    tables: usize,
    tasks: usize,
    resources: usize,
    dependencies: usize,
    assignments: usize,
    rows_skipped: usize,
    diagnostics: &'a serde_json::Value,
}

fn cmd_check(
    file: &Path,
    input: &InputArgs,
    report_args: &ReportArgs,
    format: OutputFormat,
    tree: bool,
) -> Result<ExitCode> {
    let (project, result) = import(file, input, &load_config(input)?)?;
    let config = report_args.diagnostic_config();

    match format {
        OutputFormat::Json => {
            let mut emitter = JsonEmitter::new(config);
            emit_all(&mut emitter, file, &result);
            let diagnostics = emitter.to_json_value();
            let report = result.as_ref().ok();
            let summary = CheckSummary {
                file: file.display().to_string(),
                tables: report.map_or(0, |r| r.tables),
                tasks: project.tasks.len(),
                resources: project.resources.len(),
                dependencies: project.tasks.dependencies().len(),
                assignments: project.resources.assignments().len(),
                rows_skipped: report.map_or(0, |r| r.rows_skipped),
                diagnostics: &diagnostics,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(emitter.exit_code())
        }
        OutputFormat::Text => {
            let mut emitter = TerminalEmitter::new(std::io::stderr(), config);
            emit_all(&mut emitter, file, &result);
            if let Ok(report) = &result {
                println!(
                    "{}: {} tasks, {} resources, {} dependencies, {} assignments",
                    file.display(),
                    report.tasks_created,
                    report.resources_created,
                    report.dependencies_created,
                    report.assignments_created
                );
                if tree {
                    print_tree(&project);
                }
                if emitter.warning_count() > 0 && !report_args.quiet {
                    eprintln!("{} warning(s)", emitter.warning_count());
                }
            }
            Ok(emitter.exit_code())
        }
    }
}

fn print_tree(project: &Project) {
    for (task_ref, number) in outline(project) {
        let Some(task) = project.tasks.task(task_ref) else {
            continue;
        };
        let depth = number.matches('.').count();
        let marker = if task.milestone { " (milestone)" } else { "" };
        println!(
            "{:indent$}{} {}  {} .. {}{}",
            "",
            number,
            task.name,
            task.start,
            task.end(),
            marker,
            indent = depth * 2
        );
    }
}

fn cmd_convert(
    input_file: &Path,
    output_file: &Path,
    input: &InputArgs,
    report_args: &ReportArgs,
) -> Result<ExitCode> {
    let config = load_config(input)?;
    let (project, result) = import(input_file, input, &config)?;
    let mut emitter = TerminalEmitter::new(std::io::stderr(), report_args.diagnostic_config());
    emit_all(&mut emitter, input_file, &result);

    let code = emitter.exit_code();
    if !code.is_success() {
        return Ok(code);
    }
    sheetproj_import::export_file(&project, &DayTimeUnitStack, output_file, &config)
        .with_context(|| format!("Failed to write {}", output_file.display()))?;
    if !report_args.quiet {
        eprintln!(
            "Wrote {} tasks and {} resources to {}",
            project.tasks.len(),
            project.resources.len(),
            output_file.display()
        );
    }
    Ok(code)
}
