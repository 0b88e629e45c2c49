//! # sheetproj-import
//!
//! Spreadsheet import engine for sheetproj projects.
//!
//! Reads CSV text or a workbook (xlsx, xls, ods) holding a task table,
//! optionally followed by a blank row and a resource table, and builds the
//! tasks, hierarchy, dependencies, resources, assignments and custom
//! properties of a [`Project`].
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sheetproj_core::{DayTimeUnitStack, Project};
//! use sheetproj_import::{SpreadsheetFormat, SpreadsheetImporter};
//!
//! let csv = "\
//! ID,Name,Begin date,End date,Predecessors,Outline number
//! 1,design,23/07/12,26/07/12,,1
//! 2,build,27/07/12,30/07/12,1,2
//! ";
//! let mut project = Project::new("demo", NaiveDate::from_ymd_opt(2012, 7, 23).unwrap());
//! let report = SpreadsheetImporter::new(
//!     csv.as_bytes(),
//!     &mut project,
//!     &DayTimeUnitStack,
//!     SpreadsheetFormat::Csv,
//! )
//! .load()
//! .unwrap();
//!
//! assert_eq!(report.tasks_created, 2);
//! assert_eq!(report.dependencies_created, 1);
//! ```

rust_i18n::i18n!("locales", fallback = "en");

pub mod config;
pub mod custom;
pub mod dependency;
pub mod export;
pub mod header;
pub mod hierarchy;
mod importer;
pub mod record;
pub mod resources;
pub mod source;
pub mod warning;
pub mod writer;

pub use config::ImportConfig;
pub use export::export_project;
pub use importer::SpreadsheetImporter;
pub use warning::{ImportWarning, WarningCode};
pub use writer::{CsvSpreadsheetWriter, SpreadsheetWriter, XlsxSpreadsheetWriter};

use serde::Serialize;
use sheetproj_core::{Project, TimeUnitStack};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

// ============================================================================
// Formats
// ============================================================================

/// Container format of a tabular file
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SpreadsheetFormat {
    /// Delimited text
    Csv,
    /// Binary workbook; xls, xlsb and ods are read as well
    Xlsx,
}

impl SpreadsheetFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" | "txt" => Some(SpreadsheetFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => Some(SpreadsheetFormat::Xlsx),
            _ => None,
        }
    }
}

impl FromStr for SpreadsheetFormat {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(SpreadsheetFormat::Csv),
            "xlsx" | "xls" | "ods" => Ok(SpreadsheetFormat::Xlsx),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Outcome of a successful load
#[derive(Clone, Debug, Default, Serialize)]
pub struct ImportReport {
    pub warnings: Vec<ImportWarning>,
    /// Tables recognized and imported
    pub tables: usize,
    pub tasks_created: usize,
    pub resources_created: usize,
    pub dependencies_created: usize,
    pub assignments_created: usize,
    /// Data rows that produced nothing
    pub rows_skipped: usize,
}

impl ImportReport {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Warnings carrying `code`
    pub fn warnings_with(&self, code: WarningCode) -> impl Iterator<Item = &ImportWarning> {
        self.warnings.iter().filter(move |w| w.code == code)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Fatal import errors
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("Workbook contains no worksheet")]
    NoWorksheet,

    #[error("Input contains no data")]
    EmptyInput,

    #[error("No task or resource table header found (first row {row})")]
    UnrecognizedTable { row: usize },

    #[error("Invalid date format: '{0}'")]
    InvalidDateFormat(String),

    #[error("Invalid CSV delimiter: '{0}'")]
    InvalidDelimiter(char),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

// ============================================================================
// File helpers
// ============================================================================

/// Import a file, picking the format from its extension
pub fn import_file(
    path: &Path,
    project: &mut Project,
    time_units: &dyn TimeUnitStack,
    config: ImportConfig,
) -> Result<ImportReport, ImportError> {
    let format = SpreadsheetFormat::from_path(path)
        .ok_or_else(|| ImportError::UnsupportedFormat(path.display().to_string()))?;
    let file = File::open(path)?;
    SpreadsheetImporter::new(file, project, time_units, format)
        .with_config(config)
        .load()
}

/// Export a project to a file, picking the format from its extension
pub fn export_file(
    project: &Project,
    time_units: &dyn TimeUnitStack,
    path: &Path,
    config: &ImportConfig,
) -> Result<(), ExportError> {
    match SpreadsheetFormat::from_path(path) {
        Some(SpreadsheetFormat::Csv) => {
            let file = BufWriter::new(File::create(path)?);
            let delimiter = u8::try_from(config.csv_delimiter).unwrap_or(b',');
            let mut writer = CsvSpreadsheetWriter::new(file).with_delimiter(delimiter);
            export_project(project, time_units, &mut writer, config)?;
            writer.finish()?;
        }
        Some(SpreadsheetFormat::Xlsx) => {
            let mut writer = XlsxSpreadsheetWriter::new().with_sheet_name("Schedule")?;
            export_project(project, time_units, &mut writer, config)?;
            std::fs::write(path, writer.finish()?)?;
        }
        None => return Err(ExportError::UnsupportedFormat(path.display().to_string())),
    }
    Ok(())
}
