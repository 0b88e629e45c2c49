//! Diagnostic formatting for CLI output
//!
//! Import warnings and fatal import errors are turned into [`Diagnostic`]s
//! and written by one of two emitters:
//! - `TerminalEmitter`: rustc-style output to stderr
//! - `JsonEmitter`: machine-readable JSON output
//!
//! ## Exit Code Semantics
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: no errors (warnings allowed) |
//! | 1 | Failure: one or more errors emitted |
//!
//! With `--strict` every warning counts as an error. `--quiet` hides
//! warnings but never changes the exit code.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;
use sheetproj_import::{ImportError, ImportWarning};

// ============================================================================
// Exit Code
// ============================================================================

/// Exit codes for CLI operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// No errors (warnings allowed)
    Success = 0,
    /// One or more errors emitted
    Failure = 1,
}

impl ExitCode {
    /// Determine exit code from error count, after strict escalation
    pub fn from_error_count(count: usize) -> Self {
        if count > 0 {
            ExitCode::Failure
        } else {
            ExitCode::Success
        }
    }

    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// One reportable finding about an input file
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    pub file: Option<PathBuf>,
    /// 1-based row in the input
    pub row: Option<usize>,
}

impl Diagnostic {
    pub fn warning(warning: &ImportWarning, file: &Path) -> Self {
        Self {
            code: warning.code.as_str(),
            severity: Severity::Warning,
            message: warning.message.clone(),
            file: Some(file.to_path_buf()),
            row: warning.row,
        }
    }

    pub fn error(error: &ImportError, file: &Path) -> Self {
        let row = match error {
            ImportError::UnrecognizedTable { row } => Some(*row),
            _ => None,
        };
        Self {
            code: error_code(error),
            severity: Severity::Error,
            message: error.to_string(),
            file: Some(file.to_path_buf()),
            row,
        }
    }
}

/// Stable codes for fatal import errors
pub fn error_code(error: &ImportError) -> &'static str {
    match error {
        ImportError::Io(_) => "E001",
        ImportError::Csv(_) | ImportError::Spreadsheet(_) | ImportError::NoWorksheet => "E002",
        ImportError::EmptyInput => "E003",
        ImportError::UnrecognizedTable { .. } => "E004",
        ImportError::InvalidDateFormat(_)
        | ImportError::InvalidDelimiter(_)
        | ImportError::UnsupportedFormat(_) => "E005",
    }
}

/// Sink for diagnostics
pub trait DiagnosticEmitter {
    fn emit(&mut self, diagnostic: Diagnostic);
}

// ============================================================================
// Diagnostic Config
// ============================================================================

/// Configuration for diagnostic output
#[derive(Debug, Clone, Default)]
pub struct DiagnosticConfig {
    /// Warnings become errors
    pub strict: bool,
    /// Suppress all output except errors
    pub quiet: bool,
    /// Base path to strip from file paths
    pub base_path: Option<PathBuf>,
}

impl DiagnosticConfig {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Default::default()
        }
    }

    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    pub fn effective_severity(&self, severity: Severity) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            severity
        }
    }

    pub fn should_show(&self, severity: Severity) -> bool {
        !self.quiet || self.effective_severity(severity) == Severity::Error
    }

    pub fn normalize_path(&self, path: &Path) -> String {
        if let Some(base) = &self.base_path {
            if let Ok(stripped) = path.strip_prefix(base) {
                return stripped.display().to_string();
            }
        }
        path.display().to_string()
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Writes rustc-style diagnostics
pub struct TerminalEmitter<W: Write> {
    writer: W,
    config: DiagnosticConfig,
    error_count: usize,
    warning_count: usize,
}

impl<W: Write> TerminalEmitter<W> {
    pub fn new(writer: W, config: DiagnosticConfig) -> Self {
        Self {
            writer,
            config,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    fn write_diagnostic(&mut self, diagnostic: &Diagnostic) -> std::io::Result<()> {
        let severity = self.config.effective_severity(diagnostic.severity);
        match severity {
            Severity::Error => self.error_count += 1,
            Severity::Warning => self.warning_count += 1,
        }
        if !self.config.should_show(diagnostic.severity) {
            return Ok(());
        }

        writeln!(
            self.writer,
            "{}[{}]: {}",
            severity.as_str(),
            diagnostic.code,
            diagnostic.message
        )?;
        if let Some(file) = &diagnostic.file {
            let path = self.config.normalize_path(file);
            match diagnostic.row {
                Some(row) => writeln!(self.writer, "  --> {}:{}", path, row)?,
                None => writeln!(self.writer, "  --> {}", path)?,
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

impl<W: Write> DiagnosticEmitter for TerminalEmitter<W> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        // stderr may be closed
        let _ = self.write_diagnostic(&diagnostic);
    }
}

// ============================================================================
// JSON
// ============================================================================

/// Collects diagnostics for machine-readable output
pub struct JsonEmitter {
    diagnostics: Vec<JsonDiagnostic>,
    config: DiagnosticConfig,
    error_count: usize,
}

#[derive(Debug, Serialize)]
pub struct JsonDiagnostic {
    pub code: String,
    pub severity: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
}

impl JsonEmitter {
    pub fn new(config: DiagnosticConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            config,
            error_count: 0,
        }
    }

    pub fn diagnostics(&self) -> &[JsonDiagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from_error_count(self.error_count)
    }

    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(&self.diagnostics).unwrap_or(serde_json::Value::Null)
    }
}

impl DiagnosticEmitter for JsonEmitter {
    fn emit(&mut self, diagnostic: Diagnostic) {
        let severity = self.config.effective_severity(diagnostic.severity);
        if severity == Severity::Error {
            self.error_count += 1;
        }
        if !self.config.should_show(diagnostic.severity) {
            return;
        }
        self.diagnostics.push(JsonDiagnostic {
            code: diagnostic.code.to_string(),
            severity: severity.as_str().to_string(),
            message: diagnostic.message,
            file: diagnostic.file.as_deref().map(|p| self.config.normalize_path(p)),
            row: diagnostic.row,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetproj_import::WarningCode;

    fn make_warning() -> Diagnostic {
        let warning = ImportWarning {
            code: WarningCode::UnknownResource,
            row: Some(7),
            message: "unknown resource 'Ghost'".into(),
        };
        Diagnostic::warning(&warning, Path::new("/project/plan.csv"))
    }

    #[test]
    fn terminal_emitter_basic_output() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut output, DiagnosticConfig::default());
        emitter.emit(make_warning());
        assert_eq!(emitter.warning_count(), 1);
        assert!(emitter.exit_code().is_success());
        drop(emitter);

        let text = String::from_utf8(output).unwrap();
        assert_eq!(
            text,
            "warning[W018]: unknown resource 'Ghost'\n  --> /project/plan.csv:7\n\n"
        );
    }

    #[test]
    fn terminal_emitter_strict_mode() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut output, DiagnosticConfig::strict());
        emitter.emit(make_warning());
        assert_eq!(emitter.error_count(), 1);
        assert_eq!(emitter.exit_code(), ExitCode::Failure);
        drop(emitter);

        assert!(String::from_utf8(output).unwrap().starts_with("error[W018]"));
    }

    #[test]
    fn terminal_emitter_quiet_mode() {
        let mut output = Vec::new();
        let mut emitter = TerminalEmitter::new(&mut output, DiagnosticConfig::quiet());
        emitter.emit(make_warning());
        emitter.emit(Diagnostic::error(&ImportError::EmptyInput, Path::new("plan.csv")));
        assert_eq!(emitter.error_count(), 1);
        drop(emitter);

        let text = String::from_utf8(output).unwrap();
        assert!(!text.contains("W018"));
        assert!(text.contains("error[E003]: Input contains no data"));
    }

    #[test]
    fn terminal_emitter_path_normalization() {
        let mut output = Vec::new();
        let config = DiagnosticConfig::default().with_base_path("/project");
        let mut emitter = TerminalEmitter::new(&mut output, config);
        emitter.emit(make_warning());
        drop(emitter);

        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("  --> plan.csv:7"));
        assert!(!text.contains("/project/"));
    }

    #[test]
    fn error_rows_come_from_the_error() {
        let error = ImportError::UnrecognizedTable { row: 3 };
        let diagnostic = Diagnostic::error(&error, Path::new("plan.csv"));
        assert_eq!(diagnostic.code, "E004");
        assert_eq!(diagnostic.row, Some(3));
    }

    #[test]
    fn json_emitter_output() {
        let mut emitter = JsonEmitter::new(DiagnosticConfig::default());
        emitter.emit(make_warning());

        let value = emitter.to_json_value();
        assert_eq!(value[0]["code"], "W018");
        assert_eq!(value[0]["severity"], "warning");
        assert_eq!(value[0]["row"], 7);
        assert!(emitter.exit_code().is_success());
    }

    #[test]
    fn json_emitter_strict_and_quiet() {
        let mut strict = JsonEmitter::new(DiagnosticConfig::strict());
        strict.emit(make_warning());
        assert_eq!(strict.diagnostics()[0].severity, "error");
        assert_eq!(strict.exit_code(), ExitCode::Failure);

        let mut quiet = JsonEmitter::new(DiagnosticConfig::quiet());
        quiet.emit(make_warning());
        assert!(quiet.diagnostics().is_empty());
        assert_eq!(quiet.error_count(), 0);
    }
}
