//! Soft warnings collected while importing.
//!
//! A warning never aborts a load: the offending cell, row or table is
//! skipped or defaulted and the import carries on.

use serde::Serialize;
use std::fmt;

/// Stable classification of a soft warning
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum WarningCode {
    /// Table header did not match the pending record group
    UnrecognizedTable,
    /// Rows found after every record group was consumed
    TrailingRows,
    /// Two header cells map to the same field
    DuplicateColumn,
    /// Row without a name
    MissingName,
    UnparsableDate,
    /// End date earlier than begin date
    EndBeforeBegin,
    UnparsableDuration,
    UnparsableCompletion,
    /// Task without begin and end date
    MissingDates,
    DuplicateTaskId,
    InvalidOutlineNumber,
    DuplicateOutlineNumber,
    MalformedPredecessor,
    UnknownPredecessor,
    /// The model refused a dependency (self-loop or cycle)
    RejectedDependency,
    DuplicateResource,
    UnknownRole,
    UnknownResource,
    CustomValueTypeMismatch,
}

impl WarningCode {
    /// Short code used in reports, e.g. `W004`
    pub const fn as_str(self) -> &'static str {
        match self {
            WarningCode::UnrecognizedTable => "W001",
            WarningCode::TrailingRows => "W002",
            WarningCode::DuplicateColumn => "W003",
            WarningCode::MissingName => "W004",
            WarningCode::UnparsableDate => "W005",
            WarningCode::EndBeforeBegin => "W006",
            WarningCode::UnparsableDuration => "W007",
            WarningCode::UnparsableCompletion => "W008",
            WarningCode::MissingDates => "W009",
            WarningCode::DuplicateTaskId => "W010",
            WarningCode::InvalidOutlineNumber => "W011",
            WarningCode::DuplicateOutlineNumber => "W012",
            WarningCode::MalformedPredecessor => "W013",
            WarningCode::UnknownPredecessor => "W014",
            WarningCode::RejectedDependency => "W015",
            WarningCode::DuplicateResource => "W016",
            WarningCode::UnknownRole => "W017",
            WarningCode::UnknownResource => "W018",
            WarningCode::CustomValueTypeMismatch => "W019",
        }
    }
}

impl fmt::Display for WarningCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recoverable problem found during import
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImportWarning {
    pub code: WarningCode,
    /// 1-based source row, when the problem belongs to one
    pub row: Option<usize>,
    pub message: String,
}

impl fmt::Display for ImportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.row {
            Some(row) => write!(f, "[{}] row {}: {}", self.code, row, self.message),
            None => write!(f, "[{}] {}", self.code, self.message),
        }
    }
}

/// Ordered collection of warnings; every push is also logged
#[derive(Clone, Debug, Default)]
pub struct Warnings {
    items: Vec<ImportWarning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, code: WarningCode, row: Option<usize>, message: impl Into<String>) {
        let warning = ImportWarning {
            code,
            row,
            message: message.into(),
        };
        tracing::warn!(code = code.as_str(), row = ?row, "{}", warning.message);
        self.items.push(warning);
    }

    /// Shorthand for a warning tied to a row
    pub fn at(&mut self, row: usize, code: WarningCode, message: impl Into<String>) {
        self.push(code, Some(row), message);
    }

    pub fn extend(&mut self, other: Warnings) {
        self.items.extend(other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportWarning> {
        self.items.iter()
    }

    pub fn count(&self, code: WarningCode) -> usize {
        self.items.iter().filter(|w| w.code == code).count()
    }

    pub fn into_vec(self) -> Vec<ImportWarning> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_unique() {
        let all = [
            WarningCode::UnrecognizedTable,
            WarningCode::TrailingRows,
            WarningCode::DuplicateColumn,
            WarningCode::MissingName,
            WarningCode::UnparsableDate,
            WarningCode::EndBeforeBegin,
            WarningCode::UnparsableDuration,
            WarningCode::UnparsableCompletion,
            WarningCode::MissingDates,
            WarningCode::DuplicateTaskId,
            WarningCode::InvalidOutlineNumber,
            WarningCode::DuplicateOutlineNumber,
            WarningCode::MalformedPredecessor,
            WarningCode::UnknownPredecessor,
            WarningCode::RejectedDependency,
            WarningCode::DuplicateResource,
            WarningCode::UnknownRole,
            WarningCode::UnknownResource,
            WarningCode::CustomValueTypeMismatch,
        ];
        let codes: std::collections::HashSet<_> = all.iter().map(|c| c.as_str()).collect();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn display_includes_row() {
        let mut warnings = Warnings::new();
        warnings.at(7, WarningCode::MissingName, "row has no name");
        warnings.push(WarningCode::TrailingRows, None, "2 rows ignored");

        let rendered: Vec<String> = warnings.iter().map(ToString::to_string).collect();
        assert_eq!(rendered[0], "[W004] row 7: row has no name");
        assert_eq!(rendered[1], "[W002] 2 rows ignored");
        assert_eq!(warnings.count(WarningCode::MissingName), 1);
    }
}
