//! Predecessor expressions.
//!
//! A predecessor cell lists terms separated by `;` or `,`:
//!
//! ```text
//! term = ID [ "-" TYPE [ "=" LAG ] ]
//! TYPE = FS | SS | FF | SF
//! LAG  = "P" [ "-" ] n ( "D" | "W" )
//! ```
//!
//! `4`, `4-SS` and `4-FS=P-2D` are all valid. Specs are resolved once the
//! whole input has been read, since a predecessor may appear further down.

use std::collections::HashMap;

use sheetproj_core::{DependencyType, Duration, TaskManager, TaskRef, TimeUnit, TimeUnitStack};
use thiserror::Error;

use crate::warning::{WarningCode, Warnings};

/// One parsed predecessor term
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PredecessorTerm {
    pub dependee_id: String,
    pub kind: DependencyType,
    pub lag: Duration,
}

/// A dependency waiting for its dependee to be resolved
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DependencySpec {
    pub dependant: TaskRef,
    pub dependee_id: String,
    pub kind: DependencyType,
    pub lag: Duration,
    /// Source row of the dependant
    pub row: usize,
}

/// Why a predecessor term was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PredecessorError {
    #[error("empty task ID")]
    EmptyId,

    #[error("unknown dependency type '{0}'")]
    UnknownType(String),

    #[error("malformed lag '{0}'")]
    MalformedLag(String),
}

/// Parse a single term such as `4-FS=P1D`
pub fn parse_term(
    term: &str,
    time_units: &dyn TimeUnitStack,
) -> Result<PredecessorTerm, PredecessorError> {
    let term = term.trim();
    let (id, suffix) = match term
        .match_indices('-')
        .find(|&(at, _)| starts_with_type(&term[at + 1..]))
    {
        Some((at, _)) => (term[..at].trim(), Some(term[at + 1..].trim())),
        None => (term, None),
    };
    if id.is_empty() {
        return Err(PredecessorError::EmptyId);
    }

    let mut kind = DependencyType::default();
    let mut lag = Duration::zero();
    if let Some(suffix) = suffix {
        let (code, lag_text) = match suffix.split_once('=') {
            Some((code, lag_text)) => (code.trim(), Some(lag_text.trim())),
            None => (suffix, None),
        };
        kind = DependencyType::from_code(code)
            .ok_or_else(|| PredecessorError::UnknownType(code.to_string()))?;
        if let Some(lag_text) = lag_text {
            lag = parse_lag(lag_text, time_units)?;
        }
    }

    Ok(PredecessorTerm {
        dependee_id: id.to_string(),
        kind,
        lag,
    })
}

/// Does `rest` begin with a dependency type code followed by `=` or nothing?
fn starts_with_type(rest: &str) -> bool {
    let rest = rest.trim_start();
    let Some(code) = rest.get(..2) else {
        return false;
    };
    DependencyType::from_code(code).is_some() && {
        let tail = rest[2..].trim_start();
        tail.is_empty() || tail.starts_with('=')
    }
}

/// `P1D`, `P-1D`, `P2W`
fn parse_lag(text: &str, time_units: &dyn TimeUnitStack) -> Result<Duration, PredecessorError> {
    let malformed = || PredecessorError::MalformedLag(text.to_string());
    let body = text
        .strip_prefix('P')
        .or_else(|| text.strip_prefix('p'))
        .ok_or_else(malformed)?;
    let unit_char = body.chars().last().ok_or_else(malformed)?;
    let unit = match unit_char.to_ascii_uppercase() {
        'D' => TimeUnit::Day,
        'W' => TimeUnit::Week,
        _ => return Err(malformed()),
    };
    let amount: i64 = body[..body.len() - unit_char.len_utf8()]
        .parse()
        .map_err(|_| malformed())?;
    Ok(time_units.duration_of(amount as f64, unit))
}

/// Render a term back into the cell grammar
pub fn format_term(id: &str, kind: DependencyType, lag: Duration) -> String {
    if kind == DependencyType::FinishToStart && lag.is_zero() {
        return id.to_string();
    }
    if lag.is_zero() {
        return format!("{}-{}", id, kind.code());
    }
    format!("{}-{}=P{}D", id, kind.code(), lag.whole_days())
}

/// Parse a whole predecessor cell of the task `dependant`.
///
/// Malformed terms are dropped with a warning.
pub fn parse_predecessors(
    cell: &str,
    separators: &[char],
    dependant: TaskRef,
    row: usize,
    time_units: &dyn TimeUnitStack,
    warnings: &mut Warnings,
) -> Vec<DependencySpec> {
    cell.split(|c| separators.contains(&c))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|term| match parse_term(term, time_units) {
            Ok(parsed) => Some(DependencySpec {
                dependant,
                dependee_id: parsed.dependee_id,
                kind: parsed.kind,
                lag: parsed.lag,
                row,
            }),
            Err(e) => {
                warnings.at(
                    row,
                    WarningCode::MalformedPredecessor,
                    format!("predecessor '{}' ignored: {}", term, e),
                );
                None
            }
        })
        .collect()
}

/// Create the dependencies whose dependee ID is known.
///
/// Returns the number of dependencies created.
pub fn resolve(
    specs: Vec<DependencySpec>,
    ids: &HashMap<String, TaskRef>,
    tasks: &mut TaskManager,
    warnings: &mut Warnings,
) -> usize {
    let mut created = 0;
    for spec in specs {
        let Some(&dependee) = ids.get(&spec.dependee_id) else {
            warnings.at(
                spec.row,
                WarningCode::UnknownPredecessor,
                format!("no task with ID '{}'", spec.dependee_id),
            );
            continue;
        };
        match tasks.create_dependency(spec.dependant, dependee, spec.kind, spec.lag) {
            Ok(()) => created += 1,
            Err(e) => warnings.at(spec.row, WarningCode::RejectedDependency, e.to_string()),
        }
    }
    created
}
