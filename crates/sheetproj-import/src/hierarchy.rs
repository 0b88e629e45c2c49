//! Hierarchy reconstruction for task tables.
//!
//! Two strategies exist. When the table has an outline-number column the
//! hierarchy comes from the dotted numbers alone; otherwise it follows row
//! order and the indentation of the name cell.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::record::TaskRecord;
use crate::warning::{WarningCode, Warnings};

/// Creation order and containment of the records of one table
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arrangement {
    /// Record indices in the order tasks should be created
    pub order: Vec<usize>,
    /// Container record index per record, `None` for roots
    pub parents: Vec<Option<usize>>,
}

pub trait HierarchyStrategy {
    fn arrange(&self, records: &[TaskRecord], warnings: &mut Warnings) -> Arrangement;
}

/// Pick the strategy for a table; outline numbers take precedence
pub fn select_strategy(has_outline_column: bool) -> Box<dyn HierarchyStrategy> {
    if has_outline_column {
        Box::new(OutlineNumberStrategy)
    } else {
        Box::new(RowOrderStrategy)
    }
}

// ============================================================================
// Outline numbers
// ============================================================================

/// Hierarchy from dotted outline numbers such as `1.2.3`
#[derive(Clone, Copy, Debug, Default)]
pub struct OutlineNumberStrategy;

impl HierarchyStrategy for OutlineNumberStrategy {
    fn arrange(&self, records: &[TaskRecord], warnings: &mut Warnings) -> Arrangement {
        let mut numbered = Vec::new();
        let mut unnumbered = Vec::new();
        let mut segments_of: Vec<Option<Vec<u64>>> = vec![None; records.len()];

        for (index, record) in records.iter().enumerate() {
            let Some(outline) = record.outline_number.as_deref() else {
                unnumbered.push(index);
                continue;
            };
            match parse_outline_number(outline) {
                Some(segments) => {
                    segments_of[index] = Some(segments);
                    numbered.push(index);
                }
                None => {
                    warnings.at(
                        record.row,
                        WarningCode::InvalidOutlineNumber,
                        format!("'{}' is not an outline number, task placed at top level", outline),
                    );
                    unnumbered.push(index);
                }
            }
        }

        numbered.sort_by(|&a, &b| {
            compare_outline_numbers(
                records[a].outline_number.as_deref().unwrap_or_default(),
                records[b].outline_number.as_deref().unwrap_or_default(),
            )
        });

        let mut by_number: HashMap<&[u64], usize> = HashMap::new();
        for &index in &numbered {
            let Some(segments) = segments_of[index].as_deref() else {
                continue;
            };
            if let Some(&first) = by_number.get(segments) {
                warnings.at(
                    records[index].row,
                    WarningCode::DuplicateOutlineNumber,
                    format!(
                        "outline number {} already used by '{}'",
                        segments_text(segments),
                        records[first].name
                    ),
                );
            } else {
                by_number.insert(segments, index);
            }
        }

        let mut parents = vec![None; records.len()];
        for &index in &numbered {
            let Some(segments) = segments_of[index].as_deref() else {
                continue;
            };
            parents[index] = (1..segments.len())
                .rev()
                .find_map(|len| by_number.get(&segments[..len]).copied());
        }

        let mut order = numbered;
        order.extend(unnumbered);
        Arrangement { order, parents }
    }
}

/// Numeric segments of `1.2.10`; `None` if any segment is not a number
pub fn parse_outline_number(text: &str) -> Option<Vec<u64>> {
    let text = text.trim().trim_end_matches('.');
    if text.is_empty() {
        return None;
    }
    text.split('.').map(|s| s.trim().parse().ok()).collect()
}

fn segments_text(segments: &[u64]) -> String {
    segments
        .iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

/// Total order on outline numbers.
///
/// Segments compare numerically (`2 < 10`, `1.2 < 1.10`), a prefix sorts
/// before its extensions, and non-numeric segments sort after numeric ones.
/// Spellings that compare equal segment by segment (`1.2` and `1.02`) are
/// ordered by their text, so only identical strings compare equal.
pub fn compare_outline_numbers(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_segments(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_segments(x: &str, y: &str) -> Ordering {
    match (x.trim().parse::<u64>(), y.trim().parse::<u64>()) {
        (Ok(p), Ok(q)) => p.cmp(&q),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => x.cmp(y),
    }
}

// ============================================================================
// Row order
// ============================================================================

/// Hierarchy from row order and name indentation: a row belongs to the
/// nearest row above it with a smaller indentation.
#[derive(Clone, Copy, Debug, Default)]
pub struct RowOrderStrategy;

impl HierarchyStrategy for RowOrderStrategy {
    fn arrange(&self, records: &[TaskRecord], _warnings: &mut Warnings) -> Arrangement {
        let mut parents = vec![None; records.len()];
        let mut open: Vec<(usize, usize)> = Vec::new();

        for (index, record) in records.iter().enumerate() {
            while open
                .last()
                .is_some_and(|&(indent, _)| indent >= record.indent)
            {
                open.pop();
            }
            parents[index] = open.last().map(|&(_, parent)| parent);
            open.push((record.indent, index));
        }

        Arrangement {
            order: (0..records.len()).collect(),
            parents,
        }
    }
}
