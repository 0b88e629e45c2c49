//! Typed records built from data rows.

use chrono::NaiveDate;
use sheetproj_core::{Duration, TimeUnitStack};

use crate::header::{ColumnMapping, ResourceField, TaskField};
use crate::source::Row;
use crate::warning::{WarningCode, Warnings};
use crate::ImportConfig;

/// One task row, typed
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskRecord {
    pub row: usize,
    pub id: Option<String>,
    pub name: String,
    /// Indentation of the name cell
    pub indent: usize,
    pub begin: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Explicit duration
    pub duration: Option<Duration>,
    pub completion: u8,
    pub outline_number: Option<String>,
    pub predecessors: Option<String>,
    pub resources: Vec<String>,
    pub web_link: Option<String>,
    pub notes: Option<String>,
    /// Non-empty custom cells as (column index, literal)
    pub custom: Vec<(usize, String)>,
}

/// One resource row, typed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResourceRecord {
    pub row: usize,
    pub name: String,
    pub id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
    pub custom: Vec<(usize, String)>,
}

/// Reconciled start, duration and milestone flag of a task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Schedule {
    pub start: NaiveDate,
    pub duration: Duration,
    pub milestone: bool,
}

/// Converts data rows into records
pub struct RecordBuilder<'a> {
    config: &'a ImportConfig,
    time_units: &'a dyn TimeUnitStack,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(config: &'a ImportConfig, time_units: &'a dyn TimeUnitStack) -> Self {
        Self { config, time_units }
    }

    /// Build a task record; rows without a name yield `None`
    pub fn task(
        &self,
        row: &Row,
        mapping: &ColumnMapping<TaskField>,
        warnings: &mut Warnings,
    ) -> Option<TaskRecord> {
        let Some(name) = mapping.value(row, TaskField::Name) else {
            warnings.at(row.number, WarningCode::MissingName, "task row has no name, skipped");
            return None;
        };
        let text = |field| mapping.value(row, field).map(str::to_string);

        Some(TaskRecord {
            row: row.number,
            id: text(TaskField::Id),
            name: name.to_string(),
            indent: mapping
                .index_of(TaskField::Name)
                .map_or(0, |i| row.indent(i)),
            begin: self.date(row, mapping, TaskField::BeginDate, warnings),
            end: self.date(row, mapping, TaskField::EndDate, warnings),
            duration: self.duration(row, mapping, warnings),
            completion: self.completion(row, mapping, warnings),
            outline_number: text(TaskField::OutlineNumber),
            predecessors: text(TaskField::Predecessors),
            resources: mapping
                .value(row, TaskField::Resources)
                .map(|cell| {
                    self.config
                        .split_list(cell)
                        .into_iter()
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            web_link: text(TaskField::WebLink),
            notes: text(TaskField::Notes),
            custom: custom_cells(row, mapping.custom_columns().map(|(i, _)| i)),
        })
    }

    /// Build a resource record; rows without a name yield `None`
    pub fn resource(
        &self,
        row: &Row,
        mapping: &ColumnMapping<ResourceField>,
        warnings: &mut Warnings,
    ) -> Option<ResourceRecord> {
        let Some(name) = mapping.value(row, ResourceField::Name) else {
            warnings.at(
                row.number,
                WarningCode::MissingName,
                "resource row has no name, skipped",
            );
            return None;
        };
        let text = |field| mapping.value(row, field).map(str::to_string);

        Some(ResourceRecord {
            row: row.number,
            name: name.to_string(),
            id: text(ResourceField::Id),
            email: text(ResourceField::Email),
            phone: text(ResourceField::Phone),
            role: text(ResourceField::Role),
            custom: custom_cells(row, mapping.custom_columns().map(|(i, _)| i)),
        })
    }

    fn date(
        &self,
        row: &Row,
        mapping: &ColumnMapping<TaskField>,
        field: TaskField,
        warnings: &mut Warnings,
    ) -> Option<NaiveDate> {
        let cell = mapping.value(row, field)?;
        match parse_date(cell, &self.config.short_date_format) {
            Some(date) => Some(date),
            None => {
                warnings.at(
                    row.number,
                    WarningCode::UnparsableDate,
                    format!("'{}' is not a date in format {}", cell, self.config.short_date_format),
                );
                None
            }
        }
    }

    fn duration(
        &self,
        row: &Row,
        mapping: &ColumnMapping<TaskField>,
        warnings: &mut Warnings,
    ) -> Option<Duration> {
        let cell = mapping.value(row, TaskField::Duration)?;
        match parse_duration_units(cell) {
            Some(units) => Some(
                self.time_units
                    .duration_of(units, self.time_units.default_unit()),
            ),
            None => {
                warnings.at(
                    row.number,
                    WarningCode::UnparsableDuration,
                    format!("'{}' is not a duration", cell),
                );
                None
            }
        }
    }

    fn completion(
        &self,
        row: &Row,
        mapping: &ColumnMapping<TaskField>,
        warnings: &mut Warnings,
    ) -> u8 {
        let Some(cell) = mapping.value(row, TaskField::Completion) else {
            return 0;
        };
        parse_completion(cell).unwrap_or_else(|| {
            warnings.at(
                row.number,
                WarningCode::UnparsableCompletion,
                format!("'{}' is not a percentage, using 0", cell),
            );
            0
        })
    }
}

fn custom_cells(row: &Row, columns: impl Iterator<Item = usize>) -> Vec<(usize, String)> {
    columns
        .filter_map(|i| row.value(i).map(|v| (i, v.to_string())))
        .collect()
}

impl TaskRecord {
    /// Reconcile dates and duration.
    ///
    /// An explicit duration wins; otherwise both dates give an inclusive
    /// span; otherwise the task lasts one default unit. A missing begin is
    /// derived from the end. Without any date the task starts at
    /// `project_start`.
    pub fn schedule(
        &self,
        time_units: &dyn TimeUnitStack,
        project_start: NaiveDate,
        warnings: &mut Warnings,
    ) -> Schedule {
        let mut end = self.end;
        if let (Some(begin), Some(e)) = (self.begin, end) {
            if e < begin {
                warnings.at(
                    self.row,
                    WarningCode::EndBeforeBegin,
                    format!("end date {} is before begin date {}, end ignored", e, begin),
                );
                end = None;
            }
        }

        let milestone = match self.duration {
            Some(explicit) => explicit.is_zero(),
            None => matches!((self.begin, end), (Some(b), Some(e)) if b == e),
        };
        let one_unit = time_units.duration_of(1.0, time_units.default_unit());
        let duration = if milestone {
            Duration::zero()
        } else if let Some(explicit) = self.duration {
            explicit
        } else if let (Some(begin), Some(e)) = (self.begin, end) {
            time_units.span(begin, e)
        } else {
            one_unit
        };

        let start = match (self.begin, end) {
            (Some(begin), _) => begin,
            (None, Some(e)) if milestone => e,
            (None, Some(e)) => match time_units.shift(e, time_units.span(e, e) - duration) {
                Some(begin) => begin,
                None => {
                    warnings.at(
                        self.row,
                        WarningCode::UnparsableDuration,
                        format!("begin date of '{}' is out of range, starting at end date", self.name),
                    );
                    e
                }
            },
            (None, None) => {
                warnings.at(
                    self.row,
                    WarningCode::MissingDates,
                    format!("task '{}' has no dates, starting at project start", self.name),
                );
                project_start
            }
        };

        Schedule {
            start,
            duration,
            milestone,
        }
    }
}

// ============================================================================
// Cell parsers
// ============================================================================

pub fn parse_date(cell: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(cell.trim(), format).ok()
}

/// Longest duration accepted from a cell, in default units
pub const MAX_DURATION_UNITS: f64 = 100_000.0;

/// Number of default time units: `4`, `2.5`, `4d`, `4 days`.
/// Negative values and values above [`MAX_DURATION_UNITS`] are rejected.
pub fn parse_duration_units(cell: &str) -> Option<f64> {
    let lower = cell.trim().to_lowercase();
    let number = ["days", "day", "d"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(&lower)
        .trim();
    number
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && (0.0..=MAX_DURATION_UNITS).contains(n))
}

/// Percentage with optional `%`, clamped to 0..=100
pub fn parse_completion(cell: &str) -> Option<u8> {
    let number = cell.trim().trim_end_matches('%').trim();
    let value = number.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(value.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{recognize, SynonymTable};
    use pretty_assertions::assert_eq;
    use sheetproj_core::DayTimeUnitStack;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task_record(header: &[&str], cells: &[&str], warnings: &mut Warnings) -> Option<TaskRecord> {
        let config = ImportConfig::default();
        let time_units = DayTimeUnitStack;
        let builder = RecordBuilder::new(&config, &time_units);
        let mapping = recognize(
            &Row::from_raw(1, header.iter().copied()),
            &SynonymTable::new(),
            warnings,
        )
        .unwrap();
        builder.task(&Row::from_raw(2, cells.iter().copied()), &mapping, warnings)
    }

    fn schedule_of(begin: Option<NaiveDate>, end: Option<NaiveDate>, days: Option<i64>) -> (Schedule, Warnings) {
        let record = TaskRecord {
            row: 2,
            name: "t".into(),
            begin,
            end,
            duration: days.map(Duration::days),
            ..TaskRecord::default()
        };
        let mut warnings = Warnings::new();
        let schedule = record.schedule(&DayTimeUnitStack, date(2012, 7, 1), &mut warnings);
        (schedule, warnings)
    }

    #[test]
    fn builds_task_record() {
        let mut warnings = Warnings::new();
        let record = task_record(
            &["Name", "Begin date", "End date", "Resources", "Completion", "Field1"],
            &["  t1", "23/07/12", "26/07/12", "Joe; John", "50%", "value1"],
            &mut warnings,
        )
        .unwrap();

        assert_eq!(record.name, "t1");
        assert_eq!(record.indent, 2);
        assert_eq!(record.begin, Some(date(2012, 7, 23)));
        assert_eq!(record.end, Some(date(2012, 7, 26)));
        assert_eq!(record.resources, vec!["Joe", "John"]);
        assert_eq!(record.completion, 50);
        assert_eq!(record.custom, vec![(5, "value1".to_string())]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn bad_cells_warn_and_default() {
        let mut warnings = Warnings::new();
        let record = task_record(
            &["Name", "Begin date", "Duration", "Completion"],
            &["t1", "2012-07-23", "soon", "most"],
            &mut warnings,
        )
        .unwrap();

        assert_eq!(record.begin, None);
        assert_eq!(record.duration, None);
        assert_eq!(record.completion, 0);
        assert_eq!(warnings.count(WarningCode::UnparsableDate), 1);
        assert_eq!(warnings.count(WarningCode::UnparsableDuration), 1);
        assert_eq!(warnings.count(WarningCode::UnparsableCompletion), 1);
    }

    #[test]
    fn row_without_name_is_skipped() {
        let mut warnings = Warnings::new();
        assert!(task_record(&["Name", "ID"], &["", "3"], &mut warnings).is_none());
        assert_eq!(warnings.count(WarningCode::MissingName), 1);
    }

    #[test]
    fn span_of_both_dates() {
        let (schedule, warnings) = schedule_of(Some(date(2012, 7, 23)), Some(date(2012, 7, 26)), None);
        assert_eq!(schedule.duration, Duration::days(4));
        assert_eq!(schedule.start, date(2012, 7, 23));
        assert!(!schedule.milestone);
        assert!(warnings.is_empty());
    }

    #[test]
    fn explicit_duration_wins() {
        let (schedule, _) = schedule_of(Some(date(2012, 7, 23)), Some(date(2012, 7, 24)), Some(1));
        assert_eq!(schedule.duration, Duration::days(1));
        assert!(!schedule.milestone);
    }

    #[test]
    fn milestones() {
        let (zero, _) = schedule_of(Some(date(2012, 7, 26)), Some(date(2012, 7, 26)), Some(0));
        assert!(zero.milestone);
        assert_eq!(zero.duration, Duration::zero());

        let (same_day, _) = schedule_of(Some(date(2012, 7, 26)), Some(date(2012, 7, 26)), None);
        assert!(same_day.milestone);

        let (explicit_one, _) = schedule_of(Some(date(2012, 7, 26)), Some(date(2012, 7, 26)), Some(1));
        assert!(!explicit_one.milestone);
    }

    #[test]
    fn begin_derived_from_end() {
        let (schedule, _) = schedule_of(None, Some(date(2012, 7, 26)), Some(3));
        assert_eq!(schedule.start, date(2012, 7, 24));
        assert_eq!(schedule.duration, Duration::days(3));
    }

    #[test]
    fn begin_out_of_range_falls_back_to_end() {
        let record = TaskRecord {
            row: 2,
            name: "t".into(),
            end: Some(date(2012, 7, 26)),
            duration: Some(Duration::minutes(i64::MAX / 2)),
            ..TaskRecord::default()
        };
        let mut warnings = Warnings::new();
        let schedule = record.schedule(&DayTimeUnitStack, date(2012, 7, 1), &mut warnings);
        assert_eq!(schedule.start, date(2012, 7, 26));
        assert_eq!(warnings.count(WarningCode::UnparsableDuration), 1);
    }

    #[test]
    fn no_dates_start_at_project_start() {
        let (schedule, warnings) = schedule_of(None, None, None);
        assert_eq!(schedule.start, date(2012, 7, 1));
        assert_eq!(schedule.duration, Duration::days(1));
        assert_eq!(warnings.count(WarningCode::MissingDates), 1);
    }

    #[test]
    fn end_before_begin_is_ignored() {
        let (schedule, warnings) = schedule_of(Some(date(2012, 7, 26)), Some(date(2012, 7, 23)), None);
        assert_eq!(schedule.start, date(2012, 7, 26));
        assert_eq!(schedule.duration, Duration::days(1));
        assert_eq!(warnings.count(WarningCode::EndBeforeBegin), 1);
    }

    #[test]
    fn cell_parsers() {
        assert_eq!(parse_duration_units("4"), Some(4.0));
        assert_eq!(parse_duration_units("2.5"), Some(2.5));
        assert_eq!(parse_duration_units("3d"), Some(3.0));
        assert_eq!(parse_duration_units("3 Days"), Some(3.0));
        assert_eq!(parse_duration_units("-1"), None);
        assert_eq!(parse_duration_units("100000"), Some(MAX_DURATION_UNITS));
        assert_eq!(parse_duration_units("100000000"), None);
        assert_eq!(parse_duration_units("1e300"), None);
        assert_eq!(parse_duration_units("x"), None);

        assert_eq!(parse_completion("50"), Some(50));
        assert_eq!(parse_completion("75 %"), Some(75));
        assert_eq!(parse_completion("150"), Some(100));
        assert_eq!(parse_completion("-5"), Some(0));
        assert_eq!(parse_completion("half"), None);

        assert_eq!(parse_date("23/07/12", "%d/%m/%y"), Some(date(2012, 7, 23)));
        assert_eq!(parse_date("2012-07-23", "%Y-%m-%d"), Some(date(2012, 7, 23)));
        assert_eq!(parse_date("23.07.12", "%d/%m/%y"), None);
    }
}
