//! The load pipeline.
//!
//! Rows are split into tables at blank rows. Tables are matched against the
//! record groups in order (tasks, then resources); cross-table references
//! are resolved once everything has been read.

use std::collections::HashMap;
use std::io::Read;

use sheetproj_core::{Project, TaskRef, TimeUnitStack};
use tracing::{debug, info, warn};

use crate::custom::{self, CustomColumn};
use crate::dependency::{self, DependencySpec};
use crate::header::{self, ResourceField, SynonymTable, TaskField};
use crate::hierarchy;
use crate::record::{RecordBuilder, TaskRecord};
use crate::resources::{self, PendingAssignment, ResourceBinder};
use crate::source::{self, Row};
use crate::warning::{WarningCode, Warnings};
use crate::{ImportConfig, ImportError, ImportReport, SpreadsheetFormat};

/// Loads one tabular source into a project.
///
/// The time-unit authority decides how bare durations and date spans are
/// measured.
pub struct SpreadsheetImporter<'a, R> {
    source: R,
    project: &'a mut Project,
    time_units: &'a dyn TimeUnitStack,
    format: SpreadsheetFormat,
    config: ImportConfig,
}

impl<'a, R: Read> SpreadsheetImporter<'a, R> {
    pub fn new(
        source: R,
        project: &'a mut Project,
        time_units: &'a dyn TimeUnitStack,
        format: SpreadsheetFormat,
    ) -> Self {
        Self {
            source,
            project,
            time_units,
            format,
            config: ImportConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ImportConfig) -> Self {
        self.config = config;
        self
    }

    /// Consume the source and commit everything it describes.
    ///
    /// Row-level problems become warnings in the report. The load fails
    /// only when the source cannot be read, is empty, or holds no
    /// recognizable table at all.
    pub fn load(self) -> Result<ImportReport, ImportError> {
        let Self {
            source,
            project,
            time_units,
            format,
            config,
        } = self;
        config.validate()?;

        let rows = source::read_rows(format, source, &config)?;
        let tables = split_tables(rows);
        let Some(first_row) = tables.first().map(|t| t[0].number) else {
            return Err(ImportError::EmptyInput);
        };
        debug!(?format, tables = tables.len(), "read input");

        let mut session = Session::new(project, time_units, &config);
        let mut pending = [RecordGroup::Tasks, RecordGroup::Resources]
            .into_iter()
            .peekable();

        for table in &tables {
            let header_row = table[0].number;
            let Some(&group) = pending.peek() else {
                session.warnings.at(
                    header_row,
                    WarningCode::TrailingRows,
                    format!("{} rows after the last table ignored", table.len()),
                );
                session.report.rows_skipped += table.len();
                continue;
            };
            let accepted = match group {
                RecordGroup::Tasks => session.task_table(table),
                RecordGroup::Resources => session.resource_table(table),
            };
            if accepted {
                pending.next();
                session.report.tables += 1;
            } else {
                session.warnings.at(
                    header_row,
                    WarningCode::UnrecognizedTable,
                    format!(
                        "not a {} table header, {} rows skipped",
                        group.label(),
                        table.len()
                    ),
                );
                session.report.rows_skipped += table.len();
            }
        }

        if session.report.tables == 0 {
            return Err(ImportError::UnrecognizedTable { row: first_row });
        }
        Ok(session.finish())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RecordGroup {
    Tasks,
    Resources,
}

impl RecordGroup {
    fn label(self) -> &'static str {
        match self {
            RecordGroup::Tasks => "task",
            RecordGroup::Resources => "resource",
        }
    }
}

/// Runs of non-blank rows
fn split_tables(rows: Vec<Row>) -> Vec<Vec<Row>> {
    let mut tables = Vec::new();
    let mut current = Vec::new();
    for row in rows {
        if row.is_blank() {
            if !current.is_empty() {
                tables.push(std::mem::take(&mut current));
            }
        } else {
            current.push(row);
        }
    }
    if !current.is_empty() {
        tables.push(current);
    }
    tables
}

/// State of one load call
struct Session<'p> {
    project: &'p mut Project,
    time_units: &'p dyn TimeUnitStack,
    config: &'p ImportConfig,
    task_synonyms: SynonymTable<TaskField>,
    resource_synonyms: SynonymTable<ResourceField>,
    warnings: Warnings,
    report: ImportReport,
    /// Task ID → task, later rows win
    ids: HashMap<String, TaskRef>,
    dependencies: Vec<DependencySpec>,
    assignments: Vec<PendingAssignment>,
    binder: ResourceBinder,
}

impl<'p> Session<'p> {
    fn new(
        project: &'p mut Project,
        time_units: &'p dyn TimeUnitStack,
        config: &'p ImportConfig,
    ) -> Self {
        Self {
            project,
            time_units,
            config,
            task_synonyms: SynonymTable::new(),
            resource_synonyms: SynonymTable::new(),
            warnings: Warnings::new(),
            report: ImportReport::default(),
            ids: HashMap::new(),
            dependencies: Vec::new(),
            assignments: Vec::new(),
            binder: ResourceBinder::new(),
        }
    }

    /// Import a task table; false if its header is not a task header
    fn task_table(&mut self, table: &[Row]) -> bool {
        let Some(mapping) = header::recognize(&table[0], &self.task_synonyms, &mut self.warnings)
        else {
            return false;
        };
        let data = &table[1..];
        debug!(row = table[0].number, rows = data.len(), "task table");

        let columns = custom::register_columns(
            mapping.custom_columns(),
            data,
            self.project.tasks.custom_properties_mut(),
            &self.config.short_date_format,
        );
        let builder = RecordBuilder::new(self.config, self.time_units);
        let records: Vec<TaskRecord> = data
            .iter()
            .filter_map(|row| builder.task(row, &mapping, &mut self.warnings))
            .collect();
        self.report.rows_skipped += data.len() - records.len();

        let strategy = hierarchy::select_strategy(mapping.has(TaskField::OutlineNumber));
        let arrangement = strategy.arrange(&records, &mut self.warnings);

        let mut refs: Vec<Option<TaskRef>> = vec![None; records.len()];
        for &index in &arrangement.order {
            refs[index] = Some(self.commit_task(&records[index], &columns));
        }

        for (index, parent) in arrangement.parents.iter().enumerate() {
            let (Some(child), Some(container)) = (refs[index], parent.and_then(|p| refs[p])) else {
                continue;
            };
            if let Err(e) = self.project.tasks.set_container(child, Some(container)) {
                warn!(row = records[index].row, "{}", e);
            }
        }

        for (record, task) in records.iter().zip(&refs) {
            let Some(task) = *task else {
                continue;
            };
            self.bind_id(record, task);
            if let Some(cell) = &record.predecessors {
                self.dependencies.extend(dependency::parse_predecessors(
                    cell,
                    &self.config.list_separators,
                    task,
                    record.row,
                    self.time_units,
                    &mut self.warnings,
                ));
            }
            if !record.resources.is_empty() {
                self.assignments.push(PendingAssignment {
                    task,
                    row: record.row,
                    names: record.resources.clone(),
                });
            }
        }
        true
    }

    fn commit_task(&mut self, record: &TaskRecord, columns: &[CustomColumn]) -> TaskRef {
        let schedule = record.schedule(self.time_units, self.project.start, &mut self.warnings);
        let task_ref = self.project.tasks.create_task(record.name.as_str());
        self.report.tasks_created += 1;

        if let Some(task) = self.project.tasks.task_mut(task_ref) {
            task.start = schedule.start;
            task.duration = schedule.duration;
            task.milestone = schedule.milestone;
            task.completion = record.completion.min(100);
            task.id.clone_from(&record.id);
            task.web_link.clone_from(&record.web_link);
            task.notes.clone_from(&record.notes);
            custom::store_values(
                &mut task.custom_values,
                columns,
                &record.custom,
                record.row,
                &self.config.short_date_format,
                &mut self.warnings,
            );
        }
        task_ref
    }

    /// Later rows take over an ID already in use
    fn bind_id(&mut self, record: &TaskRecord, task: TaskRef) {
        let Some(id) = &record.id else {
            return;
        };
        if let Some(previous) = self.ids.insert(id.clone(), task) {
            let previous_name = self
                .project
                .tasks
                .task(previous)
                .map(|t| t.name.clone())
                .unwrap_or_default();
            self.warnings.at(
                record.row,
                WarningCode::DuplicateTaskId,
                format!(
                    "ID '{}' already used by '{}', now refers to '{}'",
                    id, previous_name, record.name
                ),
            );
        }
    }

    /// Import a resource table; false if its header is not a resource header
    fn resource_table(&mut self, table: &[Row]) -> bool {
        let Some(mapping) =
            header::recognize(&table[0], &self.resource_synonyms, &mut self.warnings)
        else {
            return false;
        };
        let data = &table[1..];
        debug!(row = table[0].number, rows = data.len(), "resource table");

        let columns = custom::register_columns(
            mapping.custom_columns(),
            data,
            self.project.resources.custom_properties_mut(),
            &self.config.short_date_format,
        );
        let builder = RecordBuilder::new(self.config, self.time_units);
        for row in data {
            let Some(record) = builder.resource(row, &mapping, &mut self.warnings) else {
                self.report.rows_skipped += 1;
                continue;
            };
            let resource_ref = self.binder.commit(&record, self.project, &mut self.warnings);
            if let Some(resource) = self.project.resources.resource_mut(resource_ref) {
                custom::store_values(
                    &mut resource.custom_values,
                    &columns,
                    &record.custom,
                    record.row,
                    &self.config.short_date_format,
                    &mut self.warnings,
                );
            }
        }
        true
    }

    /// Resolve cross-table references and build the report
    fn finish(mut self) -> ImportReport {
        let specs = std::mem::take(&mut self.dependencies);
        self.report.dependencies_created =
            dependency::resolve(specs, &self.ids, &mut self.project.tasks, &mut self.warnings);

        let pending = std::mem::take(&mut self.assignments);
        self.report.assignments_created = resources::assign(pending, self.project, &mut self.warnings);
        self.report.resources_created = self.binder.created();

        let mut report = self.report;
        report.warnings = self.warnings.into_vec();
        info!(
            tasks = report.tasks_created,
            resources = report.resources_created,
            dependencies = report.dependencies_created,
            assignments = report.assignments_created,
            warnings = report.warnings.len(),
            "import finished"
        );
        report
    }
}
