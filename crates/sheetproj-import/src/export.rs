//! Export a project as a task table followed by a resource table.
//!
//! The layout is the one the importer reads, so an exported project loads
//! back into the same tasks, hierarchy, dependencies and assignments.

use std::collections::{HashMap, HashSet};

use sheetproj_core::{CustomPropertyDefinition, CustomValues, Project, TaskRef, TimeUnitStack};

use crate::dependency::{format_term, parse_term};
use crate::header::{ResourceField, SemanticField, TaskField};
use crate::writer::SpreadsheetWriter;
use crate::{ExportError, ImportConfig};

const TASK_COLUMNS: [TaskField; 11] = [
    TaskField::Id,
    TaskField::Name,
    TaskField::BeginDate,
    TaskField::EndDate,
    TaskField::Duration,
    TaskField::Completion,
    TaskField::OutlineNumber,
    TaskField::WebLink,
    TaskField::Notes,
    TaskField::Predecessors,
    TaskField::Resources,
];

const RESOURCE_COLUMNS: [ResourceField; 5] = [
    ResourceField::Id,
    ResourceField::Name,
    ResourceField::Email,
    ResourceField::Phone,
    ResourceField::Role,
];

/// Write `project` into `writer`
pub fn export_project<W: SpreadsheetWriter>(
    project: &Project,
    time_units: &dyn TimeUnitStack,
    writer: &mut W,
    config: &ImportConfig,
) -> Result<(), ExportError> {
    write_tasks(project, time_units, writer, config)?;
    if !project.resources.is_empty() {
        writer.println()?;
        write_resources(project, writer)?;
    }
    tracing::info!(
        tasks = project.tasks.len(),
        resources = project.resources.len(),
        "exported project"
    );
    Ok(())
}

/// Tasks depth-first with their outline numbers
pub fn outline(project: &Project) -> Vec<(TaskRef, String)> {
    fn visit(project: &Project, tasks: Vec<TaskRef>, prefix: &str, out: &mut Vec<(TaskRef, String)>) {
        for (position, task) in tasks.into_iter().enumerate() {
            let number = if prefix.is_empty() {
                (position + 1).to_string()
            } else {
                format!("{}.{}", prefix, position + 1)
            };
            out.push((task, number.clone()));
            visit(project, project.tasks.nested_tasks(task), &number, out);
        }
    }

    let mut out = Vec::with_capacity(project.tasks.len());
    visit(project, project.tasks.root_tasks(), "", &mut out);
    out
}

/// IDs written for tasks. An imported ID is kept when no other task shares
/// it and it reads back whole from a predecessor cell; other tasks get their
/// 1-based position, or the next number not taken.
fn export_ids(
    project: &Project,
    time_units: &dyn TimeUnitStack,
    config: &ImportConfig,
) -> HashMap<TaskRef, String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (_, task) in project.tasks.tasks() {
        if let Some(id) = &task.id {
            *counts.entry(id.as_str()).or_default() += 1;
        }
    }
    let keeps = |id: &str| {
        counts.get(id) == Some(&1)
            && config.split_list(id) == [id]
            && parse_term(id, time_units).is_ok_and(|term| term.dependee_id == id)
    };

    let mut ids = HashMap::with_capacity(project.tasks.len());
    let mut taken: HashSet<String> = HashSet::new();
    for (task_ref, task) in project.tasks.tasks() {
        if let Some(id) = task.id.as_deref().filter(|&id| keeps(id)) {
            taken.insert(id.to_string());
            ids.insert(task_ref, id.to_string());
        }
    }
    let mut next = 0;
    for (task_ref, _) in project.tasks.tasks() {
        if ids.contains_key(&task_ref) {
            continue;
        }
        let mut id = (task_ref.index() + 1).to_string();
        while taken.contains(&id) {
            next += 1;
            id = (project.tasks.len() + next).to_string();
        }
        taken.insert(id.clone());
        ids.insert(task_ref, id);
    }
    ids
}

fn write_tasks<W: SpreadsheetWriter>(
    project: &Project,
    time_units: &dyn TimeUnitStack,
    writer: &mut W,
    config: &ImportConfig,
) -> Result<(), ExportError> {
    let definitions = project.tasks.custom_properties().definitions();
    for field in TASK_COLUMNS {
        writer.print(field.label())?;
    }
    for definition in definitions {
        writer.print(&definition.name)?;
    }
    writer.println()?;

    let separator = config.primary_separator().to_string();
    let unit = time_units.default_unit();
    let ids = export_ids(project, time_units, config);
    let task_id = |task: TaskRef| ids.get(&task).cloned().unwrap_or_default();
    for (task_ref, number) in outline(project) {
        let Some(task) = project.tasks.task(task_ref) else {
            continue;
        };
        let predecessors: Vec<String> = project
            .tasks
            .dependencies_as_dependant(task_ref)
            .map(|d| format_term(&task_id(d.dependee), d.kind, d.lag))
            .collect();
        let resources: Vec<&str> = project
            .resources
            .assignments_of(task_ref)
            .into_iter()
            .filter_map(|r| project.resources.resource(r))
            .map(|r| r.name.as_str())
            .collect();

        for field in TASK_COLUMNS {
            let cell = match field {
                TaskField::Id => task_id(task_ref),
                TaskField::Name => task.name.clone(),
                TaskField::BeginDate => task.start.format(&config.short_date_format).to_string(),
                TaskField::EndDate => task.end().format(&config.short_date_format).to_string(),
                TaskField::Duration => format_units(time_units.length(task.duration, unit)),
                TaskField::Completion => task.completion.to_string(),
                TaskField::OutlineNumber => number.clone(),
                TaskField::WebLink => task.web_link.clone().unwrap_or_default(),
                TaskField::Notes => task.notes.clone().unwrap_or_default(),
                TaskField::Predecessors => predecessors.join(separator.as_str()),
                TaskField::Resources => resources.join(separator.as_str()),
            };
            writer.print(&cell)?;
        }
        write_custom(writer, definitions, &task.custom_values)?;
        writer.println()?;
    }
    Ok(())
}

fn write_resources<W: SpreadsheetWriter>(project: &Project, writer: &mut W) -> Result<(), ExportError> {
    let definitions = project.resources.custom_properties().definitions();
    for field in RESOURCE_COLUMNS {
        writer.print(field.label())?;
    }
    for definition in definitions {
        writer.print(&definition.name)?;
    }
    writer.println()?;

    for (resource_ref, resource) in project.resources.resources() {
        for field in RESOURCE_COLUMNS {
            let cell = match field {
                ResourceField::Id => resource
                    .id
                    .clone()
                    .unwrap_or_else(|| (resource_ref.index() + 1).to_string()),
                ResourceField::Name => resource.name.clone(),
                ResourceField::Email => resource.email.clone().unwrap_or_default(),
                ResourceField::Phone => resource.phone.clone().unwrap_or_default(),
                ResourceField::Role => resource.role.persistent_id(),
            };
            writer.print(&cell)?;
        }
        write_custom(writer, definitions, &resource.custom_values)?;
        writer.println()?;
    }
    Ok(())
}

fn write_custom<W: SpreadsheetWriter>(
    writer: &mut W,
    definitions: &[CustomPropertyDefinition],
    values: &CustomValues,
) -> Result<(), ExportError> {
    for definition in definitions {
        writer.print(values.value(definition).unwrap_or_default())?;
    }
    Ok(())
}

/// `4` rather than `4.0`
fn format_units(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
