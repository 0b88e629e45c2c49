//! Header recognition: mapping header cells to semantic fields.
//!
//! Each record group has a closed set of fields. A header cell is folded
//! (trimmed, lower-cased, inner whitespace collapsed) and looked up among
//! the built-in English synonyms and the localized labels of every bundled
//! locale.

use std::collections::HashMap;
use std::hash::Hash;

use crate::source::Row;
use crate::warning::{WarningCode, Warnings};

/// A closed set of semantic fields for one record group
pub trait SemanticField: Copy + Eq + Hash + std::fmt::Debug + 'static {
    /// Every field of the group
    const ALL: &'static [Self];

    /// Key of the field's label in the localization tables
    fn label_key(self) -> &'static str;

    /// Built-in spellings, first one canonical
    fn synonyms(self) -> &'static [&'static str];

    /// Does this field carry the record name? A header needs one.
    fn is_name(self) -> bool;

    /// Canonical English label
    fn label(self) -> &'static str {
        self.synonyms().first().copied().unwrap_or_default()
    }
}

/// Columns of a task table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskField {
    Id,
    Name,
    BeginDate,
    EndDate,
    Duration,
    Completion,
    Resources,
    WebLink,
    Notes,
    Predecessors,
    OutlineNumber,
}

impl SemanticField for TaskField {
    const ALL: &'static [Self] = &[
        TaskField::Id,
        TaskField::Name,
        TaskField::BeginDate,
        TaskField::EndDate,
        TaskField::Duration,
        TaskField::Completion,
        TaskField::Resources,
        TaskField::WebLink,
        TaskField::Notes,
        TaskField::Predecessors,
        TaskField::OutlineNumber,
    ];

    fn label_key(self) -> &'static str {
        match self {
            TaskField::Id => "column.task.id",
            TaskField::Name => "column.task.name",
            TaskField::BeginDate => "column.task.begin_date",
            TaskField::EndDate => "column.task.end_date",
            TaskField::Duration => "column.task.duration",
            TaskField::Completion => "column.task.completion",
            TaskField::Resources => "column.task.resources",
            TaskField::WebLink => "column.task.web_link",
            TaskField::Notes => "column.task.notes",
            TaskField::Predecessors => "column.task.predecessors",
            TaskField::OutlineNumber => "column.task.outline_number",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            TaskField::Id => &["ID", "Task ID", "#"],
            TaskField::Name => &["Name", "Task", "Task name", "Title"],
            TaskField::BeginDate => &["Begin date", "Begin", "Start", "Start date"],
            TaskField::EndDate => &["End date", "End", "Finish", "Finish date", "Due date"],
            TaskField::Duration => &["Duration", "Length"],
            TaskField::Completion => &[
                "Completion",
                "% Complete",
                "Percent complete",
                "Progress",
                "Complete",
            ],
            TaskField::Resources => &["Resources", "Assignments", "Assigned to", "Resource names"],
            TaskField::WebLink => &["Web Link", "Link", "URL"],
            TaskField::Notes => &["Notes", "Note", "Comments", "Description"],
            TaskField::Predecessors => &["Predecessors", "Dependencies", "Depends on"],
            TaskField::OutlineNumber => &["Outline number", "Outline", "WBS"],
        }
    }

    fn is_name(self) -> bool {
        self == TaskField::Name
    }
}

/// Columns of a resource table
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceField {
    Id,
    Name,
    Email,
    Phone,
    Role,
}

impl SemanticField for ResourceField {
    const ALL: &'static [Self] = &[
        ResourceField::Id,
        ResourceField::Name,
        ResourceField::Email,
        ResourceField::Phone,
        ResourceField::Role,
    ];

    fn label_key(self) -> &'static str {
        match self {
            ResourceField::Id => "column.resource.id",
            ResourceField::Name => "column.resource.name",
            ResourceField::Email => "column.resource.email",
            ResourceField::Phone => "column.resource.phone",
            ResourceField::Role => "column.resource.role",
        }
    }

    fn synonyms(self) -> &'static [&'static str] {
        match self {
            ResourceField::Id => &["ID", "Resource ID"],
            ResourceField::Name => &["Name", "Resource", "Resource name"],
            ResourceField::Email => &["e-mail", "Email", "Mail"],
            ResourceField::Phone => &["Phone", "Telephone"],
            ResourceField::Role => &["Default role", "Role"],
        }
    }

    fn is_name(self) -> bool {
        self == ResourceField::Name
    }
}

/// Normalize header text for lookup
pub fn fold(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Folded spelling → field, for one record group
#[derive(Clone, Debug)]
pub struct SynonymTable<F> {
    entries: HashMap<String, F>,
}

impl<F: SemanticField> SynonymTable<F> {
    /// Built-in synonyms plus the label of every field in every bundled
    /// locale. On a clash the first registration wins.
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        for &field in F::ALL {
            for synonym in field.synonyms() {
                entries.entry(fold(synonym)).or_insert(field);
            }
        }
        for locale in rust_i18n::available_locales!() {
            for &field in F::ALL {
                let label = rust_i18n::t!(field.label_key(), locale = locale);
                if label != field.label_key() {
                    entries.entry(fold(&label)).or_insert(field);
                }
            }
        }
        Self { entries }
    }

    pub fn lookup(&self, text: &str) -> Option<F> {
        self.entries.get(&fold(text)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: SemanticField> Default for SynonymTable<F> {
    fn default() -> Self {
        Self::new()
    }
}

/// What a column holds
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Column<F> {
    Field(F),
    /// Unrecognized header text, imported as a custom property
    Custom(String),
    /// Empty header cell or duplicate field
    Ignored,
}

/// Column index → semantic field, fixed for all rows of a table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnMapping<F> {
    columns: Vec<Column<F>>,
}

impl<F: SemanticField> ColumnMapping<F> {
    pub fn columns(&self) -> &[Column<F>] {
        &self.columns
    }

    pub fn index_of(&self, field: F) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| matches!(c, Column::Field(f) if *f == field))
    }

    pub fn has(&self, field: F) -> bool {
        self.index_of(field).is_some()
    }

    /// Non-empty cell of `row` under `field`
    pub fn value<'r>(&self, row: &'r Row, field: F) -> Option<&'r str> {
        self.index_of(field).and_then(|i| row.value(i))
    }

    /// Custom columns as (column index, header text)
    pub fn custom_columns(&self) -> impl Iterator<Item = (usize, &str)> {
        self.columns.iter().enumerate().filter_map(|(i, c)| match c {
            Column::Custom(name) => Some((i, name.as_str())),
            _ => None,
        })
    }
}

/// Map a header row onto `F`.
///
/// Returns `None` when no column carries the record name; the row is then
/// not a header of this group and no warning is recorded.
pub fn recognize<F: SemanticField>(
    header: &Row,
    synonyms: &SynonymTable<F>,
    warnings: &mut Warnings,
) -> Option<ColumnMapping<F>> {
    let mut local = Warnings::new();
    let mut columns = Vec::with_capacity(header.len());

    for (index, text) in header.cells().iter().enumerate() {
        if text.is_empty() {
            columns.push(Column::Ignored);
            continue;
        }
        let column = match synonyms.lookup(text) {
            Some(field) if columns.contains(&Column::Field(field)) => {
                local.at(
                    header.number,
                    WarningCode::DuplicateColumn,
                    format!(
                        "column {} '{}' repeats field {:?} and is ignored",
                        index + 1,
                        text,
                        field
                    ),
                );
                Column::Ignored
            }
            Some(field) => Column::Field(field),
            None => Column::Custom(text.clone()),
        };
        columns.push(column);
    }

    let recognized = columns
        .iter()
        .any(|c| matches!(c, Column::Field(f) if f.is_name()));
    if !recognized {
        return None;
    }
    tracing::debug!(row = header.number, columns = columns.len(), "recognized header");
    warnings.extend(local);
    Some(ColumnMapping { columns })
}
