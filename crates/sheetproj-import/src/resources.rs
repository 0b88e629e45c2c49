//! Resources, roles and task assignments.

use std::collections::HashSet;

use sheetproj_core::{Project, ResourceRef, Role, RoleManager, TaskRef};

use crate::record::ResourceRecord;
use crate::warning::{WarningCode, Warnings};

/// Task row asking for resources by name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingAssignment {
    pub task: TaskRef,
    pub row: usize,
    pub names: Vec<String>,
}

/// Commits resource records into the project
#[derive(Debug, Default)]
pub struct ResourceBinder {
    /// Names already seen in this import
    seen: HashSet<String>,
    created: usize,
}

impl ResourceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resources created so far
    pub fn created(&self) -> usize {
        self.created
    }

    /// Create or update the resource named by `record`
    pub fn commit(
        &mut self,
        record: &ResourceRecord,
        project: &mut Project,
        warnings: &mut Warnings,
    ) -> ResourceRef {
        let role = bind_role(record.role.as_deref(), &project.roles, record.row, warnings);

        if !self.seen.insert(record.name.clone()) {
            warnings.at(
                record.row,
                WarningCode::DuplicateResource,
                format!("resource '{}' listed twice, later values win", record.name),
            );
        }
        let (resource_ref, created) = project.resources.get_or_create(&record.name, role.clone());
        if created {
            self.created += 1;
        }
        if let Some(resource) = project.resources.resource_mut(resource_ref) {
            resource.role = role;
            if record.id.is_some() {
                resource.id.clone_from(&record.id);
            }
            if record.email.is_some() {
                resource.email.clone_from(&record.email);
            }
            if record.phone.is_some() {
                resource.phone.clone_from(&record.phone);
            }
        }
        resource_ref
    }
}

/// Find the role named by `text`; empty text or no match gives the default
/// role, the latter with a warning.
pub fn bind_role(
    text: Option<&str>,
    roles: &RoleManager,
    row: usize,
    warnings: &mut Warnings,
) -> Role {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return roles.default_role();
    };
    match roles.find(text) {
        Some(role) => role.clone(),
        None => {
            let fallback = roles.default_role();
            warnings.at(
                row,
                WarningCode::UnknownRole,
                format!("unknown role '{}', using '{}'", text, fallback.name),
            );
            fallback
        }
    }
}

/// Assign resources to tasks by name.
///
/// Unknown names are reported and skipped. Returns the number of new
/// assignments.
pub fn assign(pending: Vec<PendingAssignment>, project: &mut Project, warnings: &mut Warnings) -> usize {
    let mut created = 0;
    for request in pending {
        for name in &request.names {
            let Some(resource) = project.resources.find(name) else {
                warnings.at(
                    request.row,
                    WarningCode::UnknownResource,
                    format!("no resource named '{}'", name),
                );
                continue;
            };
            match project.resources.assign(request.task, resource) {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => warnings.at(request.row, WarningCode::UnknownResource, e.to_string()),
            }
        }
    }
    created
}
