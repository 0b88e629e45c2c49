//! Human resources, their roles and task assignments.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{CustomPropertyManager, CustomValues, ModelError, OwnerKind, TaskRef};

// ============================================================================
// Roles
// ============================================================================

/// A role a resource plays by default
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Role {
    /// Name of the role set the role belongs to
    pub role_set: String,
    /// Number of the role, unique across all sets
    pub id: u32,
    /// Human-readable name
    pub name: String,
}

impl Role {
    /// Stable identifier of the form `<set>:<id>`, e.g. `Default:1`
    pub fn persistent_id(&self) -> String {
        format!("{}:{}", self.role_set, self.id)
    }
}

/// Registry of named role sets
#[derive(Clone, Debug)]
pub struct RoleManager {
    roles: Vec<Role>,
}

impl Default for RoleManager {
    fn default() -> Self {
        let mut manager = Self { roles: Vec::new() };
        manager.add_role("Default", "undefined");
        manager.add_role("Default", "project manager");
        for name in [
            "developer",
            "doc writer",
            "tester",
            "graphic designer",
            "doc translator",
            "packager",
            "analysis",
            "web designer",
            "no specific role",
        ] {
            manager.add_role("SoftwareDevelopment", name);
        }
        manager
    }
}

impl RoleManager {
    /// Create a registry without any role
    pub fn empty() -> Self {
        Self { roles: Vec::new() }
    }

    /// Register a role in `role_set` and return it
    pub fn add_role(&mut self, role_set: &str, name: &str) -> Role {
        let role = Role {
            role_set: role_set.to_string(),
            id: self.roles.len() as u32,
            name: name.to_string(),
        };
        self.roles.push(role.clone());
        role
    }

    /// Find a role by persistent ID, then by name. Matching is case-sensitive.
    pub fn find(&self, text: &str) -> Option<&Role> {
        self.roles
            .iter()
            .find(|r| r.persistent_id() == text)
            .or_else(|| self.roles.iter().find(|r| r.name == text))
    }

    /// Role given to resources whose role is unknown
    pub fn default_role(&self) -> Role {
        self.roles.first().cloned().unwrap_or_else(|| Role {
            role_set: "Default".into(),
            id: 0,
            name: "undefined".into(),
        })
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }
}

// ============================================================================
// Resources
// ============================================================================

/// Handle to a resource owned by a `ResourceManager`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceRef(usize);

impl ResourceRef {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A person that can be assigned to tasks
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
    /// Human-readable name, unique within a project
    pub name: String,
    /// External identifier as found in the source table
    pub id: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Default role
    pub role: Role,
    /// Values of resource custom properties
    pub custom_values: CustomValues,
}

/// Resource assigned to a task
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub task: TaskRef,
    pub resource: ResourceRef,
    /// Allocation percentage (100.0 = full time)
    pub load: f32,
}

/// Owns resources, indexed by name, and their assignments
#[derive(Clone, Debug)]
pub struct ResourceManager {
    resources: Vec<Resource>,
    by_name: HashMap<String, ResourceRef>,
    assignments: Vec<Assignment>,
    custom_properties: CustomPropertyManager,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self {
            resources: Vec::new(),
            by_name: HashMap::new(),
            assignments: Vec::new(),
            custom_properties: CustomPropertyManager::new(OwnerKind::Resource),
        }
    }

    /// Return the resource called `name`, creating it with `role` if needed.
    ///
    /// The flag is true when a new resource was created.
    pub fn get_or_create(&mut self, name: &str, role: Role) -> (ResourceRef, bool) {
        if let Some(&existing) = self.by_name.get(name) {
            return (existing, false);
        }
        let resource_ref = ResourceRef(self.resources.len());
        self.resources.push(Resource {
            name: name.to_string(),
            id: None,
            email: None,
            phone: None,
            role,
            custom_values: CustomValues::default(),
        });
        self.by_name.insert(name.to_string(), resource_ref);
        (resource_ref, true)
    }

    /// Look up a resource by its exact name
    pub fn find(&self, name: &str) -> Option<ResourceRef> {
        self.by_name.get(name).copied()
    }

    pub fn resource(&self, resource: ResourceRef) -> Option<&Resource> {
        self.resources.get(resource.0)
    }

    pub fn resource_mut(&mut self, resource: ResourceRef) -> Option<&mut Resource> {
        self.resources.get_mut(resource.0)
    }

    /// Convenience lookup by name
    pub fn by_name(&self, name: &str) -> Option<&Resource> {
        self.find(name).and_then(|r| self.resource(r))
    }

    /// All resources in creation order
    pub fn resources(&self) -> impl Iterator<Item = (ResourceRef, &Resource)> {
        self.resources
            .iter()
            .enumerate()
            .map(|(i, r)| (ResourceRef(i), r))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Assign `resource` to `task` at full load.
    ///
    /// Returns false if the assignment already existed.
    pub fn assign(&mut self, task: TaskRef, resource: ResourceRef) -> Result<bool, ModelError> {
        if resource.0 >= self.resources.len() {
            return Err(ModelError::UnknownResource(resource.0));
        }
        if self.is_assigned(task, resource) {
            return Ok(false);
        }
        self.assignments.push(Assignment {
            task,
            resource,
            load: 100.0,
        });
        Ok(true)
    }

    pub fn is_assigned(&self, task: TaskRef, resource: ResourceRef) -> bool {
        self.assignments
            .iter()
            .any(|a| a.task == task && a.resource == resource)
    }

    /// Resources assigned to `task`, in assignment order
    pub fn assignments_of(&self, task: TaskRef) -> Vec<ResourceRef> {
        self.assignments
            .iter()
            .filter(|a| a.task == task)
            .map(|a| a.resource)
            .collect()
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn custom_properties(&self) -> &CustomPropertyManager {
        &self.custom_properties
    }

    pub fn custom_properties_mut(&mut self) -> &mut CustomPropertyManager {
        &mut self.custom_properties
    }
}
