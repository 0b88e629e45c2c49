//! # sheetproj-core
//!
//! Task and resource model that the sheetproj import engine writes into.
//!
//! This crate provides:
//! - Domain types: `Project`, `Task`, `Resource`, `Role`, custom properties
//! - Managers owning the entities: `TaskManager`, `ResourceManager`, `RoleManager`
//! - The time-unit authority trait `TimeUnitStack`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use sheetproj_core::{DependencyType, Duration, Project};
//!
//! let start = NaiveDate::from_ymd_opt(2025, 2, 3).unwrap();
//! let mut project = Project::new("My Project", start);
//! let design = project.tasks.create_task("design");
//! let build = project.tasks.create_task("build");
//! project
//!     .tasks
//!     .create_dependency(build, design, DependencyType::FinishToStart, Duration::zero())
//!     .unwrap();
//! assert_eq!(project.tasks.dependencies_as_dependant(build).count(), 1);
//! ```

mod custom;
mod resource;

pub use custom::{
    CustomPropertyDefinition, CustomPropertyManager, CustomValue, CustomValues, OwnerKind,
    PropertyId, PropertyType, TypedValue,
};
pub use resource::{Assignment, Resource, ResourceManager, ResourceRef, Role, RoleManager};

use chrono::{NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Duration & Time Units
// ============================================================================

/// Minutes in one working day
const MINUTES_PER_DAY: i64 = 8 * 60;

/// Duration in working time
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Duration {
    /// Number of minutes
    pub minutes: i64,
}

impl Duration {
    pub const fn zero() -> Self {
        Self { minutes: 0 }
    }

    pub const fn minutes(m: i64) -> Self {
        Self { minutes: m }
    }

    pub const fn hours(h: i64) -> Self {
        Self { minutes: h * 60 }
    }

    pub const fn days(d: i64) -> Self {
        Self { minutes: d * MINUTES_PER_DAY } // 8-hour workday
    }

    pub fn as_days(&self) -> f64 {
        self.minutes as f64 / MINUTES_PER_DAY as f64
    }

    pub fn as_hours(&self) -> f64 {
        self.minutes as f64 / 60.0
    }

    /// Whole days, rounded toward zero
    pub const fn whole_days(&self) -> i64 {
        self.minutes / MINUTES_PER_DAY
    }

    pub const fn is_zero(&self) -> bool {
        self.minutes == 0
    }
}

impl std::ops::Add for Duration {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self { minutes: self.minutes + rhs.minutes }
    }
}

impl std::ops::Sub for Duration {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self { minutes: self.minutes - rhs.minutes }
    }
}

impl std::ops::Neg for Duration {
    type Output = Self;
    fn neg(self) -> Self {
        Self { minutes: -self.minutes }
    }
}

/// Units a duration can be expressed in
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeUnit {
    Hour,
    #[default]
    Day,
    Week,
}

/// Authority for duration arithmetic.
///
/// Importers and exporters never compute date spans themselves; they ask the
/// stack, so a working-time calendar can be plugged in without touching them.
pub trait TimeUnitStack {
    /// Unit used when a table gives a bare number
    fn default_unit(&self) -> TimeUnit;

    /// Length of `duration` measured in `unit`
    fn length(&self, duration: Duration, unit: TimeUnit) -> f64;

    /// Duration of `length` units of `unit`
    fn duration_of(&self, length: f64, unit: TimeUnit) -> Duration;

    /// Inclusive span between two dates (`begin == end` is one unit)
    fn span(&self, begin: NaiveDate, end: NaiveDate) -> Duration;

    /// Date reached by moving `duration` from `date`; `None` past the
    /// representable calendar
    fn shift(&self, date: NaiveDate, duration: Duration) -> Option<NaiveDate>;
}

/// Calendar-day time units: every day counts, weeks are seven days.
#[derive(Clone, Copy, Debug, Default)]
pub struct DayTimeUnitStack;

impl DayTimeUnitStack {
    fn unit_minutes(unit: TimeUnit) -> f64 {
        match unit {
            TimeUnit::Hour => 60.0,
            TimeUnit::Day => MINUTES_PER_DAY as f64,
            TimeUnit::Week => (7 * MINUTES_PER_DAY) as f64,
        }
    }
}

impl TimeUnitStack for DayTimeUnitStack {
    fn default_unit(&self) -> TimeUnit {
        TimeUnit::Day
    }

    fn length(&self, duration: Duration, unit: TimeUnit) -> f64 {
        duration.minutes as f64 / Self::unit_minutes(unit)
    }

    fn duration_of(&self, length: f64, unit: TimeUnit) -> Duration {
        Duration::minutes((length * Self::unit_minutes(unit)).round() as i64)
    }

    fn span(&self, begin: NaiveDate, end: NaiveDate) -> Duration {
        let days = (end - begin).num_days() + 1;
        Duration::days(days.max(0))
    }

    fn shift(&self, date: NaiveDate, duration: Duration) -> Option<NaiveDate> {
        TimeDelta::try_days(duration.whole_days()).and_then(|delta| date.checked_add_signed(delta))
    }
}

// ============================================================================
// Project
// ============================================================================

/// Aggregate of the task, resource and role managers
#[derive(Clone, Debug)]
pub struct Project {
    /// Human-readable name
    pub name: String,
    /// Project start date; tasks without dates start here
    pub start: NaiveDate,
    pub tasks: TaskManager,
    pub resources: ResourceManager,
    pub roles: RoleManager,
}

impl Project {
    /// Create an empty project with the default role registry
    pub fn new(name: impl Into<String>, start: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start,
            tasks: TaskManager::new(start),
            resources: ResourceManager::new(),
            roles: RoleManager::default(),
        }
    }
}

// ============================================================================
// Task
// ============================================================================

/// Handle to a task owned by a `TaskManager`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TaskRef(usize);

impl TaskRef {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A schedulable unit of work
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Human-readable name
    pub name: String,
    /// Identifier given by the source table, if any
    pub id: Option<String>,
    /// First day of the task
    pub start: NaiveDate,
    /// Calendar duration
    pub duration: Duration,
    /// Completion percentage (0-100)
    pub completion: u8,
    /// Is this a milestone (zero duration)?
    pub milestone: bool,
    pub web_link: Option<String>,
    pub notes: Option<String>,
    /// Values of task custom properties
    pub custom_values: CustomValues,
}

impl Task {
    fn new(name: String, start: NaiveDate) -> Self {
        Self {
            name,
            id: None,
            start,
            duration: Duration::days(1),
            completion: 0,
            milestone: false,
            web_link: None,
            notes: None,
            custom_values: CustomValues::default(),
        }
    }

    /// Last day of the task, inclusive. Milestones end where they start;
    /// ends past the calendar clamp to `NaiveDate::MAX`.
    pub fn end(&self) -> NaiveDate {
        let days = self.duration.whole_days();
        if self.milestone || days <= 1 {
            return self.start;
        }
        TimeDelta::try_days(days - 1)
            .and_then(|delta| self.start.checked_add_signed(delta))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Task dependency with type and lag
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDependency {
    /// Task that waits
    pub dependant: TaskRef,
    /// Task being waited on
    pub dependee: TaskRef,
    /// Type of dependency
    pub kind: DependencyType,
    /// Lag time (positive) or lead time (negative)
    pub lag: Duration,
}

/// Types of task dependencies
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyType {
    /// Finish-to-Start: successor starts after predecessor finishes
    #[default]
    FinishToStart,
    /// Start-to-Start: successor starts when predecessor starts
    StartToStart,
    /// Finish-to-Finish: successor finishes when predecessor finishes
    FinishToFinish,
    /// Start-to-Finish: successor finishes when predecessor starts
    StartToFinish,
}

impl DependencyType {
    /// Two-letter code used in predecessor cells
    pub const fn code(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
            DependencyType::StartToStart => "SS",
            DependencyType::FinishToFinish => "FF",
            DependencyType::StartToFinish => "SF",
        }
    }

    /// Parse a two-letter code, ignoring case
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "FS" => Some(DependencyType::FinishToStart),
            "SS" => Some(DependencyType::StartToStart),
            "FF" => Some(DependencyType::FinishToFinish),
            "SF" => Some(DependencyType::StartToFinish),
            _ => None,
        }
    }
}

// ============================================================================
// Task Manager
// ============================================================================

/// Owns tasks, their containment hierarchy and their dependencies
#[derive(Clone, Debug)]
pub struct TaskManager {
    default_start: NaiveDate,
    tasks: Vec<Task>,
    containers: Vec<Option<TaskRef>>,
    dependencies: Vec<TaskDependency>,
    custom_properties: CustomPropertyManager,
}

impl TaskManager {
    pub fn new(default_start: NaiveDate) -> Self {
        Self {
            default_start,
            tasks: Vec::new(),
            containers: Vec::new(),
            dependencies: Vec::new(),
            custom_properties: CustomPropertyManager::new(OwnerKind::Task),
        }
    }

    /// Create a root task starting at the default start date
    pub fn create_task(&mut self, name: impl Into<String>) -> TaskRef {
        let task_ref = TaskRef(self.tasks.len());
        self.tasks.push(Task::new(name.into(), self.default_start));
        self.containers.push(None);
        task_ref
    }

    pub fn task(&self, task: TaskRef) -> Option<&Task> {
        self.tasks.get(task.0)
    }

    pub fn task_mut(&mut self, task: TaskRef) -> Option<&mut Task> {
        self.tasks.get_mut(task.0)
    }

    fn require_mut(&mut self, task: TaskRef) -> Result<&mut Task, ModelError> {
        self.tasks
            .get_mut(task.0)
            .ok_or(ModelError::UnknownTask(task.0))
    }

    /// All tasks in creation order
    pub fn tasks(&self) -> impl Iterator<Item = (TaskRef, &Task)> {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskRef(i), t))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// First task with the given name
    pub fn find_by_name(&self, name: &str) -> Option<TaskRef> {
        self.tasks.iter().position(|t| t.name == name).map(TaskRef)
    }

    // ========================================================================
    // Scheduling attributes
    // ========================================================================

    pub fn set_start(&mut self, task: TaskRef, start: NaiveDate) -> Result<(), ModelError> {
        self.require_mut(task)?.start = start;
        Ok(())
    }

    pub fn set_duration(&mut self, task: TaskRef, duration: Duration) -> Result<(), ModelError> {
        self.require_mut(task)?.duration = duration;
        Ok(())
    }

    /// Set completion, clamped to 0-100
    pub fn set_completion(&mut self, task: TaskRef, completion: u8) -> Result<(), ModelError> {
        self.require_mut(task)?.completion = completion.min(100);
        Ok(())
    }

    /// Flag or unflag a milestone. Milestones carry a zero duration.
    pub fn set_milestone(&mut self, task: TaskRef, milestone: bool) -> Result<(), ModelError> {
        let task = self.require_mut(task)?;
        task.milestone = milestone;
        if milestone {
            task.duration = Duration::zero();
        }
        Ok(())
    }

    // ========================================================================
    // Containment hierarchy
    // ========================================================================

    pub fn container(&self, task: TaskRef) -> Option<TaskRef> {
        self.containers.get(task.0).copied().flatten()
    }

    /// Move `task` under `container`, or to the root level with `None`
    pub fn set_container(
        &mut self,
        task: TaskRef,
        container: Option<TaskRef>,
    ) -> Result<(), ModelError> {
        if task.0 >= self.tasks.len() {
            return Err(ModelError::UnknownTask(task.0));
        }
        if let Some(parent) = container {
            if parent.0 >= self.tasks.len() {
                return Err(ModelError::UnknownTask(parent.0));
            }
            if parent == task || self.is_ancestor(task, parent) {
                return Err(ModelError::HierarchyLoop {
                    task: self.tasks[task.0].name.clone(),
                    container: self.tasks[parent.0].name.clone(),
                });
            }
        }
        self.containers[task.0] = container;
        Ok(())
    }

    /// Direct children of `task`, in creation order
    pub fn nested_tasks(&self, task: TaskRef) -> Vec<TaskRef> {
        self.containers
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == Some(task))
            .map(|(i, _)| TaskRef(i))
            .collect()
    }

    /// Tasks without a container, in creation order
    pub fn root_tasks(&self) -> Vec<TaskRef> {
        self.containers
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_none())
            .map(|(i, _)| TaskRef(i))
            .collect()
    }

    /// Number of containers above `task`
    pub fn depth(&self, task: TaskRef) -> usize {
        let mut depth = 0;
        let mut current = self.container(task);
        while let Some(parent) = current {
            depth += 1;
            current = self.container(parent);
        }
        depth
    }

    /// Is `ancestor` somewhere above `task`?
    pub fn is_ancestor(&self, ancestor: TaskRef, task: TaskRef) -> bool {
        let mut current = self.container(task);
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.container(parent);
        }
        false
    }

    /// Is `task` a summary task (has children)?
    pub fn is_summary(&self, task: TaskRef) -> bool {
        self.containers.iter().any(|c| *c == Some(task))
    }

    // ========================================================================
    // Dependencies
    // ========================================================================

    /// Make `dependant` depend on `dependee`.
    ///
    /// An existing edge between the same pair is replaced.
    pub fn create_dependency(
        &mut self,
        dependant: TaskRef,
        dependee: TaskRef,
        kind: DependencyType,
        lag: Duration,
    ) -> Result<(), ModelError> {
        let name_of = |r: TaskRef| self.tasks.get(r.0).map(|t| t.name.clone());
        let dependant_name = name_of(dependant).ok_or(ModelError::UnknownTask(dependant.0))?;
        let dependee_name = name_of(dependee).ok_or(ModelError::UnknownTask(dependee.0))?;

        if dependant == dependee {
            return Err(ModelError::SelfDependency(dependant_name));
        }
        if self.depends_transitively(dependee, dependant) {
            return Err(ModelError::DependencyLoop {
                dependant: dependant_name,
                dependee: dependee_name,
            });
        }

        let dependency = TaskDependency {
            dependant,
            dependee,
            kind,
            lag,
        };
        match self
            .dependencies
            .iter_mut()
            .find(|d| d.dependant == dependant && d.dependee == dependee)
        {
            Some(existing) => *existing = dependency,
            None => self.dependencies.push(dependency),
        }
        Ok(())
    }

    /// Does `from` (directly or indirectly) wait on `target`?
    fn depends_transitively(&self, from: TaskRef, target: TaskRef) -> bool {
        let mut stack = vec![from];
        let mut visited = vec![false; self.tasks.len()];
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if std::mem::replace(&mut visited[current.0], true) {
                continue;
            }
            stack.extend(
                self.dependencies
                    .iter()
                    .filter(|d| d.dependant == current)
                    .map(|d| d.dependee),
            );
        }
        false
    }

    pub fn dependencies(&self) -> &[TaskDependency] {
        &self.dependencies
    }

    /// Dependencies in which `task` is the waiting side
    pub fn dependencies_as_dependant(
        &self,
        task: TaskRef,
    ) -> impl Iterator<Item = &TaskDependency> {
        self.dependencies.iter().filter(move |d| d.dependant == task)
    }

    pub fn dependency(&self, dependant: TaskRef, dependee: TaskRef) -> Option<&TaskDependency> {
        self.dependencies
            .iter()
            .find(|d| d.dependant == dependant && d.dependee == dependee)
    }

    // ========================================================================
    // Custom properties
    // ========================================================================

    pub fn custom_properties(&self) -> &CustomPropertyManager {
        &self.custom_properties
    }

    pub fn custom_properties_mut(&mut self) -> &mut CustomPropertyManager {
        &mut self.custom_properties
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Rejected model mutation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("Task not found: #{0}")]
    UnknownTask(usize),

    #[error("Resource not found: #{0}")]
    UnknownResource(usize),

    #[error("Task '{0}' cannot depend on itself")]
    SelfDependency(String),

    #[error("Dependency of '{dependant}' on '{dependee}' would create a loop")]
    DependencyLoop { dependant: String, dependee: String },

    #[error("Task '{task}' cannot be nested under its own descendant '{container}'")]
    HierarchyLoop { task: String, container: String },
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn manager() -> TaskManager {
        TaskManager::new(date(2025, 1, 6))
    }

    #[test]
    fn duration_arithmetic() {
        let d1 = Duration::days(5);
        let d2 = Duration::days(3);
        assert_eq!((d1 + d2).as_days(), 8.0);
        assert_eq!((d1 - d2).as_days(), 2.0);
        assert_eq!((-d2).as_days(), -3.0);
        assert_eq!(Duration::hours(4).as_days(), 0.5);
    }

    #[test]
    fn day_stack_span_is_inclusive() {
        let stack = DayTimeUnitStack;
        let span = stack.span(date(2012, 7, 23), date(2012, 7, 26));
        assert_eq!(stack.length(span, stack.default_unit()), 4.0);
        assert_eq!(stack.span(date(2012, 7, 26), date(2012, 7, 26)), Duration::days(1));
        assert_eq!(stack.span(date(2012, 7, 26), date(2012, 7, 20)), Duration::zero());
    }

    #[test]
    fn day_stack_units() {
        let stack = DayTimeUnitStack;
        assert_eq!(stack.duration_of(1.0, TimeUnit::Week), Duration::days(7));
        assert_eq!(stack.duration_of(2.0, TimeUnit::Hour), Duration::hours(2));
        assert_eq!(stack.length(Duration::days(14), TimeUnit::Week), 2.0);
        assert_eq!(
            stack.shift(date(2012, 7, 23), Duration::days(3)),
            Some(date(2012, 7, 26))
        );
        assert_eq!(
            stack.shift(date(2012, 7, 23), Duration::days(-1)),
            Some(date(2012, 7, 22))
        );
    }

    #[test]
    fn shift_past_calendar_is_none() {
        let stack = DayTimeUnitStack;
        assert_eq!(stack.shift(date(2012, 7, 23), Duration::days(-100_000_000)), None);
        assert_eq!(stack.shift(date(2012, 7, 23), Duration::minutes(i64::MAX)), None);
    }

    #[test]
    fn task_end_is_inclusive() {
        let mut tasks = manager();
        let t = tasks.create_task("t");
        tasks.set_duration(t, Duration::days(4)).unwrap();
        assert_eq!(tasks.task(t).unwrap().end(), date(2025, 1, 9));

        tasks.set_milestone(t, true).unwrap();
        let task = tasks.task(t).unwrap();
        assert!(task.milestone);
        assert_eq!(task.duration, Duration::zero());
        assert_eq!(task.end(), date(2025, 1, 6));
    }

    #[test]
    fn huge_duration_end_clamps() {
        let mut tasks = manager();
        let t = tasks.create_task("t");
        tasks.set_duration(t, Duration::minutes(i64::MAX)).unwrap();
        assert_eq!(tasks.task(t).unwrap().end(), NaiveDate::MAX);
    }

    #[test]
    fn completion_is_clamped() {
        let mut tasks = manager();
        let t = tasks.create_task("t");
        tasks.set_completion(t, 250).unwrap();
        assert_eq!(tasks.task(t).unwrap().completion, 100);
    }

    #[test]
    fn hierarchy_queries() {
        let mut tasks = manager();
        let parent = tasks.create_task("parent");
        let child1 = tasks.create_task("child1");
        let child2 = tasks.create_task("child2");
        let grandchild = tasks.create_task("grandchild");
        tasks.set_container(child1, Some(parent)).unwrap();
        tasks.set_container(child2, Some(parent)).unwrap();
        tasks.set_container(grandchild, Some(child2)).unwrap();

        assert_eq!(tasks.container(grandchild), Some(child2));
        assert_eq!(tasks.nested_tasks(parent), vec![child1, child2]);
        assert_eq!(tasks.root_tasks(), vec![parent]);
        assert_eq!(tasks.depth(grandchild), 2);
        assert!(tasks.is_ancestor(parent, grandchild));
        assert!(tasks.is_summary(child2));
        assert!(!tasks.is_summary(child1));
    }

    #[test]
    fn hierarchy_rejects_loops() {
        let mut tasks = manager();
        let a = tasks.create_task("a");
        let b = tasks.create_task("b");
        tasks.set_container(b, Some(a)).unwrap();

        assert!(matches!(
            tasks.set_container(a, Some(b)),
            Err(ModelError::HierarchyLoop { .. })
        ));
        assert!(tasks.set_container(a, Some(a)).is_err());

        // Moving back to the root level is always allowed
        tasks.set_container(b, None).unwrap();
        assert_eq!(tasks.container(b), None);
    }

    #[test]
    fn dependency_replaces_same_pair() {
        let mut tasks = manager();
        let a = tasks.create_task("a");
        let b = tasks.create_task("b");
        tasks
            .create_dependency(b, a, DependencyType::FinishToStart, Duration::zero())
            .unwrap();
        tasks
            .create_dependency(b, a, DependencyType::StartToStart, Duration::days(2))
            .unwrap();

        assert_eq!(tasks.dependencies().len(), 1);
        let dep = tasks.dependency(b, a).unwrap();
        assert_eq!(dep.kind, DependencyType::StartToStart);
        assert_eq!(dep.lag, Duration::days(2));
    }

    #[test]
    fn dependency_rejects_self_and_cycles() {
        let mut tasks = manager();
        let a = tasks.create_task("a");
        let b = tasks.create_task("b");
        let c = tasks.create_task("c");
        tasks
            .create_dependency(b, a, DependencyType::default(), Duration::zero())
            .unwrap();
        tasks
            .create_dependency(c, b, DependencyType::default(), Duration::zero())
            .unwrap();

        assert_eq!(
            tasks.create_dependency(a, a, DependencyType::default(), Duration::zero()),
            Err(ModelError::SelfDependency("a".into()))
        );
        assert!(matches!(
            tasks.create_dependency(a, c, DependencyType::default(), Duration::zero()),
            Err(ModelError::DependencyLoop { .. })
        ));
        assert_eq!(tasks.dependencies().len(), 2);
    }

    #[test]
    fn dependency_type_codes() {
        for kind in [
            DependencyType::FinishToStart,
            DependencyType::StartToStart,
            DependencyType::FinishToFinish,
            DependencyType::StartToFinish,
        ] {
            assert_eq!(DependencyType::from_code(kind.code()), Some(kind));
        }
        assert_eq!(DependencyType::from_code("fs"), Some(DependencyType::FinishToStart));
        assert_eq!(DependencyType::from_code("XX"), None);
    }

    #[test]
    fn unknown_task_is_an_error() {
        let mut tasks = manager();
        let a = tasks.create_task("a");
        let mut other = manager();
        other.create_task("x");
        let ghost = other.create_task("ghost");

        assert_eq!(tasks.set_start(ghost, date(2025, 1, 1)), Err(ModelError::UnknownTask(1)));
        assert!(tasks.set_container(a, Some(ghost)).is_err());
        assert!(tasks.task(ghost).is_none());
    }
}
