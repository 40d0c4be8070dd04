//! Problem instance for the scheduling GA.
//!
//! Bridges the domain models (Task, Resource) to the GA: owns the
//! immutable problem data plus everything derived from it once at build
//! time (eligibility lists, least-skilled resources, bounds). Passed by
//! reference to every operator.
//!
//! # Reference
//! Myszkowski et al. (2018), "iMOPSE: a library for bicriteria optimization
//! in Multi-Skill Resource-Constrained Project Scheduling Problem"

use crate::error::{Error, Result};
use crate::models::{Resource, ResourceId, Task, TaskId};
use crate::validation::validate_instance;

/// Immutable MS-RCPSP instance with precomputed eligibility.
///
/// # Example
/// ```
/// use u_rcpsp::ga::ProblemInstance;
/// use u_rcpsp::models::{Resource, Task};
///
/// let resources = vec![
///     Resource::new(0, 10.0).with_skill(1, 1),
///     Resource::new(1, 25.0).with_skill(1, 3),
/// ];
/// let tasks = vec![
///     Task::new(0, 4).with_requirement(1, 2),
///     Task::new(1, 2).with_predecessor(0),
/// ];
///
/// let instance = ProblemInstance::new(resources, tasks).unwrap();
/// assert_eq!(instance.eligible_resources(0), &[1]);
/// assert_eq!(instance.eligible_resources(1), &[0, 1]);
/// ```
#[derive(Debug, Clone)]
pub struct ProblemInstance {
    resources: Vec<Resource>,
    tasks: Vec<Task>,
    /// Eligible resource IDs per task, ascending, never empty.
    eligible: Vec<Vec<ResourceId>>,
    /// Least-skilled eligible resource per task.
    least_skilled: Vec<ResourceId>,
    total_duration: u32,
    cost_bounds: (f64, f64),
}

impl ProblemInstance {
    /// Validates the data and builds the eligibility caches.
    ///
    /// # Errors
    /// [`Error::InvalidInstance`] listing every problem found, including
    /// each task that no resource can perform.
    pub fn new(resources: Vec<Resource>, tasks: Vec<Task>) -> Result<Self> {
        validate_instance(&tasks, &resources).map_err(Error::InvalidInstance)?;

        let eligible: Vec<Vec<ResourceId>> = tasks
            .iter()
            .map(|task| {
                resources
                    .iter()
                    .filter(|r| r.can_perform(task))
                    .map(|r| r.id)
                    .collect()
            })
            .collect();

        // Validation guarantees non-empty candidate lists; min_by_key keeps
        // the first (lowest ID) on ties.
        let least_skilled = eligible
            .iter()
            .map(|candidates| {
                candidates
                    .iter()
                    .copied()
                    .min_by_key(|&r| resources[r].skills.total_level())
                    .unwrap_or_default()
            })
            .collect();

        let total_duration = tasks.iter().map(|t| t.duration).sum();

        let cheapest = resources.iter().map(|r| r.cost).fold(f64::INFINITY, f64::min);
        let dearest = resources
            .iter()
            .map(|r| r.cost)
            .fold(f64::NEG_INFINITY, f64::max);
        let cost_bounds = if resources.is_empty() {
            (0.0, 0.0)
        } else {
            let units = f64::from(total_duration);
            (units * cheapest, units * dearest)
        };

        Ok(Self {
            resources,
            tasks,
            eligible,
            least_skilled,
            total_duration,
            cost_bounds,
        })
    }

    /// Resources able to perform `task`, ascending by ID.
    #[inline]
    pub fn eligible_resources(&self, task: TaskId) -> &[ResourceId] {
        &self.eligible[task]
    }

    /// Whether `resource` may perform `task`.
    pub fn is_eligible(&self, task: TaskId, resource: ResourceId) -> bool {
        self.eligible[task].binary_search(&resource).is_ok()
    }

    /// Eligible resource with the smallest total skill level.
    ///
    /// Ties resolve to the lowest resource ID.
    #[inline]
    pub fn least_skilled_resource(&self, task: TaskId) -> ResourceId {
        self.least_skilled[task]
    }

    #[inline]
    pub fn task(&self, id: TaskId) -> &Task {
        &self.tasks[id]
    }

    #[inline]
    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.resources[id]
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[inline]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Sum of all task durations: the makespan of a fully serial schedule.
    pub fn total_duration(&self) -> u32 {
        self.total_duration
    }

    /// Project cost with every task on the cheapest resource, and with
    /// every task on the most expensive one (ignoring skills).
    pub fn cost_bounds(&self) -> (f64, f64) {
        self.cost_bounds
    }
}
