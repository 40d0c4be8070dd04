//! Resource model.
//!
//! Resources perform tasks: one task at a time, charged per unit of task
//! duration. What a resource can do is described by its skill pool.
//!
//! # Reference
//! Myszkowski et al. (2015), "Hybrid ant colony optimization in solving
//! multi-skill resource-constrained project scheduling problem"

use serde::{Deserialize, Serialize};

use super::{SkillSet, Task};

/// Dense, 0-based resource index.
pub type ResourceId = usize;

/// A resource that can be assigned to tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource ID (equals its index in the instance).
    pub id: ResourceId,
    /// Cost per unit of task duration.
    pub cost: f64,
    /// Skills with proficiency levels.
    pub skills: SkillSet,
}

impl Resource {
    /// Creates a resource without skills.
    pub fn new(id: ResourceId, cost: f64) -> Self {
        Self {
            id,
            cost,
            skills: SkillSet::new(),
        }
    }

    /// Adds a skill.
    pub fn with_skill(mut self, skill: u32, level: u32) -> Self {
        self.skills.insert(skill, level);
        self
    }

    /// Replaces the whole skill pool.
    pub fn with_skills(mut self, skills: SkillSet) -> Self {
        self.skills = skills;
        self
    }

    /// Returns the proficiency level for a skill (`None` if absent).
    pub fn skill_level(&self, skill: u32) -> Option<u32> {
        self.skills.level(skill)
    }

    /// Whether this resource meets every skill requirement of `task`.
    pub fn can_perform(&self, task: &Task) -> bool {
        self.skills.satisfies(&task.requirements)
    }

    /// Cost of running `task` to completion on this resource.
    #[inline]
    pub fn cost_of(&self, task: &Task) -> f64 {
        f64::from(task.duration) * self.cost
    }
}
