//! Skill pools and skill requirements.
//!
//! Both sides of the matching use the same shape: skill ID → integer
//! proficiency level. A resource offers a pool; a task demands a
//! requirement set.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Skill ID → proficiency level.
///
/// Ordered by skill ID so iteration (and therefore any derived output)
/// is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillSet {
    levels: BTreeMap<u32, u32>,
}

impl SkillSet {
    /// Creates an empty skill set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or overwrites) a skill level.
    pub fn with(mut self, skill: u32, level: u32) -> Self {
        self.insert(skill, level);
        self
    }

    /// Sets a skill level.
    pub fn insert(&mut self, skill: u32, level: u32) {
        self.levels.insert(skill, level);
    }

    /// Level of a skill, `None` if absent.
    pub fn level(&self, skill: u32) -> Option<u32> {
        self.levels.get(&skill).copied()
    }

    /// Whether this pool covers every requirement.
    ///
    /// A required skill missing from the pool is never satisfied, even
    /// when the required level is 0.
    pub fn satisfies(&self, requirements: &SkillSet) -> bool {
        requirements
            .iter()
            .all(|(skill, required)| self.level(skill).is_some_and(|have| have >= required))
    }

    /// Sum of all levels in the set.
    pub fn total_level(&self) -> u64 {
        self.levels.values().map(|&l| u64::from(l)).sum()
    }

    /// Iterates `(skill, level)` in ascending skill order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.levels.iter().map(|(&s, &l)| (s, l))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl FromIterator<(u32, u32)> for SkillSet {
    fn from_iter<I: IntoIterator<Item = (u32, u32)>>(iter: I) -> Self {
        Self {
            levels: iter.into_iter().collect(),
        }
    }
}
