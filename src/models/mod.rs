//! Scheduling domain models.
//!
//! Core data types for the multi-skill resource-constrained project
//! scheduling problem (MS-RCPSP) and its solutions.
//!
//! # Domain Mappings
//!
//! | u-rcpsp | Software Project | Manufacturing | Healthcare |
//! |---------|------------------|---------------|------------|
//! | Task | Work Item | Operation | Procedure |
//! | Resource | Developer | Machine/Worker | Doctor |
//! | SkillSet | Competences | Capabilities | Specialisations |
//! | Schedule | Project Plan | Production Plan | OR Schedule |

mod resource;
mod schedule;
mod skill;
mod task;

pub use resource::{Resource, ResourceId};
pub use schedule::{Assignment, Schedule, Violation};
pub use skill::SkillSet;
pub use task::{Task, TaskId};
