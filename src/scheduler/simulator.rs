//! Discrete-event fitness simulator.
//!
//! Decodes a [`ScheduleChromosome`] into a timeline by stepping a clock in
//! integer ticks. Each tick frees finished resources, then walks the pending
//! tasks in `(priority, id)` order and starts every task whose assigned
//! resource is free (and whose predecessors are done, when precedence is
//! enforced). When every resource is busy the clock jumps straight to the
//! next release.
//!
//! # Ticks
//! The clock starts at 0 and is advanced before anything else happens, so
//! the first task starts at tick 1. A task of duration `d` started at `t`
//! holds its resource until `t + d` (exclusive) and finishes at `t + d - 1`.
//!
//! # Complexity
//! O(H * n) for horizon `H` and `n` tasks in the worst case; the jump keeps
//! fully loaded stretches at O(r).

use serde::{Deserialize, Serialize};

use crate::ga::config::FitnessConfig;
use crate::ga::{ProblemInstance, ScheduleChromosome};
use crate::models::{Assignment, Schedule, Task, TaskId, Violation};

/// Penalty totals accumulated during one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PenaltyBreakdown {
    pub idle_resource: f64,
    pub waiting_task: f64,
    pub skill_mismatch: f64,
    pub precedence_violation: f64,
}

impl PenaltyBreakdown {
    /// Sum of all penalty components.
    pub fn total(&self) -> f64 {
        self.idle_resource + self.waiting_task + self.skill_mismatch + self.precedence_violation
    }
}

/// Result of decoding one chromosome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutcome {
    /// Last finish tick (0 for an empty instance).
    pub makespan: u32,
    /// Sum of `duration * cost` over all tasks.
    pub total_cost: f64,
    pub penalties: PenaltyBreakdown,
    /// Weighted objective, lower is better.
    pub fitness: f64,
}

/// Simulates the chromosome and returns its objective values.
pub fn simulate(
    instance: &ProblemInstance,
    chromosome: &ScheduleChromosome,
    config: &FitnessConfig,
) -> SimulationOutcome {
    run(instance, chromosome, config, None)
}

/// Simulates the chromosome and records the concrete timeline.
///
/// Produces exactly the same outcome as [`simulate`].
pub fn replay(
    instance: &ProblemInstance,
    chromosome: &ScheduleChromosome,
    config: &FitnessConfig,
) -> (SimulationOutcome, Schedule) {
    let mut schedule = Schedule::new();
    let outcome = run(instance, chromosome, config, Some(&mut schedule));
    (outcome, schedule)
}

fn is_ready(task: &Task, completed: &[bool], enforce_precedence: bool) -> bool {
    !enforce_precedence || task.predecessors.iter().all(|&p| completed[p])
}

fn run(
    instance: &ProblemInstance,
    chromosome: &ScheduleChromosome,
    config: &FitnessConfig,
    mut timeline: Option<&mut Schedule>,
) -> SimulationOutcome {
    let task_count = instance.task_count();
    let resource_count = instance.resource_count();
    let resource_of = chromosome.resource_of();
    let priority_of = chromosome.priority_of();
    let weights = &config.penalties;
    let enforce = config.enforce_precedence;

    // Exclusive release tick and running task per resource
    let mut busy_until: Vec<Option<u32>> = vec![None; resource_count];
    let mut running: Vec<TaskId> = vec![0; resource_count];
    let mut busy_count = 0usize;

    let mut completed = vec![false; task_count];
    let mut completed_count = 0usize;

    let mut pending: Vec<TaskId> = (0..task_count).collect();
    pending.sort_by_key(|&t| (priority_of[t], t));

    let mut tick: u32 = 0;
    let mut total_cost = 0.0;
    let mut penalties = PenaltyBreakdown::default();

    while completed_count < task_count {
        tick += 1;

        // 1. Releases
        for r in 0..resource_count {
            if let Some(until) = busy_until[r] {
                if until <= tick {
                    let task = running[r];
                    completed[task] = true;
                    completed_count += 1;
                    total_cost += instance.resource(r).cost_of(instance.task(task));
                    busy_until[r] = None;
                    busy_count -= 1;
                }
            }
        }
        if completed_count == task_count {
            break;
        }

        // 2. Fully loaded: jump to the next release
        if busy_count == resource_count {
            let next = busy_until.iter().flatten().copied().min().unwrap_or(tick + 1);
            let skipped = next - tick;
            let waiting = pending
                .iter()
                .filter(|&&t| is_ready(instance.task(t), &completed, enforce))
                .count();
            penalties.waiting_task += weights.waiting_task * waiting as f64 * f64::from(skipped);
            tick = next - 1;
            continue;
        }

        // 3. Walk the pending queue
        let mut i = 0;
        while i < pending.len() {
            let task_id = pending[i];
            let task = instance.task(task_id);

            if !is_ready(task, &completed, enforce) {
                i += 1;
                continue;
            }

            let r = resource_of[task_id];
            if busy_until[r].is_some() {
                penalties.waiting_task += weights.waiting_task;
                i += 1;
                continue;
            }

            if !enforce {
                for &pred in task.predecessors.iter().filter(|&&p| !completed[p]) {
                    penalties.precedence_violation += weights.precedence_violation;
                    if let Some(schedule) = timeline.as_deref_mut() {
                        schedule.add_violation(Violation {
                            tick,
                            task_id,
                            missing_predecessor: pred,
                        });
                    }
                }
            }

            if r != instance.least_skilled_resource(task_id) {
                penalties.skill_mismatch += weights.skill_mismatch;
            }

            busy_until[r] = Some(tick + task.duration);
            running[r] = task_id;
            busy_count += 1;
            if let Some(schedule) = timeline.as_deref_mut() {
                schedule.add_assignment(Assignment::new(task_id, r, tick, task.duration));
            }
            pending.remove(i);
        }

        // 4. Idle resources that could have taken a ready task
        if weights.idle_resource > 0.0 {
            for r in (0..resource_count).filter(|&r| busy_until[r].is_none()) {
                let wanted = pending.iter().any(|&t| {
                    instance.is_eligible(t, r) && is_ready(instance.task(t), &completed, enforce)
                });
                if wanted {
                    penalties.idle_resource += weights.idle_resource;
                }
            }
        }
    }

    let makespan = tick.saturating_sub(1);
    let makespan_term = if config.normalize_makespan && instance.total_duration() > 0 {
        f64::from(makespan) / f64::from(instance.total_duration())
    } else {
        f64::from(makespan)
    };
    let fitness = config.makespan_weight * makespan_term
        + config.cost_weight * total_cost
        + penalties.total();

    SimulationOutcome {
        makespan,
        total_cost,
        penalties,
        fitness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ga::config::PenaltyWeights;
    use crate::models::Resource;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    /// Two resources, three tasks: T1 waits for T0.
    fn scenario() -> (ProblemInstance, ScheduleChromosome) {
        let resources = vec![Resource::new(0, 1.0), Resource::new(1, 2.0)];
        let tasks = vec![
            Task::new(0, 2),
            Task::new(1, 3).with_predecessor(0),
            Task::new(2, 1),
        ];
        let inst = ProblemInstance::new(resources, tasks).unwrap();
        let ch = ScheduleChromosome::from_genes(vec![0, 0, 1], vec![0, 1, 0]);
        (inst, ch)
    }

    fn larger_instance() -> ProblemInstance {
        let resources = vec![
            Resource::new(0, 10.0).with_skill(1, 1),
            Resource::new(1, 15.0).with_skill(1, 2).with_skill(2, 1),
            Resource::new(2, 25.0).with_skill(1, 3).with_skill(2, 2),
        ];
        let tasks = vec![
            Task::new(0, 3).with_requirement(1, 1),
            Task::new(1, 2).with_requirement(2, 1),
            Task::new(2, 4).with_predecessor(0),
            Task::new(3, 1).with_predecessor(0).with_predecessor(1),
            Task::new(4, 5).with_requirement(1, 2),
            Task::new(5, 2).with_requirement(2, 2).with_predecessor(3),
            Task::new(6, 3).with_predecessor(4),
            Task::new(7, 1).with_predecessor(5).with_predecessor(6),
        ];
        ProblemInstance::new(resources, tasks).unwrap()
    }

    #[test]
    fn test_literal_scenario() {
        let (inst, ch) = scenario();
        let out = simulate(&inst, &ch, &FitnessConfig::default());

        assert_eq!(out.makespan, 5);
        assert!((out.total_cost - 7.0).abs() < 1e-12);
        assert!((out.fitness - 5.00007).abs() < 1e-9);
        assert_eq!(out.penalties.total(), 0.0);
    }

    #[test]
    fn test_literal_scenario_timeline() {
        let (inst, ch) = scenario();
        let (out, schedule) = replay(&inst, &ch, &FitnessConfig::default());

        assert_eq!(out, simulate(&inst, &ch, &FitnessConfig::default()));
        let t0 = schedule.assignment_for_task(0).unwrap();
        assert_eq!((t0.start, t0.finish, t0.resource_id), (1, 2, 0));
        let t2 = schedule.assignment_for_task(2).unwrap();
        assert_eq!((t2.start, t2.finish, t2.resource_id), (1, 1, 1));
        let t1 = schedule.assignment_for_task(1).unwrap();
        assert_eq!((t1.start, t1.finish, t1.resource_id), (3, 5, 0));
        assert_eq!(schedule.makespan(), out.makespan);
        assert!(schedule.is_valid());
    }

    #[test]
    fn test_empty_instance() {
        let inst = ProblemInstance::new(vec![Resource::new(0, 1.0)], vec![]).unwrap();
        let ch = ScheduleChromosome::from_genes(vec![], vec![]);
        let out = simulate(&inst, &ch, &FitnessConfig::default());
        assert_eq!(out.makespan, 0);
        assert_eq!(out.fitness, 0.0);
    }

    #[test]
    fn test_completeness_and_no_double_booking() {
        let inst = larger_instance();
        let mut rng = SmallRng::seed_from_u64(42);
        let config = FitnessConfig::default();

        for _ in 0..50 {
            let ch = ScheduleChromosome::random(&inst, &mut rng);
            let (out, schedule) = replay(&inst, &ch, &config);

            assert_eq!(schedule.assignment_count(), inst.task_count());
            for task in inst.tasks() {
                let a = schedule.assignment_for_task(task.id).unwrap();
                assert_eq!(a.resource_id, ch.resource_of()[task.id]);
                assert_eq!(a.duration(), task.duration);
                // Enforced precedence: every predecessor finished earlier
                for &p in &task.predecessors {
                    assert!(schedule.assignment_for_task(p).unwrap().finish < a.start);
                }
            }
            for r in 0..inst.resource_count() {
                let mut slots = schedule.assignments_for_resource(r);
                slots.sort_by_key(|a| a.start);
                for w in slots.windows(2) {
                    assert!(w[0].finish < w[1].start);
                }
            }
            assert_eq!(schedule.makespan(), out.makespan);
        }
    }

    #[test]
    fn test_deterministic() {
        let inst = larger_instance();
        let mut rng = SmallRng::seed_from_u64(9);
        let config = FitnessConfig::default().with_penalties(PenaltyWeights {
            idle_resource: 0.1,
            waiting_task: 0.2,
            skill_mismatch: 0.3,
            precedence_violation: 0.4,
        });
        let ch = ScheduleChromosome::random(&inst, &mut rng);
        let a = simulate(&inst, &ch, &config);
        let b = simulate(&inst, &ch, &config);
        assert_eq!(a.fitness.to_bits(), b.fitness.to_bits());
    }

    #[test]
    fn test_soft_precedence_records_violations() {
        let (inst, ch) = scenario();
        let config = FitnessConfig::default().with_enforced_precedence(false);
        let (out, schedule) = replay(&inst, &ch, &config);

        // T1 (priority 1) still waits for resource 0, so nothing is violated
        assert!(schedule.is_valid());

        // Put T1 on the free resource: it starts at tick 1 before T0 completes
        let eager = ScheduleChromosome::from_genes(vec![0, 1, 1], vec![0, 0, 1]);
        let (eager_out, eager_schedule) = replay(&inst, &eager, &config);
        assert_eq!(eager_schedule.violations.len(), 1);
        let v = &eager_schedule.violations[0];
        assert_eq!((v.tick, v.task_id, v.missing_predecessor), (1, 1, 0));
        assert!((eager_out.penalties.precedence_violation - 0.3).abs() < 1e-12);
        assert_eq!(out.penalties.precedence_violation, 0.0);
        assert_eq!(eager_out.makespan, 4);
    }

    #[test]
    fn test_skill_mismatch_penalty() {
        let resources = vec![
            Resource::new(0, 1.0).with_skill(1, 1),
            Resource::new(1, 1.0).with_skill(1, 5),
        ];
        let tasks = vec![Task::new(0, 1).with_requirement(1, 1)];
        let inst = ProblemInstance::new(resources, tasks).unwrap();
        let config = FitnessConfig::default().with_penalties(PenaltyWeights {
            skill_mismatch: 2.0,
            ..PenaltyWeights::default()
        });

        let fit = simulate(&inst, &ScheduleChromosome::from_genes(vec![0], vec![0]), &config);
        let over = simulate(&inst, &ScheduleChromosome::from_genes(vec![1], vec![0]), &config);
        assert_eq!(fit.penalties.skill_mismatch, 0.0);
        assert_eq!(over.penalties.skill_mismatch, 2.0);
    }

    #[test]
    fn test_waiting_and_idle_penalties() {
        // Both tasks on resource 0; resource 1 idles although eligible
        let resources = vec![Resource::new(0, 1.0), Resource::new(1, 1.0)];
        let tasks = vec![Task::new(0, 2), Task::new(1, 2)];
        let inst = ProblemInstance::new(resources, tasks).unwrap();
        let ch = ScheduleChromosome::from_genes(vec![0, 0], vec![0, 1]);
        let config = FitnessConfig::default().with_penalties(PenaltyWeights {
            idle_resource: 1.0,
            waiting_task: 1.0,
            ..PenaltyWeights::default()
        });

        let out = simulate(&inst, &ch, &config);
        assert_eq!(out.makespan, 4);
        // T1 waits at ticks 1 and 2
        assert_eq!(out.penalties.waiting_task, 2.0);
        // Resource 1 idles with T1 ready at ticks 1 and 2
        assert_eq!(out.penalties.idle_resource, 2.0);
    }

    #[test]
    fn test_fast_forward_matches_stepping_penalties() {
        // Single resource: every tick after a start is fully loaded
        let inst = ProblemInstance::new(
            vec![Resource::new(0, 1.0)],
            vec![Task::new(0, 4), Task::new(1, 3)],
        )
        .unwrap();
        let ch = ScheduleChromosome::from_genes(vec![0, 0], vec![0, 1]);
        let config = FitnessConfig::default().with_penalties(PenaltyWeights {
            waiting_task: 1.0,
            ..PenaltyWeights::default()
        });

        let out = simulate(&inst, &ch, &config);
        assert_eq!(out.makespan, 7);
        // T1 waits during ticks 1..=4
        assert_eq!(out.penalties.waiting_task, 4.0);
    }

    #[test]
    fn test_normalized_makespan() {
        let (inst, ch) = scenario();
        let config = FitnessConfig::default()
            .with_weights(1.0, 0.0)
            .with_normalized_makespan(true);
        let out = simulate(&inst, &ch, &config);
        assert!((out.fitness - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalized_makespan_divides_by_total_duration() {
        // Everything on one resource: makespan and fitness scale with the task sum
        let (inst, _) = scenario();
        let serial = ScheduleChromosome::from_genes(vec![0, 0, 0], vec![0, 1, 2]);
        let config = FitnessConfig::default()
            .with_weights(1.0, 0.0)
            .with_normalized_makespan(true);
        let out = simulate(&inst, &serial, &config);

        let total = f64::from(inst.total_duration());
        assert_eq!(inst.total_duration(), 6);
        assert!((out.fitness - f64::from(out.makespan) / total).abs() < 1e-12);
        assert!((out.fitness - f64::from(out.makespan + 1) / total).abs() > 1e-3);
    }
}
