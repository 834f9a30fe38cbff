//! Process failure models.

use crate::{check, Error};
use adhoc_simulator::{Clock, Failure, NodeId};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use std::collections::VecDeque;
use tracing::debug;

/// Crash-stop failures scheduled at construction.
///
/// Every node crashes with probability `crash_probability` (until `maximum_crash_number`
/// nodes have been selected) at a step drawn uniformly from
/// `[transient_steps, total_simulation_steps)`. Crash steps are then shuffled across all
/// nodes, so any node may be the one that crashes. Crashed nodes never recover.
pub struct Crash {
    /// `(step, node)` ordered by step.
    schedule: VecDeque<(i64, NodeId)>,
}

impl Crash {
    pub fn new(
        nodes: usize,
        crash_probability: f64,
        maximum_crash_number: usize,
        total_simulation_steps: u64,
        transient_steps: u64,
        mut rng: StdRng,
    ) -> Result<Self, Error> {
        check("crash probability", "in [0, 1]", crash_probability, |v| {
            (0.0..=1.0).contains(&v)
        })?;
        check(
            "transient steps",
            "<= total simulation steps",
            transient_steps as f64,
            |v| v <= total_simulation_steps as f64,
        )?;

        let mut steps: Vec<Option<i64>> = vec![None; nodes];
        if transient_steps < total_simulation_steps {
            let mut crashes = 0;
            for step in steps.iter_mut() {
                if crashes == maximum_crash_number {
                    break;
                }
                if rng.gen::<f64>() < crash_probability {
                    *step = Some(rng.gen_range(transient_steps..total_simulation_steps) as i64);
                    crashes += 1;
                }
            }
        }
        steps.shuffle(&mut rng);

        let mut schedule: Vec<_> = steps
            .into_iter()
            .enumerate()
            .filter_map(|(node, step)| step.map(|step| (step, node)))
            .collect();
        schedule.sort_unstable();
        debug!(crashes = schedule.len(), ?schedule, "scheduled crashes");
        Ok(Self {
            schedule: schedule.into(),
        })
    }

    /// Crashes that have not happened yet, as `(step, node)` ordered by step.
    pub fn pending(&self) -> impl Iterator<Item = &(i64, NodeId)> {
        self.schedule.iter()
    }
}

impl Failure for Crash {
    fn node_failure(&mut self, clock: &Clock, failed: &mut [bool]) -> Vec<NodeId> {
        let mut crashed = Vec::new();
        while let Some((step, node)) = self.schedule.front().copied() {
            if step > clock.step() {
                break;
            }
            self.schedule.pop_front();
            debug!(node, "node crashed");
            failed[node] = true;
            crashed.push(node);
        }
        crashed
    }
}
