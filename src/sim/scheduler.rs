//! Deferred tasks keyed to the simulation clock
//!
//! Tasks are never cancelled. Each one is re-checked against current state
//! when it comes due, so a stale task (its target died, was frozen, or the
//! player left the screen) simply does nothing.

use glam::{IVec2, Vec2};
use serde::{Deserialize, Serialize};

use super::projectile::ProjectileKind;
use super::state::EntityId;

/// Work to perform at a later simulation time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScheduledTask {
    /// End a slow on `target` unless it has since been frozen
    RestoreSpeed { target: EntityId },
    /// Drop a reward chest on `screen` if the player is still there
    SpawnChest { screen: IVec2 },
    /// Fire one staggered multishot projectile
    BurstShot {
        screen: IVec2,
        direction: Vec2,
        kind: ProjectileKind,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    due_ms: f64,
    seq: u64,
    task: ScheduledTask,
}

/// Pending tasks, drained in (due time, insertion order)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<Entry>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` to run once the clock reaches `due_ms`
    pub fn schedule(&mut self, due_ms: f64, task: ScheduledTask) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.push(Entry { due_ms, seq, task });
    }

    /// Remove and return every task due at or before `now_ms`
    pub fn drain_due(&mut self, now_ms: f64) -> Vec<ScheduledTask> {
        let mut due: Vec<Entry> = Vec::new();
        let mut i = 0;
        while i < self.entries.len() {
            if self.entries[i].due_ms <= now_ms {
                due.push(self.entries.swap_remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| {
            a.due_ms
                .partial_cmp(&b.due_ms)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.seq.cmp(&b.seq))
        });
        due.into_iter().map(|e| e.task).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count pending tasks matching a predicate
    pub fn count_where(&self, pred: impl Fn(&ScheduledTask) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.task)).count()
    }
}
