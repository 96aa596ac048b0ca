//! Status effects on enemies: freeze, slow and poison
//!
//! Speed is never scaled by more than one modifier. Precedence, highest
//! first: freeze (speed 0), collision cooldown (half speed), slow (factor),
//! then base speed. See [`effective_speed`].

use std::collections::HashMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::enemy::{Behavior, Enemy};
use super::scheduler::{ScheduledTask, Scheduler};
use super::state::EntityId;

/// Speed multiplier while an enemy recovers from bumping the player
pub const COLLISION_SLOWDOWN: f32 = 0.5;
/// Poison deals its per-tick damage once per this many ms of sim time
pub const POISON_TICK_MS: f64 = 1000.0;

/// Status sub-state carried by every enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffects {
    pub frozen: bool,
    pub slowed: bool,
    /// Multiplier applied to original speed while slowed
    pub slow_factor: f32,
    pub poisoned: bool,
    /// Damage per poison tick
    pub poison_damage: f32,
    /// Absolute sim time the poison ends
    pub poison_end_ms: f64,
    pub last_poison_tick_ms: f64,
}

impl Default for StatusEffects {
    fn default() -> Self {
        Self {
            frozen: false,
            slowed: false,
            slow_factor: 1.0,
            poisoned: false,
            poison_damage: 0.0,
            poison_end_ms: 0.0,
            last_poison_tick_ms: 0.0,
        }
    }
}

/// Read-only flags for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusFlags {
    pub frozen: bool,
    pub slowed: bool,
    pub poisoned: bool,
}

impl StatusEffects {
    pub fn flags(&self) -> StatusFlags {
        StatusFlags {
            frozen: self.frozen,
            slowed: self.slowed,
            poisoned: self.poisoned,
        }
    }
}

/// Freeze expiry per enemy handle.
///
/// Membership is a weak relation: handles whose enemy is gone are skipped
/// and pruned, never dereferenced.
#[derive(Debug, Clone, Default)]
pub struct FreezeTable {
    expiries: HashMap<EntityId, f64>,
}

impl FreezeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, id: EntityId, expires_ms: f64) {
        self.expiries.insert(id, expires_ms);
    }

    pub fn expiry(&self, id: EntityId) -> Option<f64> {
        self.expiries.get(&id).copied()
    }

    pub fn remove(&mut self, id: EntityId) {
        self.expiries.remove(&id);
    }

    /// Remove and return handles whose freeze has run out, in handle order
    pub fn take_expired(&mut self, now_ms: f64) -> Vec<EntityId> {
        let mut expired: Vec<EntityId> = self
            .expiries
            .iter()
            .filter(|&(_, &until)| until <= now_ms)
            .map(|(&id, _)| id)
            .collect();
        expired.sort();
        for id in &expired {
            self.expiries.remove(id);
        }
        expired
    }

    /// Drop entries for handles that no longer resolve
    pub fn retain(&mut self, mut live: impl FnMut(EntityId) -> bool) {
        self.expiries.retain(|&id, _| live(id));
    }

    pub fn clear(&mut self) {
        self.expiries.clear();
    }

    pub fn len(&self) -> usize {
        self.expiries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expiries.is_empty()
    }
}

/// Speed an enemy should move at given its current modifiers
pub fn effective_speed(enemy: &Enemy) -> f32 {
    if enemy.status.frozen {
        0.0
    } else if enemy.collision_cooldown_ms > 0.0 {
        enemy.original_speed * COLLISION_SLOWDOWN
    } else if enemy.status.slowed {
        enemy.original_speed * enemy.status.slow_factor
    } else {
        enemy.original_speed
    }
}

/// Freeze `enemy` until `now + duration`.
///
/// Re-freezing an already frozen enemy moves the expiry to `now + duration`;
/// durations do not add up.
pub fn apply_freeze(enemy: &mut Enemy, duration_ms: f32, now_ms: f64, freezes: &mut FreezeTable) {
    let until = now_ms + duration_ms as f64;
    if enemy.status.frozen {
        freezes.set(enemy.id, until);
        return;
    }

    enemy.status.frozen = true;
    // A freeze supersedes any running slow
    enemy.status.slowed = false;
    enemy.status.slow_factor = 1.0;
    enemy.speed = 0.0;
    enemy.move_direction = 0.0;
    enemy.move_timer_ms = 0.0;
    freezes.set(enemy.id, until);
}

/// Slow `enemy` to `factor` of its original speed and queue the restore
pub fn apply_slow(
    enemy: &mut Enemy,
    factor: f32,
    duration_ms: f32,
    now_ms: f64,
    scheduler: &mut Scheduler,
) {
    enemy.status.slowed = true;
    enemy.status.slow_factor = factor.clamp(0.0, 1.0);
    enemy.refresh_speed();
    scheduler.schedule(
        now_ms + duration_ms as f64,
        ScheduledTask::RestoreSpeed { target: enemy.id },
    );
}

/// Run a queued slow restore. No-op when the enemy froze in the meantime.
pub fn restore_speed(enemy: &mut Enemy) {
    if enemy.status.frozen || !enemy.status.slowed {
        return;
    }
    enemy.status.slowed = false;
    enemy.status.slow_factor = 1.0;
    enemy.refresh_speed();
}

/// Poison `enemy`. Overlapping applications add their per-tick damage and
/// extend, but never shorten, the end time.
pub fn apply_poison(enemy: &mut Enemy, damage_per_tick: f32, duration_ms: f32, now_ms: f64) {
    let end = now_ms + duration_ms as f64;
    let status = &mut enemy.status;
    if status.poisoned {
        status.poison_damage += damage_per_tick;
        status.poison_end_ms = status.poison_end_ms.max(end);
    } else {
        status.poisoned = true;
        status.poison_damage = damage_per_tick;
        status.poison_end_ms = end;
        status.last_poison_tick_ms = now_ms;
    }
}

/// Advance poison against sim time. Deals one tick of damage per elapsed
/// whole second. Returns true if this call killed the enemy.
pub fn tick_poison(enemy: &mut Enemy, now_ms: f64) -> bool {
    if !enemy.status.poisoned || enemy.dead {
        return false;
    }

    let mut killed = false;
    while now_ms - enemy.status.last_poison_tick_ms >= POISON_TICK_MS
        && enemy.status.last_poison_tick_ms + POISON_TICK_MS <= enemy.status.poison_end_ms
    {
        enemy.status.last_poison_tick_ms += POISON_TICK_MS;
        if enemy.apply_poison_damage(enemy.status.poison_damage) {
            killed = true;
            break;
        }
    }

    if killed || now_ms >= enemy.status.poison_end_ms {
        enemy.status.poisoned = false;
        enemy.status.poison_damage = 0.0;
    }
    killed
}

/// End a freeze. Wanderers pick a fresh heading so they don't resume a stale one.
pub fn thaw<R: Rng + ?Sized>(enemy: &mut Enemy, rng: &mut R) {
    if !enemy.status.frozen {
        return;
    }
    enemy.status.frozen = false;
    enemy.refresh_speed();
    if enemy.behavior == Behavior::Wanderer {
        enemy.begin_wander(rng);
    }
}
