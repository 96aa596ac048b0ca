//! Session state and core simulation types
//!
//! One `GameState` owns everything for a play session: the world grid, the
//! persistence store, the active entity sets and the seeded RNG.

use std::fmt;

use glam::{IVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::area::AreaEffect;
use super::enemy::Enemy;
use super::events::GameEvent;
use super::loot::{Pickup, Reward, RewardChest};
use super::persistence::WorldPersistenceStore;
use super::player::Player;
use super::projectile::Projectile;
use super::scheduler::{ScheduledTask, Scheduler};
use super::status::FreezeTable;
use super::transition::ScreenTransitionManager;
use super::world::{WorldMap, Zone};
use crate::consts::MAX_FRAME_DELTA_MS;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Player health hit zero; a new session is required
    GameOver,
}

/// Stable handle for an enemy, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh entity handles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Variable-delta simulation clock
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimClock {
    /// Accumulated sim time (ms)
    pub now_ms: f64,
    pub frame: u64,
}

impl SimClock {
    /// Advance by a frame delta, clamped to `[0, MAX_FRAME_DELTA_MS]`.
    /// Returns the delta actually applied.
    pub fn advance(&mut self, dt_ms: f32) -> f32 {
        let dt = if dt_ms.is_finite() {
            dt_ms.clamp(0.0, MAX_FRAME_DELTA_MS)
        } else {
            0.0
        };
        self.now_ms += dt as f64;
        self.frame += 1;
        dt
    }
}

/// Running totals for the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    pub kills: u32,
    pub loot_rolls: u32,
    pub loot_dropped: u32,
    pub chests_spawned: u32,
    pub chests_opened: u32,
    pub screens_entered: u32,
    pub xp_earned: u32,
}

/// Complete session state
pub struct GameState {
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub clock: SimClock,
    pub phase: GamePhase,
    pub world: WorldMap,
    pub store: WorldPersistenceStore,
    pub screens: ScreenTransitionManager,
    pub player: Player,
    /// Enemies on the current screen
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub area_effects: Vec<AreaEffect>,
    pub pickups: Vec<Pickup>,
    pub chests: Vec<RewardChest>,
    pub freezes: FreezeTable,
    pub scheduler: Scheduler,
    pub stats: SessionStats,
    pub ids: EntityIds,
    events: Vec<GameEvent>,
}

impl GameState {
    /// New session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// New session with the given balance values
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let world = WorldMap::generate(tuning.world_width, tuning.world_height, &mut rng);
        let start = world.center();
        let start_zone = world.zone_at(start);
        let player = Player::new(&tuning);

        let mut state = Self {
            seed,
            rng,
            tuning,
            clock: SimClock::default(),
            phase: GamePhase::Playing,
            world,
            store: WorldPersistenceStore::new(),
            screens: ScreenTransitionManager::new(start, start_zone),
            player,
            enemies: Vec::new(),
            projectiles: Vec::new(),
            area_effects: Vec::new(),
            pickups: Vec::new(),
            chests: Vec::new(),
            freezes: FreezeTable::new(),
            scheduler: Scheduler::new(),
            stats: SessionStats::default(),
            ids: EntityIds::default(),
            events: Vec::new(),
        };

        state.resolve_screen_enemies();
        log::info!(
            "Session {} started on screen {} ({}) with {} enemies",
            seed,
            start,
            start_zone.name(),
            state.enemies.len()
        );
        state
    }

    pub fn current_screen(&self) -> IVec2 {
        self.screens.current
    }

    pub fn current_zone(&self) -> Zone {
        self.world.zone_at(self.screens.current)
    }

    /// Enemies still taking part in the simulation
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.is_active()).count()
    }

    pub fn is_screen_cleared(&self, screen: IVec2) -> bool {
        self.store.is_cleared(screen)
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        log::debug!("Event: {}", event.message());
        self.events.push(event);
    }

    /// Pending notifications, oldest first
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Hand pending notifications to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Consequences of an enemy dying: XP, a loot roll, and screen-clear
    /// bookkeeping if it was the last one. Call once per death; a batch of
    /// deaths in one pass clears the screen once.
    pub fn on_enemy_killed(&mut self, id: EntityId) {
        let Some(enemy) = self.enemy(id) else {
            return;
        };
        let xp = enemy.xp_value;
        let center = enemy.center();
        self.freezes.remove(id);
        self.stats.kills += 1;
        log::debug!("Enemy {} killed at {:?}", id, center);

        self.stats.xp_earned += xp;
        let levels = self.player.gain_xp(xp, &self.tuning);
        if levels > 0 {
            let level = self.player.level;
            self.push_event(GameEvent::LevelUp { level });
        }

        self.stats.loot_rolls += 1;
        if self.rng.random::<f32>() < self.tuning.loot_drop_chance {
            let reward = Reward::random_drop(&mut self.rng);
            self.pickups.push(Pickup::new(center, reward));
            self.stats.loot_dropped += 1;
        }

        if self.live_enemy_count() == 0 && !self.store.is_cleared(self.current_screen()) {
            self.on_screen_cleared();
        }
    }

    fn on_screen_cleared(&mut self) {
        let screen = self.current_screen();
        self.store.mark_cleared(screen);
        log::info!("Screen {} cleared", screen);
        self.push_event(GameEvent::ScreenCleared { screen });

        if self.rng.random::<f32>() < self.tuning.chest_spawn_chance {
            let due = self.clock.now_ms + self.tuning.chest_spawn_delay_ms as f64;
            self.scheduler.schedule(due, ScheduledTask::SpawnChest { screen });
            log::debug!("Chest scheduled for screen {} at {:.0}ms", screen, due);
        }
    }

    /// Put a chest in the middle of the play area
    pub(crate) fn spawn_chest(&mut self, screen: IVec2) {
        let reward = Reward::random_chest(&mut self.rng);
        let center = Vec2::new(crate::consts::SCREEN_WIDTH, crate::consts::SCREEN_HEIGHT) * 0.5;
        self.chests.push(RewardChest::new(center, reward));
        self.stats.chests_spawned += 1;
        self.push_event(GameEvent::ChestAppeared { screen });
    }
}
