//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering,
//! input devices and wall-clock time:
//! - Variable frame delta, clamped per frame
//! - Seeded RNG only
//! - Deferred work keyed to the simulation clock
//! - No rendering or platform dependencies

pub mod area;
pub mod collision;
pub mod combat;
pub mod enemy;
pub mod events;
pub mod loot;
pub mod persistence;
pub mod player;
pub mod projectile;
pub mod scheduler;
pub mod state;
pub mod status;
pub mod tick;
pub mod transition;
pub mod world;

pub use area::AreaEffect;
pub use enemy::{Behavior, Enemy, EnemyContext, generate_roster};
pub use events::GameEvent;
pub use loot::{ChestState, Pickup, Reward, RewardChest};
pub use persistence::{ActorSnapshot, WorldPersistenceStore};
pub use player::Player;
pub use projectile::{Owner, Projectile, ProjectileKind};
pub use scheduler::{ScheduledTask, Scheduler};
pub use state::{EntityId, EntityIds, GamePhase, GameState, SessionStats, SimClock};
pub use status::{FreezeTable, StatusEffects, StatusFlags};
pub use tick::{TickInput, tick};
pub use transition::{Edge, ScreenTransitionManager, TransitionOutcome};
pub use world::{ScreenCell, WorldMap, Zone, screen_key};
