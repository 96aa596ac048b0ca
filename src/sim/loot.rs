//! Rewards: loot drops from enemies and reward chests for cleared screens

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// A reward applied to the player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reward {
    Speed,
    Damage,
    Health,
    MaxHealth,
    FireRate,
    Multishot,
    Ricochet,
}

impl Reward {
    /// Pool enemies draw from when they drop loot
    pub const DROP_POOL: [Reward; 3] = [Reward::Speed, Reward::Damage, Reward::Health];

    /// Pool a chest draws from
    pub const CHEST_POOL: [Reward; 7] = [
        Reward::Speed,
        Reward::Damage,
        Reward::Health,
        Reward::MaxHealth,
        Reward::FireRate,
        Reward::Multishot,
        Reward::Ricochet,
    ];

    /// Uniform choice from the drop pool
    pub fn random_drop<R: Rng + ?Sized>(rng: &mut R) -> Reward {
        *Self::DROP_POOL.choose(rng).unwrap_or(&Reward::Health)
    }

    /// Uniform choice from the chest pool
    pub fn random_chest<R: Rng + ?Sized>(rng: &mut R) -> Reward {
        *Self::CHEST_POOL.choose(rng).unwrap_or(&Reward::MaxHealth)
    }

    pub fn message(self) -> &'static str {
        match self {
            Reward::Speed => "Speed up!",
            Reward::Damage => "Damage up!",
            Reward::Health => "Health restored",
            Reward::MaxHealth => "Max health up!",
            Reward::FireRate => "Fire rate up!",
            Reward::Multishot => "Extra shot!",
            Reward::Ricochet => "Ricochet shots!",
        }
    }
}

/// A dropped reward waiting to be picked up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub pos: Vec2,
    pub size: Vec2,
    pub reward: Reward,
}

impl Pickup {
    /// Pickup centered on `center`
    pub fn new(center: Vec2, reward: Reward) -> Self {
        let size = Vec2::splat(PICKUP_SIZE);
        Self {
            pos: center - size * 0.5,
            size,
            reward,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }
}

/// Chest lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ChestState {
    Closed,
    /// Opening animation running; `remaining_ms` until collected
    Opening { remaining_ms: f32 },
    Collected,
}

/// A reward container. The reward is chosen when the chest appears and is
/// handed out exactly once, on the transition to `Collected`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardChest {
    pub pos: Vec2,
    pub size: Vec2,
    pub reward: Reward,
    pub state: ChestState,
}

impl RewardChest {
    pub fn new(center: Vec2, reward: Reward) -> Self {
        let size = Vec2::splat(CHEST_SIZE);
        Self {
            pos: center - size * 0.5,
            size,
            reward,
            state: ChestState::Closed,
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Player touched the chest. Only a closed chest starts opening.
    pub fn touch(&mut self, open_ms: f32) {
        if self.state == ChestState::Closed {
            self.state = ChestState::Opening {
                remaining_ms: open_ms,
            };
        }
    }

    /// Advance the opening animation. Returns the reward on the frame the
    /// chest becomes collected, `None` otherwise.
    pub fn update(&mut self, dt_ms: f32) -> Option<Reward> {
        if let ChestState::Opening { remaining_ms } = self.state {
            let remaining_ms = remaining_ms - dt_ms;
            if remaining_ms <= 0.0 {
                self.state = ChestState::Collected;
                return Some(self.reward);
            }
            self.state = ChestState::Opening { remaining_ms };
        }
        None
    }

    pub fn is_collected(&self) -> bool {
        self.state == ChestState::Collected
    }
}
