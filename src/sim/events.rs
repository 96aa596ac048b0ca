//! Notifications for the HUD collaborator
//!
//! The simulation only records what happened; queueing and display belong
//! to the host.

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::loot::Reward;
use super::world::Zone;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelUp { level: u32 },
    ZoneEntered { zone: Zone },
    ItemAcquired { reward: Reward },
    ScreenCleared { screen: IVec2 },
    ChestAppeared { screen: IVec2 },
    /// Tried to leave a hard screen with enemies still alive
    TransitionBlocked,
    PlayerDied,
}

impl GameEvent {
    pub fn message(&self) -> String {
        match self {
            GameEvent::LevelUp { level } => format!("Level up! Now level {}", level),
            GameEvent::ZoneEntered { zone } => format!("Entering the {}", zone.name()),
            GameEvent::ItemAcquired { reward } => reward.message().to_string(),
            GameEvent::ScreenCleared { .. } => "Area cleared".to_string(),
            GameEvent::ChestAppeared { .. } => "A chest appeared!".to_string(),
            GameEvent::TransitionBlocked => "Defeat all enemies before leaving!".to_string(),
            GameEvent::PlayerDied => "You have fallen".to_string(),
        }
    }

    /// How long the HUD should show the message (ms)
    pub fn display_ms(&self) -> f32 {
        match self {
            GameEvent::LevelUp { .. } | GameEvent::ZoneEntered { .. } => 3000.0,
            GameEvent::PlayerDied => 5000.0,
            GameEvent::TransitionBlocked => 1500.0,
            GameEvent::ItemAcquired { .. }
            | GameEvent::ScreenCleared { .. }
            | GameEvent::ChestAppeared { .. } => 2000.0,
        }
    }
}
