//! Area effects: one-shot radial damage that lingers for display

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::within_radius;

/// A radial blast. Damage lands once; the effect stays around until its
/// duration runs out so the renderer can show it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaEffect {
    pub center: Vec2,
    pub radius: f32,
    pub damage: f32,
    pub remaining_ms: f32,
    pub damage_applied: bool,
}

impl AreaEffect {
    pub fn new(center: Vec2, radius: f32, damage: f32, duration_ms: f32) -> Self {
        Self {
            center,
            radius,
            damage,
            remaining_ms: duration_ms,
            damage_applied: false,
        }
    }

    /// Strictly inside the radius
    pub fn contains(&self, point: Vec2) -> bool {
        within_radius(self.center, self.radius, point)
    }

    pub fn update(&mut self, dt_ms: f32) {
        self.remaining_ms -= dt_ms;
    }

    /// Keep while visible, and always until damage has landed
    pub fn is_alive(&self) -> bool {
        self.remaining_ms > 0.0 || !self.damage_applied
    }
}
