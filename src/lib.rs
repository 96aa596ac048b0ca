//! Rift Warden - a top-down, screen-by-screen combat simulation
//!
//! Core modules:
//! - `sim`: Simulation (actors, projectiles, status effects, collisions, world persistence)
//! - `tuning`: Data-driven game balance
//! - `variation`: Jittered numeric ranges and color blending
//!
//! Rendering, input devices and menus live outside this crate. The host feeds
//! a [`sim::TickInput`] per frame and reads entity state back for drawing.

pub mod sim;
pub mod tuning;
pub mod variation;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Play-area (one screen) dimensions in pixels
    pub const SCREEN_WIDTH: f32 = 800.0;
    pub const SCREEN_HEIGHT: f32 = 600.0;

    /// Largest frame delta the clock will accept (ms), guards against tab-switch stalls
    pub const MAX_FRAME_DELTA_MS: f32 = 100.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 30.0;
    pub const PLAYER_INVULNERABLE_MS: f32 = 1000.0;
    /// Per-frame decay applied to knockback velocity
    pub const KNOCKBACK_DECAY: f32 = 0.85;
    /// Contact knockback magnitude (pixels per frame)
    pub const CONTACT_KNOCKBACK: f32 = 12.0;
    /// Projectile hit knockback magnitude (pixels per frame)
    pub const PROJECTILE_KNOCKBACK: f32 = 5.0;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 28.0;
    /// Debounce window after a wall bounce (ms)
    pub const WALL_BOUNCE_COOLDOWN_MS: f32 = 500.0;
    /// Keep freshly generated enemies away from the player's entry point
    pub const SPAWN_CLEARANCE: f32 = 150.0;

    /// Projectile defaults
    pub const PROJECTILE_SIZE: f32 = 8.0;
    /// Player projectile displacement per frame
    pub const PLAYER_PROJECTILE_SPEED: f32 = 8.0;
    /// Enemy projectile displacement per frame
    pub const ENEMY_PROJECTILE_SPEED: f32 = 4.0;

    /// Pickups and chests
    pub const PICKUP_SIZE: f32 = 16.0;
    pub const CHEST_SIZE: f32 = 32.0;

    /// Trail points kept for the player
    pub const TRAIL_LENGTH: usize = 12;
}

/// Axis-aligned rectangle described by its top-left corner and size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }
}

/// Unit vector for an angle in radians
#[inline]
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Angle in radians of the vector from `from` to `to`
#[inline]
pub fn angle_between(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    d.y.atan2(d.x)
}

/// Play-area bounds for a body of the given size: (min, max) top-left corner
#[inline]
pub fn play_bounds(size: Vec2) -> (Vec2, Vec2) {
    (
        Vec2::ZERO,
        Vec2::new(consts::SCREEN_WIDTH - size.x, consts::SCREEN_HEIGHT - size.y),
    )
}
