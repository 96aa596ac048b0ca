//! Projectiles: ballistic travel, lifetime and wall ricochet
//!
//! Velocity is a per-frame displacement, not a rate, so projectile travel is
//! tied to frame count. Lifetimes (enemy shots) still run on frame delta.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::Rect;
use crate::consts::*;

/// Projectile element. Secondary on-hit effects are applied by the combat resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectileKind {
    #[default]
    Fire,
    /// Slows, then freezes an already slowed target
    Ice,
    /// Damage over time
    Poison,
    /// Hard-hitting, limited range
    Arrow,
}

impl ProjectileKind {
    pub const ALL: [ProjectileKind; 4] = [
        ProjectileKind::Fire,
        ProjectileKind::Ice,
        ProjectileKind::Poison,
        ProjectileKind::Arrow,
    ];

    /// Multiplier on the shooter's base damage
    pub fn damage_multiplier(self) -> f32 {
        match self {
            ProjectileKind::Fire => 1.0,
            ProjectileKind::Ice => 0.8,
            ProjectileKind::Poison => 0.6,
            ProjectileKind::Arrow => 1.4,
        }
    }

    /// Next kind in the weapon cycle
    pub fn next(self) -> ProjectileKind {
        match self {
            ProjectileKind::Fire => ProjectileKind::Ice,
            ProjectileKind::Ice => ProjectileKind::Poison,
            ProjectileKind::Poison => ProjectileKind::Arrow,
            ProjectileKind::Arrow => ProjectileKind::Fire,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProjectileKind::Fire => "Fire",
            ProjectileKind::Ice => "Ice",
            ProjectileKind::Poison => "Poison",
            ProjectileKind::Arrow => "Arrow",
        }
    }
}

/// Who fired a projectile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    Player,
    Enemy,
}

/// Max travel for arrows: half the play area's shorter side
pub fn arrow_max_distance() -> f32 {
    SCREEN_WIDTH.min(SCREEN_HEIGHT) / 2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub size: Vec2,
    /// Displacement per frame
    pub vel: Vec2,
    pub damage: f32,
    pub kind: ProjectileKind,
    pub owner: Owner,
    pub can_ricochet: bool,
    pub ricochets_left: u32,
    pub has_ricocheted: bool,
    /// Arrow range limit
    pub max_distance: Option<f32>,
    pub traveled: f32,
    /// Enemy shot lifespan (ms)
    pub lifespan_ms: Option<f32>,
    pub age_ms: f32,
    /// Expired; swept by the owning collection
    pub spent: bool,
}

impl Projectile {
    fn centered(center: Vec2, vel: Vec2, damage: f32, kind: ProjectileKind, owner: Owner) -> Self {
        let size = Vec2::splat(PROJECTILE_SIZE);
        Self {
            pos: center - size * 0.5,
            size,
            vel,
            damage,
            kind,
            owner,
            can_ricochet: false,
            ricochets_left: 0,
            has_ricocheted: false,
            max_distance: None,
            traveled: 0.0,
            lifespan_ms: None,
            age_ms: 0.0,
            spent: false,
        }
    }

    /// Player projectile leaving `center` along `direction` (normalized by caller)
    pub fn player_shot(
        center: Vec2,
        direction: Vec2,
        base_damage: f32,
        kind: ProjectileKind,
        ricochets: u32,
    ) -> Self {
        let mut p = Self::centered(
            center,
            direction * PLAYER_PROJECTILE_SPEED,
            base_damage * kind.damage_multiplier(),
            kind,
            Owner::Player,
        );
        p.can_ricochet = ricochets > 0;
        p.ricochets_left = ricochets;
        if kind == ProjectileKind::Arrow {
            p.max_distance = Some(arrow_max_distance());
        }
        p
    }

    /// Enemy projectile aimed along `direction`, expiring after `lifespan_ms`
    pub fn enemy_shot(center: Vec2, direction: Vec2, damage: f32, lifespan_ms: f32) -> Self {
        let mut p = Self::centered(
            center,
            direction * ENEMY_PROJECTILE_SPEED,
            damage,
            ProjectileKind::Fire,
            Owner::Enemy,
        );
        p.lifespan_ms = Some(lifespan_ms);
        p
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Advance one frame
    pub fn update(&mut self, dt_ms: f32) {
        if self.spent {
            return;
        }

        self.pos += self.vel;

        if let Some(max) = self.max_distance {
            self.traveled += self.vel.length();
            if self.traveled > max {
                self.spent = true;
                return;
            }
        }

        if let Some(lifespan) = self.lifespan_ms {
            self.age_ms += dt_ms;
            if self.age_ms >= lifespan {
                self.spent = true;
                return;
            }
        }

        if self.can_ricochet {
            self.ricochet();
        }
    }

    /// Reflect off each boundary crossed while ricochets remain. One velocity
    /// component flips per crossing and the position is clamped to that edge.
    fn ricochet(&mut self) {
        let max_x = SCREEN_WIDTH - self.size.x;
        let max_y = SCREEN_HEIGHT - self.size.y;

        if self.ricochets_left > 0 && (self.pos.x < 0.0 || self.pos.x > max_x) {
            if self.pos.x < 0.0 {
                self.pos.x = 0.0;
                self.vel.x = self.vel.x.abs();
            } else {
                self.pos.x = max_x;
                self.vel.x = -self.vel.x.abs();
            }
            self.consume_ricochet();
        }

        if self.ricochets_left > 0 && (self.pos.y < 0.0 || self.pos.y > max_y) {
            if self.pos.y < 0.0 {
                self.pos.y = 0.0;
                self.vel.y = self.vel.y.abs();
            } else {
                self.pos.y = max_y;
                self.vel.y = -self.vel.y.abs();
            }
            self.consume_ricochet();
        }
    }

    fn consume_ricochet(&mut self) {
        self.ricochets_left -= 1;
        self.has_ricocheted = true;
        if self.ricochets_left == 0 {
            self.can_ricochet = false;
        }
    }

    /// Outside the play area on any side
    pub fn is_out_of_bounds(&self) -> bool {
        self.pos.x < 0.0
            || self.pos.y < 0.0
            || self.pos.x + self.size.x > SCREEN_WIDTH
            || self.pos.y + self.size.y > SCREEN_HEIGHT
    }

    pub fn is_finite(&self) -> bool {
        self.pos.is_finite() && self.vel.is_finite() && self.damage.is_finite()
    }

    /// Should the owning collection drop this projectile
    pub fn should_remove(&self) -> bool {
        self.spent || self.is_out_of_bounds()
    }
}
