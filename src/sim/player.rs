//! The player-controlled unit

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::area::AreaEffect;
use super::loot::Reward;
use super::projectile::{Projectile, ProjectileKind};
use crate::Rect;
use crate::consts::*;
use crate::tuning::Tuning;

/// Upper bounds for stacked upgrades
pub const MAX_PLAYER_SPEED: f32 = 8.0;
pub const MAX_MULTISHOT: u32 = 4;
pub const MAX_RICOCHETS: u32 = 3;
pub const MIN_FIRE_COOLDOWN_MS: f32 = 100.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    /// Base damage before the projectile kind multiplier
    pub damage: f32,
    /// Movement per frame
    pub speed: f32,
    pub fire_cooldown_ms: f32,
    pub fire_cooldown_max_ms: f32,
    pub weapon: ProjectileKind,
    /// Extra staggered projectiles per trigger pull
    pub multishot: u32,
    /// Wall bounces granted to new projectiles
    pub ricochets: u32,
    pub xp: u32,
    pub level: u32,
    pub xp_to_next: u32,
    pub invulnerable_ms: f32,
    /// Knockback displacement per frame, decays each frame
    pub knockback: Vec2,
    /// Last non-zero movement direction (unit)
    pub facing: Vec2,
    pub special_cooldown_ms: f32,
    /// Recent positions for the renderer (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Player {
    /// New player centered on the screen
    pub fn new(tuning: &Tuning) -> Self {
        let size = Vec2::splat(PLAYER_SIZE);
        Self {
            pos: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT) * 0.5 - size * 0.5,
            size,
            health: tuning.player_max_health,
            max_health: tuning.player_max_health,
            damage: tuning.player_damage,
            speed: tuning.player_speed,
            fire_cooldown_ms: 0.0,
            fire_cooldown_max_ms: tuning.player_fire_cooldown_ms,
            weapon: ProjectileKind::Fire,
            multishot: 0,
            ricochets: 0,
            xp: 0,
            level: 1,
            xp_to_next: tuning.xp_first_level,
            invulnerable_ms: 0.0,
            knockback: Vec2::ZERO,
            facing: Vec2::X,
            special_cooldown_ms: 0.0,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    /// Apply movement intent (each axis in -1..=1) and knockback, tick timers
    pub fn update(&mut self, movement: Vec2, dt_ms: f32) {
        self.fire_cooldown_ms = (self.fire_cooldown_ms - dt_ms).max(0.0);
        self.invulnerable_ms = (self.invulnerable_ms - dt_ms).max(0.0);
        self.special_cooldown_ms = (self.special_cooldown_ms - dt_ms).max(0.0);

        let intent = if movement.is_finite() {
            movement.clamp(Vec2::NEG_ONE, Vec2::ONE).normalize_or_zero()
        } else {
            Vec2::ZERO
        };
        if intent != Vec2::ZERO {
            self.facing = intent;
        }

        self.pos += intent * self.speed + self.knockback;
        self.knockback *= KNOCKBACK_DECAY;
        if self.knockback.length_squared() < 0.01 {
            self.knockback = Vec2::ZERO;
        }

        self.record_trail();
    }

    /// Pull the trigger. Returns the shot direction if the weapon was ready.
    /// `aim` is a target point; without one the player fires where it faces.
    pub fn try_fire(&mut self, aim: Option<Vec2>) -> Option<Vec2> {
        if self.fire_cooldown_ms > 0.0 || !self.is_alive() {
            return None;
        }
        let direction = aim
            .map(|target| (target - self.center()).normalize_or_zero())
            .filter(|d| *d != Vec2::ZERO && d.is_finite())
            .unwrap_or(self.facing);

        self.fire_cooldown_ms = self.fire_cooldown_max_ms;
        Some(direction)
    }

    /// Projectile of `kind` leaving the player's center along `direction`
    pub fn shot(&self, direction: Vec2, kind: ProjectileKind) -> Projectile {
        Projectile::player_shot(self.center(), direction, self.damage, kind, self.ricochets)
    }

    /// Cast the area blast if it is off cooldown
    pub fn try_special(&mut self, tuning: &Tuning) -> Option<AreaEffect> {
        if self.special_cooldown_ms > 0.0 || !self.is_alive() {
            return None;
        }
        self.special_cooldown_ms = tuning.special_cooldown_ms;
        Some(AreaEffect::new(
            self.center(),
            tuning.special_radius,
            tuning.special_damage,
            tuning.special_duration_ms,
        ))
    }

    /// Take a hit. Ignored while invulnerable. Returns true if damage landed.
    pub fn take_damage(&mut self, amount: f32, knockback: Vec2) -> bool {
        if !self.is_alive() || self.invulnerable_ms > 0.0 || !amount.is_finite() {
            return false;
        }
        self.health = (self.health - amount.max(0.0)).max(0.0);
        self.invulnerable_ms = PLAYER_INVULNERABLE_MS;
        self.apply_knockback(knockback);
        true
    }

    /// Replace current knockback. Non-finite vectors are skipped.
    pub fn apply_knockback(&mut self, knockback: Vec2) -> bool {
        if !knockback.is_finite() {
            log::warn!("Skipping non-finite knockback {:?}", knockback);
            return false;
        }
        self.knockback = knockback;
        true
    }

    /// Add XP, returning the number of levels gained
    pub fn gain_xp(&mut self, amount: u32, tuning: &Tuning) -> u32 {
        self.xp += amount;
        let mut levels = 0;
        while self.xp >= self.xp_to_next {
            self.xp -= self.xp_to_next;
            self.level += 1;
            levels += 1;
            self.xp_to_next = ((self.xp_to_next as f32 * tuning.xp_growth).ceil() as u32).max(1);
            self.max_health += tuning.level_health_bonus;
            self.health = self.max_health;
        }
        if levels > 0 {
            log::info!("Player reached level {}", self.level);
        }
        levels
    }

    pub fn cycle_weapon(&mut self) {
        self.weapon = self.weapon.next();
    }

    pub fn apply_reward(&mut self, reward: Reward) {
        match reward {
            Reward::Speed => self.speed = (self.speed + 0.25).min(MAX_PLAYER_SPEED),
            Reward::Damage => self.damage += 2.0,
            Reward::Health => self.health = (self.health + 25.0).min(self.max_health),
            Reward::MaxHealth => {
                self.max_health += 20.0;
                self.health += 20.0;
            }
            Reward::FireRate => {
                self.fire_cooldown_max_ms =
                    (self.fire_cooldown_max_ms * 0.85).max(MIN_FIRE_COOLDOWN_MS)
            }
            Reward::Multishot => self.multishot = (self.multishot + 1).min(MAX_MULTISHOT),
            Reward::Ricochet => self.ricochets = (self.ricochets + 1).min(MAX_RICOCHETS),
        }
    }

    /// Record current position to trail (call each frame)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.center());
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }

    /// Clear trail (on screen change)
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player() -> Player {
        Player::new(&Tuning::default())
    }

    #[test]
    fn test_diagonal_movement_normalized() {
        let mut p = player();
        let start = p.pos;
        p.update(Vec2::new(1.0, 1.0), 16.0);
        assert!((p.pos.distance(start) - p.speed).abs() < 1e-4);
        assert_eq!(p.trail.len(), 1);
    }

    #[test]
    fn test_invulnerability_gates_damage() {
        let mut p = player();
        assert!(p.take_damage(10.0, Vec2::ZERO));
        assert!(!p.take_damage(10.0, Vec2::ZERO));
        assert_eq!(p.health, p.max_health - 10.0);

        p.update(Vec2::ZERO, PLAYER_INVULNERABLE_MS);
        assert!(p.take_damage(10.0, Vec2::ZERO));
    }

    #[test]
    fn test_health_clamps_at_zero() {
        let mut p = player();
        p.take_damage(1000.0, Vec2::ZERO);
        assert_eq!(p.health, 0.0);
        assert!(!p.is_alive());
    }

    #[test]
    fn test_non_finite_knockback_skipped() {
        let mut p = player();
        p.knockback = Vec2::new(1.0, 0.0);
        assert!(!p.apply_knockback(Vec2::new(f32::NAN, 0.0)));
        assert_eq!(p.knockback, Vec2::new(1.0, 0.0));

        assert!(p.take_damage(5.0, Vec2::new(f32::INFINITY, 1.0)));
        assert!(p.pos.is_finite());
        assert!(p.knockback.is_finite());
    }

    #[test]
    fn test_knockback_decays() {
        let mut p = player();
        p.apply_knockback(Vec2::new(10.0, 0.0));
        let start = p.pos.x;
        for _ in 0..60 {
            p.update(Vec2::ZERO, 16.0);
        }
        assert_eq!(p.knockback, Vec2::ZERO);
        assert!(p.pos.x > start + 10.0);
    }

    #[test]
    fn test_fire_cooldown_and_aim() {
        let mut p = player();
        let target = p.center() + Vec2::new(0.0, -50.0);
        let dir = p.try_fire(Some(target));
        assert_eq!(dir, Some(Vec2::new(0.0, -1.0)));
        assert_eq!(p.try_fire(Some(target)), None);

        p.update(Vec2::ZERO, p.fire_cooldown_max_ms);
        // Aim at own center falls back to facing
        assert_eq!(p.try_fire(Some(p.center())), Some(Vec2::X));
    }

    #[test]
    fn test_level_up() {
        let tuning = Tuning::default();
        let mut p = player();
        p.health = 10.0;
        let levels = p.gain_xp(tuning.xp_first_level + 5, &tuning);
        assert_eq!(levels, 1);
        assert_eq!(p.level, 2);
        assert_eq!(p.xp, 5);
        assert_eq!(p.max_health, tuning.player_max_health + tuning.level_health_bonus);
        assert_eq!(p.health, p.max_health);
        assert_eq!(p.xp_to_next, (tuning.xp_first_level as f32 * tuning.xp_growth).ceil() as u32);
    }

    #[test]
    fn test_rewards_capped() {
        let mut p = player();
        for _ in 0..10 {
            p.apply_reward(Reward::Multishot);
            p.apply_reward(Reward::Ricochet);
            p.apply_reward(Reward::FireRate);
        }
        assert_eq!(p.multishot, MAX_MULTISHOT);
        assert_eq!(p.ricochets, MAX_RICOCHETS);
        assert_eq!(p.fire_cooldown_max_ms, MIN_FIRE_COOLDOWN_MS);
    }

    #[test]
    fn test_special_cooldown() {
        let tuning = Tuning::default();
        let mut p = player();
        let blast = p.try_special(&tuning);
        assert!(blast.is_some());
        assert!(p.try_special(&tuning).is_none());
    }

    #[test]
    fn test_trail_bounded() {
        let mut p = player();
        for _ in 0..50 {
            p.update(Vec2::X, 16.0);
        }
        assert_eq!(p.trail.len(), TRAIL_LENGTH);
        p.clear_trail();
        assert!(p.trail.is_empty());
    }
}
