//! Enemy actors: movement behavior, shooting and the damage/death lifecycle
//!
//! Behavior is a closed set of variants. Per-variant logic is dispatched by
//! matching on [`Behavior`] in `compute_movement` and `evaluate_shoot`.

use std::f32::consts::{FRAC_PI_4, PI, TAU};

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::persistence::ActorSnapshot;
use super::projectile::Projectile;
use super::state::{EntityId, EntityIds};
use super::status::{self, StatusEffects, StatusFlags};
use super::world::Zone;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::variation::{self, Rgb};
use crate::{Rect, angle_between, direction_from_angle, play_bounds};

/// How long a Wanderer holds one heading (ms)
pub const WANDER_INTERVAL_MS: (f32, f32) = (1000.0, 2000.0);
/// How long a Wanderer idles in place (ms)
pub const IDLE_INTERVAL_MS: (f32, f32) = (2000.0, 4000.0);
/// How long an undetecting Pursuer holds one heading (ms)
pub const PURSUER_INTERVAL_MS: (f32, f32) = (2500.0, 4000.0);
/// Chance a Wanderer idles instead of picking a new heading
pub const IDLE_CHANCE: f64 = 0.5;
/// Hit flash shown after direct damage (ms)
pub const HIT_FLASH_MS: f32 = 100.0;

/// Enemy movement/shooting variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Behavior {
    /// Never moves; fires as a turret in the tougher zones
    Stationary,
    /// Random headings with idle pauses
    Wanderer,
    /// Chases the player once in detection range
    Pursuer,
}

impl Behavior {
    /// Multiplier applied to speed when stepping
    pub fn movement_multiplier(self) -> f32 {
        match self {
            Behavior::Pursuer => 1.2,
            Behavior::Wanderer | Behavior::Stationary => 0.7,
        }
    }

    /// Whether this variant fires at all in `zone`
    pub fn shoots_in(self, zone: Zone) -> bool {
        match self {
            Behavior::Stationary => zone.tier() >= 2,
            Behavior::Wanderer | Behavior::Pursuer => true,
        }
    }

    pub fn shoot_cooldown_max(self, tuning: &Tuning) -> f32 {
        match self {
            Behavior::Stationary => tuning.turret_shoot_cooldown_ms,
            Behavior::Wanderer => tuning.wanderer_shoot_cooldown_ms,
            Behavior::Pursuer => tuning.pursuer_shoot_cooldown_ms,
        }
    }

    fn base_color(self) -> Rgb {
        match self {
            Behavior::Stationary => Rgb::new(150, 150, 160),
            Behavior::Wanderer => Rgb::new(220, 180, 60),
            Behavior::Pursuer => Rgb::new(220, 60, 60),
        }
    }

    fn xp_bonus(self) -> u32 {
        match self {
            Behavior::Stationary => 0,
            Behavior::Wanderer => 2,
            Behavior::Pursuer => 5,
        }
    }

    /// Weighted pick; harder zones field more pursuers
    pub fn pick<R: Rng + ?Sized>(zone: Zone, rng: &mut R) -> Behavior {
        let (stationary, wanderer) = match zone.tier() {
            0 => (40, 50),
            1 => (25, 45),
            2 => (20, 35),
            _ => (15, 30),
        };
        let roll = rng.random_range(0..100);
        if roll < stationary {
            Behavior::Stationary
        } else if roll < stationary + wanderer {
            Behavior::Wanderer
        } else {
            Behavior::Pursuer
        }
    }
}

/// Facts an enemy needs from the rest of the frame
#[derive(Debug, Clone, Copy)]
pub struct EnemyContext<'a> {
    pub player_center: Vec2,
    pub tuning: &'a Tuning,
}

/// An AI-controlled enemy
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub pos: Vec2,
    pub size: Vec2,
    pub health: f32,
    pub max_health: f32,
    pub damage: f32,
    pub xp_value: u32,
    pub behavior: Behavior,
    pub zone: Zone,
    pub color: Rgb,

    /// Current speed, always derived from `original_speed` and modifiers
    pub speed: f32,
    pub original_speed: f32,
    /// Heading in radians
    pub move_direction: f32,
    pub move_timer_ms: f32,
    pub move_interval_ms: f32,
    /// Holding position (Wanderer idle branch)
    pub idle: bool,
    pub detection_range: f32,

    pub shoot_cooldown_ms: f32,
    pub shoot_cooldown_max_ms: f32,
    pub collision_cooldown_ms: f32,
    pub collision_cooldown_max_ms: f32,
    pub wall_cooldown_ms: f32,
    pub hit_flash_ms: f32,

    pub status: StatusEffects,
    pub dead: bool,
    pub visible: bool,
}

impl Enemy {
    /// Create a fresh enemy with stats scaled by zone tier
    pub fn spawn<R: Rng + ?Sized>(
        id: EntityId,
        behavior: Behavior,
        zone: Zone,
        pos: Vec2,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let tier = zone.tier() as f32;
        let max_health = variation::jitter_pct(
            rng,
            tuning.enemy_base_health * (1.0 + tuning.zone_health_scale * tier),
            0.1,
        )
        .round()
        .max(1.0);
        let damage = tuning.enemy_base_damage * (1.0 + tuning.zone_damage_scale * tier);
        let xp_value = tuning.enemy_base_xp * (zone.tier() as u32 + 1) + behavior.xp_bonus();
        let color = behavior
            .base_color()
            .blend(zone.tint(), 0.35)
            .vary(rng, 12);

        let snapshot = ActorSnapshot {
            x: pos.x,
            y: pos.y,
            health: max_health,
            max_health,
            damage,
            xp_value,
            behavior,
            zone,
            width: ENEMY_SIZE,
            height: ENEMY_SIZE,
            color,
        };
        Self::from_snapshot(id, &snapshot, tuning, rng)
    }

    /// Rebuild an enemy from a saved snapshot. Movement and cooldown state
    /// start fresh; the snapshot's stats carry over unchanged.
    pub fn from_snapshot<R: Rng + ?Sized>(
        id: EntityId,
        snapshot: &ActorSnapshot,
        tuning: &Tuning,
        rng: &mut R,
    ) -> Self {
        let behavior = snapshot.behavior;
        let zone = snapshot.zone;
        let tier = zone.tier() as f32;
        let speed = variation::jitter_pct(
            rng,
            tuning.enemy_base_speed * (1.0 + tuning.zone_speed_scale * tier),
            0.15,
        );
        let shoot_cooldown_max_ms = behavior.shoot_cooldown_max(tuning);

        let mut enemy = Self {
            id,
            pos: Vec2::new(snapshot.x, snapshot.y),
            size: Vec2::new(snapshot.width, snapshot.height),
            health: snapshot.health.clamp(0.0, snapshot.max_health),
            max_health: snapshot.max_health,
            damage: snapshot.damage,
            xp_value: snapshot.xp_value,
            behavior,
            zone,
            color: snapshot.color,
            speed,
            original_speed: speed,
            move_direction: variation::random_angle(rng),
            move_timer_ms: 0.0,
            move_interval_ms: 0.0,
            idle: false,
            detection_range: tuning.detection_range * (1.0 + 0.1 * tier),
            // Stagger the first volley so a fresh roster doesn't fire in unison
            shoot_cooldown_ms: variation::in_range(rng, 0.5, 1.0) * shoot_cooldown_max_ms,
            shoot_cooldown_max_ms,
            collision_cooldown_ms: 0.0,
            collision_cooldown_max_ms: tuning.collision_cooldown_ms,
            wall_cooldown_ms: 0.0,
            hit_flash_ms: 0.0,
            status: StatusEffects::default(),
            dead: false,
            visible: true,
        };
        enemy.move_interval_ms = match behavior {
            Behavior::Pursuer => variation::in_range(rng, PURSUER_INTERVAL_MS.0, PURSUER_INTERVAL_MS.1),
            _ => variation::in_range(rng, WANDER_INTERVAL_MS.0, WANDER_INTERVAL_MS.1),
        };
        enemy
    }

    /// Persistable view of this enemy
    pub fn snapshot(&self) -> ActorSnapshot {
        ActorSnapshot {
            x: self.pos.x,
            y: self.pos.y,
            health: self.health,
            max_health: self.max_health,
            damage: self.damage,
            xp_value: self.xp_value,
            behavior: self.behavior,
            zone: self.zone,
            width: self.size.x,
            height: self.size.y,
            color: self.color,
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

    /// Still taking part in the simulation
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.dead && self.visible
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            (self.health / self.max_health).clamp(0.0, 1.0)
        }
    }

    pub fn status_flags(&self) -> StatusFlags {
        self.status.flags()
    }

    /// Recompute `speed` from `original_speed` and active modifiers
    pub fn refresh_speed(&mut self) {
        self.speed = status::effective_speed(self);
    }

    /// Advance timers, move and maybe fire. Returns a projectile when the
    /// enemy shoots this frame.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt_ms: f32,
        ctx: &EnemyContext,
        rng: &mut R,
    ) -> Option<Projectile> {
        if !self.is_active() {
            return None;
        }
        if !self.pos.is_finite() {
            log::warn!("Enemy {} has non-finite position, dropping it", self.id);
            self.dead = true;
            self.visible = false;
            return None;
        }

        self.shoot_cooldown_ms = (self.shoot_cooldown_ms - dt_ms).max(0.0);
        self.collision_cooldown_ms = (self.collision_cooldown_ms - dt_ms).max(0.0);
        self.wall_cooldown_ms = (self.wall_cooldown_ms - dt_ms).max(0.0);
        self.hit_flash_ms = (self.hit_flash_ms - dt_ms).max(0.0);
        self.refresh_speed();

        if self.status.frozen {
            return None;
        }

        self.compute_movement(dt_ms, ctx.player_center, rng);
        self.evaluate_shoot(ctx)
    }

    fn compute_movement<R: Rng + ?Sized>(&mut self, dt_ms: f32, player_center: Vec2, rng: &mut R) {
        match self.behavior {
            Behavior::Stationary => return,
            Behavior::Wanderer => {
                self.move_timer_ms += dt_ms;
                if self.move_timer_ms >= self.move_interval_ms {
                    if rng.random_bool(IDLE_CHANCE) {
                        self.begin_idle(rng);
                    } else {
                        self.begin_wander(rng);
                    }
                }
            }
            Behavior::Pursuer => {
                let center = self.center();
                if center.distance(player_center) < self.detection_range {
                    self.move_direction = angle_between(center, player_center);
                    self.move_timer_ms = 0.0;
                    self.idle = false;
                } else {
                    self.move_timer_ms += dt_ms;
                    if self.move_timer_ms >= self.move_interval_ms {
                        self.move_timer_ms = 0.0;
                        self.move_direction = variation::random_angle(rng);
                        self.move_interval_ms =
                            variation::in_range(rng, PURSUER_INTERVAL_MS.0, PURSUER_INTERVAL_MS.1);
                    }
                }
            }
        }

        if !self.idle {
            self.step();
            self.bounce_off_walls(rng);
        }
    }

    /// Pick a new random heading for a normal wander interval
    pub fn begin_wander<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.idle = false;
        self.move_timer_ms = 0.0;
        self.move_direction = variation::random_angle(rng);
        self.move_interval_ms = variation::in_range(rng, WANDER_INTERVAL_MS.0, WANDER_INTERVAL_MS.1);
    }

    /// Hold position for an extended interval
    pub fn begin_idle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.idle = true;
        self.move_timer_ms = 0.0;
        self.move_interval_ms = variation::in_range(rng, IDLE_INTERVAL_MS.0, IDLE_INTERVAL_MS.1);
    }

    fn step(&mut self) {
        if self.behavior == Behavior::Stationary {
            return;
        }
        let velocity = direction_from_angle(self.move_direction)
            * self.speed
            * self.behavior.movement_multiplier();
        self.pos += velocity;
    }

    /// Clamp to the play area; on contact turn around with some scatter,
    /// debounced so an enemy pinned on a wall doesn't flip every frame
    fn bounce_off_walls<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let (min, max) = play_bounds(self.size);
        let clamped = self.pos.clamp(min, max);
        if clamped == self.pos {
            return;
        }
        self.pos = clamped;

        if self.wall_cooldown_ms > 0.0 {
            return;
        }
        let scatter = rng.random_range(-FRAC_PI_4..=FRAC_PI_4);
        self.move_direction = (self.move_direction + PI + scatter).rem_euclid(TAU);
        self.wall_cooldown_ms = WALL_BOUNCE_COOLDOWN_MS;
        self.step();
        self.pos = self.pos.clamp(min, max);
    }

    fn evaluate_shoot(&mut self, ctx: &EnemyContext) -> Option<Projectile> {
        if !self.behavior.shoots_in(self.zone) || self.shoot_cooldown_ms > 0.0 {
            return None;
        }

        let range = match self.behavior {
            Behavior::Wanderer => ctx.tuning.wanderer_shoot_range,
            Behavior::Pursuer | Behavior::Stationary => self.detection_range,
        };
        let center = self.center();
        if center.distance(ctx.player_center) > range {
            return None;
        }

        let direction = (ctx.player_center - center).normalize_or_zero();
        if direction == Vec2::ZERO {
            return None;
        }

        self.shoot_cooldown_ms = self.shoot_cooldown_max_ms;
        Some(Projectile::enemy_shot(
            center,
            direction,
            self.damage,
            ctx.tuning.enemy_projectile_lifespan_ms,
        ))
    }

    /// Direct damage. Returns true only on the call that kills the enemy.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.dead {
            return false;
        }
        self.hit_flash_ms = HIT_FLASH_MS;
        self.lose_health(amount)
    }

    /// Poison damage; skips the hit flash. Returns true if this killed the enemy.
    pub(crate) fn apply_poison_damage(&mut self, amount: f32) -> bool {
        self.lose_health(amount)
    }

    fn lose_health(&mut self, amount: f32) -> bool {
        if self.dead || !amount.is_finite() {
            return false;
        }
        self.health -= amount.max(0.0);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.dead = true;
            return true;
        }
        false
    }

    /// Start the post-contact slowdown window
    pub fn enter_collision_cooldown(&mut self) {
        self.collision_cooldown_ms = self.collision_cooldown_max_ms;
        self.refresh_speed();
    }
}

/// Build a fresh roster for a screen in `zone`, keeping spawns clear of `avoid`
pub fn generate_roster<R: Rng + ?Sized>(
    zone: Zone,
    avoid: Vec2,
    tuning: &Tuning,
    ids: &mut EntityIds,
    rng: &mut R,
) -> Vec<Enemy> {
    let [min, max] = tuning.zone_enemy_counts[zone.tier() as usize];
    let count = variation::int_in_range(rng, min, max).min(tuning.max_enemies_per_screen);
    let size = Vec2::splat(ENEMY_SIZE);
    let (lo, hi) = play_bounds(size);

    (0..count)
        .map(|_| {
            let mut pos = Vec2::new(
                variation::in_range(rng, lo.x, hi.x),
                variation::in_range(rng, lo.y, hi.y),
            );
            for _ in 0..20 {
                if (pos + size * 0.5).distance(avoid) > SPAWN_CLEARANCE {
                    break;
                }
                pos = Vec2::new(
                    variation::in_range(rng, lo.x, hi.x),
                    variation::in_range(rng, lo.y, hi.y),
                );
            }
            let behavior = Behavior::pick(zone, rng);
            Enemy::spawn(ids.next_id(), behavior, zone, pos, tuning, rng)
        })
        .collect()
}
