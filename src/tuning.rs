//! Data-driven game balance
//!
//! Every knob has a default, so a tuning file only needs the values it
//! overrides. Geometry that the rest of the code treats as fixed lives in
//! [`crate::consts`] instead.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while loading or validating a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Balance values for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === World ===
    /// Screens across
    pub world_width: u32,
    /// Screens down
    pub world_height: u32,

    // === Player ===
    pub player_max_health: f32,
    pub player_damage: f32,
    /// Movement per frame at full input
    pub player_speed: f32,
    pub player_fire_cooldown_ms: f32,
    /// XP needed for the first level up
    pub xp_first_level: u32,
    /// Threshold multiplier applied after each level
    pub xp_growth: f32,
    /// Max health gained per level
    pub level_health_bonus: f32,
    /// Delay between staggered multishot projectiles
    pub multishot_stagger_ms: f32,

    // === Special (area blast) ===
    pub special_cooldown_ms: f32,
    pub special_radius: f32,
    pub special_damage: f32,
    pub special_duration_ms: f32,

    // === Enemies ===
    pub enemy_base_health: f32,
    pub enemy_base_damage: f32,
    pub enemy_base_speed: f32,
    pub enemy_base_xp: u32,
    /// Additional fraction of base health per zone tier
    pub zone_health_scale: f32,
    pub zone_damage_scale: f32,
    pub zone_speed_scale: f32,
    /// Inclusive (min, max) enemy count per zone tier
    pub zone_enemy_counts: [[u32; 2]; 4],
    pub max_enemies_per_screen: u32,
    pub detection_range: f32,
    pub wanderer_shoot_range: f32,
    pub wanderer_shoot_cooldown_ms: f32,
    pub pursuer_shoot_cooldown_ms: f32,
    pub turret_shoot_cooldown_ms: f32,
    pub collision_cooldown_ms: f32,
    pub enemy_projectile_lifespan_ms: f32,

    // === Status effects ===
    pub freeze_duration_ms: f32,
    pub slow_factor: f32,
    pub slow_duration_ms: f32,
    pub poison_damage_per_tick: f32,
    pub poison_duration_ms: f32,

    // === Rewards ===
    pub loot_drop_chance: f32,
    pub chest_spawn_chance: f32,
    pub chest_spawn_delay_ms: f32,
    pub chest_open_ms: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            world_width: 10,
            world_height: 10,

            player_max_health: 100.0,
            player_damage: 10.0,
            player_speed: 4.0,
            player_fire_cooldown_ms: 300.0,
            xp_first_level: 50,
            xp_growth: 1.5,
            level_health_bonus: 10.0,
            multishot_stagger_ms: 100.0,

            special_cooldown_ms: 5000.0,
            special_radius: 120.0,
            special_damage: 30.0,
            special_duration_ms: 400.0,

            enemy_base_health: 30.0,
            enemy_base_damage: 10.0,
            enemy_base_speed: 2.0,
            enemy_base_xp: 10,
            zone_health_scale: 0.5,
            zone_damage_scale: 0.3,
            zone_speed_scale: 0.15,
            zone_enemy_counts: [[2, 3], [3, 5], [4, 6], [5, 8]],
            max_enemies_per_screen: 8,
            detection_range: 300.0,
            wanderer_shoot_range: 200.0,
            wanderer_shoot_cooldown_ms: 2000.0,
            pursuer_shoot_cooldown_ms: 3000.0,
            turret_shoot_cooldown_ms: 3500.0,
            collision_cooldown_ms: 1000.0,
            enemy_projectile_lifespan_ms: 3000.0,

            freeze_duration_ms: 2000.0,
            slow_factor: 0.5,
            slow_duration_ms: 3000.0,
            poison_damage_per_tick: 2.0,
            poison_duration_ms: 4000.0,

            loot_drop_chance: 0.3,
            chest_spawn_chance: 0.5,
            chest_spawn_delay_ms: 1000.0,
            chest_open_ms: 600.0,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Read, parse and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.world_width == 0 || self.world_height == 0 {
            return Err(invalid("world_width", "world must be at least 1x1 screens"));
        }

        let chances = [
            ("loot_drop_chance", self.loot_drop_chance),
            ("chest_spawn_chance", self.chest_spawn_chance),
            ("slow_factor", self.slow_factor),
        ];
        for (field, value) in chances {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{value} is outside [0, 1]")));
            }
        }

        let positives = [
            ("player_max_health", self.player_max_health),
            ("player_speed", self.player_speed),
            ("enemy_base_health", self.enemy_base_health),
            ("enemy_base_speed", self.enemy_base_speed),
            ("xp_growth", self.xp_growth),
            ("freeze_duration_ms", self.freeze_duration_ms),
            ("slow_duration_ms", self.slow_duration_ms),
            ("poison_duration_ms", self.poison_duration_ms),
            ("enemy_projectile_lifespan_ms", self.enemy_projectile_lifespan_ms),
            ("special_radius", self.special_radius),
        ];
        for (field, value) in positives {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(field, format!("{value} must be positive")));
            }
        }

        if self.xp_first_level == 0 {
            return Err(invalid("xp_first_level", "must be at least 1"));
        }

        for (tier, [min, max]) in self.zone_enemy_counts.iter().enumerate() {
            if min > max {
                return Err(invalid(
                    "zone_enemy_counts",
                    format!("tier {tier}: min {min} exceeds max {max}"),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
    TuningError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "world_width": 4, "loot_drop_chance": 1.0 }"#)
            .expect("valid tuning");
        assert_eq!(tuning.world_width, 4);
        assert_eq!(tuning.loot_drop_chance, 1.0);
        assert_eq!(tuning.world_height, Tuning::default().world_height);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let err = Tuning::from_json(r#"{ "chest_spawn_chance": 1.5 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "chest_spawn_chance", .. }));
    }

    #[test]
    fn test_rejects_empty_world() {
        let err = Tuning::from_json(r#"{ "world_height": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::Invalid { .. }));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_reversed_counts() {
        let err = Tuning::from_json(r#"{ "zone_enemy_counts": [[3, 1], [3, 5], [4, 6], [5, 8]] }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid { field: "zone_enemy_counts", .. }));
    }
}
