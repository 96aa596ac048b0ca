//! Collision resolution between the player, enemies and everything they throw
//!
//! Runs once per frame after every actor has moved. Deaths found here are
//! handed to [`GameState::on_enemy_killed`] after each pass so the loot and
//! screen-clear consequences run exactly once per enemy.

use super::collision::{knockback, overlaps};
use super::enemy::Enemy;
use super::events::GameEvent;
use super::projectile::{Owner, ProjectileKind};
use super::scheduler::Scheduler;
use super::state::{EntityId, GameState};
use super::status::{self, FreezeTable};
use crate::consts::{CONTACT_KNOCKBACK, PROJECTILE_KNOCKBACK};
use crate::tuning::Tuning;

/// Run every collision pass for the frame
pub fn resolve(state: &mut GameState) {
    resolve_player_projectiles(state);
    resolve_area_effects(state);
    resolve_enemy_projectiles(state);
    resolve_contact(state);
    resolve_pickups(state);
    resolve_chests(state);
}

/// Player projectiles against enemies. Each projectile hits at most the
/// first overlapping enemy and is spent by the hit.
pub fn resolve_player_projectiles(state: &mut GameState) {
    let now = state.clock.now_ms;
    let mut killed = Vec::new();

    for projectile in state
        .projectiles
        .iter_mut()
        .filter(|p| p.owner == Owner::Player && !p.spent)
    {
        let rect = projectile.rect();
        let Some(enemy) = state
            .enemies
            .iter_mut()
            .find(|e| e.is_active() && overlaps(&rect, &e.rect()))
        else {
            continue;
        };

        projectile.spent = true;
        if enemy.take_damage(projectile.damage) {
            killed.push(enemy.id);
            continue;
        }
        apply_on_hit(
            projectile.kind,
            enemy,
            &state.tuning,
            now,
            &mut state.freezes,
            &mut state.scheduler,
        );
    }

    settle_kills(state, killed);
}

/// Secondary effect of a projectile kind landing on a living enemy
pub fn apply_on_hit(
    kind: ProjectileKind,
    enemy: &mut Enemy,
    tuning: &Tuning,
    now_ms: f64,
    freezes: &mut FreezeTable,
    scheduler: &mut Scheduler,
) {
    match kind {
        ProjectileKind::Ice => {
            // A second chill escalates to a freeze instead of re-slowing
            if enemy.status.slowed || enemy.status.frozen {
                status::apply_freeze(enemy, tuning.freeze_duration_ms, now_ms, freezes);
            } else {
                status::apply_slow(
                    enemy,
                    tuning.slow_factor,
                    tuning.slow_duration_ms,
                    now_ms,
                    scheduler,
                );
            }
        }
        ProjectileKind::Poison => status::apply_poison(
            enemy,
            tuning.poison_damage_per_tick,
            tuning.poison_duration_ms,
            now_ms,
        ),
        ProjectileKind::Fire | ProjectileKind::Arrow => {}
    }
}

/// Area blasts damage every enemy strictly inside their radius, once per blast
pub fn resolve_area_effects(state: &mut GameState) {
    let mut killed = Vec::new();

    for effect in state.area_effects.iter_mut().filter(|a| !a.damage_applied) {
        effect.damage_applied = true;
        for enemy in state.enemies.iter_mut().filter(|e| e.is_active()) {
            if effect.contains(enemy.center()) && enemy.take_damage(effect.damage) {
                killed.push(enemy.id);
            }
        }
    }

    settle_kills(state, killed);
}

/// Enemy projectiles against the player. A touching projectile is spent even
/// when the player's invulnerability absorbs the damage.
pub fn resolve_enemy_projectiles(state: &mut GameState) {
    let player_rect = state.player.rect();
    for projectile in state
        .projectiles
        .iter_mut()
        .filter(|p| p.owner == Owner::Enemy && !p.spent)
    {
        if !overlaps(&projectile.rect(), &player_rect) {
            continue;
        }
        projectile.spent = true;
        let push = projectile.vel.normalize_or_zero() * PROJECTILE_KNOCKBACK;
        state.player.take_damage(projectile.damage, push);
    }
}

/// Body contact between the player and enemies. The enemy's slowdown starts
/// whether or not the player was able to take the hit.
pub fn resolve_contact(state: &mut GameState) {
    let player_rect = state.player.rect();
    let player_center = state.player.center();

    for enemy in state.enemies.iter_mut().filter(|e| e.is_active()) {
        if !overlaps(&enemy.rect(), &player_rect) {
            continue;
        }
        let push = knockback(enemy.center(), player_center, CONTACT_KNOCKBACK);
        if state.player.take_damage(enemy.damage, push) {
            log::debug!("Player hit by enemy {} for {:.1}", enemy.id, enemy.damage);
        }
        enemy.enter_collision_cooldown();
    }
}

/// Loot pickups the player walked over
pub fn resolve_pickups(state: &mut GameState) {
    let player_rect = state.player.rect();
    let (taken, kept) = std::mem::take(&mut state.pickups)
        .into_iter()
        .partition::<Vec<_>, _>(|p| overlaps(&p.rect(), &player_rect));
    state.pickups = kept;

    for pickup in taken {
        state.player.apply_reward(pickup.reward);
        state.push_event(GameEvent::ItemAcquired {
            reward: pickup.reward,
        });
    }
}

/// Touching a closed chest starts it opening
pub fn resolve_chests(state: &mut GameState) {
    let player_rect = state.player.rect();
    let open_ms = state.tuning.chest_open_ms;
    for chest in state.chests.iter_mut() {
        if overlaps(&chest.rect(), &player_rect) {
            chest.touch(open_ms);
        }
    }
}

fn settle_kills(state: &mut GameState, killed: Vec<EntityId>) {
    for id in killed {
        state.on_enemy_killed(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::area::AreaEffect;
    use crate::sim::projectile::Projectile;
    use glam::Vec2;
    use crate::sim::enemy::Behavior;
    use crate::sim::loot::{Pickup, Reward, RewardChest};
    use crate::sim::scheduler::ScheduledTask;
    use crate::sim::world::Zone;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    /// Session with a hand-placed roster of stationary enemies far from the player
    fn arena(positions: &[Vec2]) -> GameState {
        let mut state = GameState::new(11);
        let mut rng = Pcg32::seed_from_u64(5);
        state.enemies = positions
            .iter()
            .map(|pos| {
                Enemy::spawn(
                    state.ids.next_id(),
                    Behavior::Stationary,
                    Zone::Meadow,
                    *pos,
                    &state.tuning,
                    &mut rng,
                )
            })
            .collect();
        state.player.pos = Vec2::new(20.0, 20.0);
        state
    }

    fn shot_at(target: Vec2, kind: ProjectileKind, damage: f32) -> Projectile {
        let mut p = Projectile::player_shot(target, Vec2::X, damage, kind, 0);
        p.damage = damage;
        p
    }

    #[test]
    fn test_projectile_hits_first_enemy_only() {
        let mut state = arena(&[Vec2::new(300.0, 300.0), Vec2::new(300.0, 300.0)]);
        let before: Vec<f32> = state.enemies.iter().map(|e| e.health).collect();
        let center = state.enemies[0].center();
        state.projectiles.push(shot_at(center, ProjectileKind::Fire, 5.0));

        resolve_player_projectiles(&mut state);

        assert_eq!(state.enemies[0].health, before[0] - 5.0);
        assert_eq!(state.enemies[1].health, before[1]);
        assert!(state.projectiles[0].spent);
    }

    #[test]
    fn test_spent_projectile_does_not_hit_again() {
        let mut state = arena(&[Vec2::new(300.0, 300.0)]);
        let center = state.enemies[0].center();
        state.projectiles.push(shot_at(center, ProjectileKind::Fire, 5.0));
        resolve_player_projectiles(&mut state);
        let after_first = state.enemies[0].health;
        resolve_player_projectiles(&mut state);
        assert_eq!(state.enemies[0].health, after_first);
    }

    #[test]
    fn test_ice_slows_then_freezes() {
        let mut state = arena(&[Vec2::new(300.0, 300.0)]);
        let center = state.enemies[0].center();
        let id = state.enemies[0].id;

        state.projectiles.push(shot_at(center, ProjectileKind::Ice, 0.1));
        resolve_player_projectiles(&mut state);
        assert!(state.enemies[0].status.slowed);
        assert!(!state.enemies[0].status.frozen);
        assert_eq!(
            state
                .scheduler
                .count_where(|t| *t == ScheduledTask::RestoreSpeed { target: id }),
            1
        );

        state.projectiles.push(shot_at(center, ProjectileKind::Ice, 0.1));
        resolve_player_projectiles(&mut state);
        assert!(state.enemies[0].status.frozen);
        assert!(!state.enemies[0].status.slowed);
        assert!(state.freezes.expiry(id).is_some());
        // No second restore was queued
        assert_eq!(state.scheduler.len(), 1);
    }

    #[test]
    fn test_poison_hit_applies_status() {
        let mut state = arena(&[Vec2::new(300.0, 300.0)]);
        let center = state.enemies[0].center();
        state.projectiles.push(shot_at(center, ProjectileKind::Poison, 0.1));
        resolve_player_projectiles(&mut state);
        assert!(state.enemies[0].status.poisoned);
        assert_eq!(
            state.enemies[0].status.poison_damage,
            state.tuning.poison_damage_per_tick
        );
    }

    #[test]
    fn test_killing_hit_skips_secondary_effect() {
        let mut state = arena(&[Vec2::new(300.0, 300.0), Vec2::new(500.0, 100.0)]);
        let center = state.enemies[0].center();
        state.projectiles.push(shot_at(center, ProjectileKind::Ice, 1e6));
        resolve_player_projectiles(&mut state);
        assert!(state.enemies[0].dead);
        assert!(state.scheduler.is_empty());
        assert_eq!(state.stats.kills, 1);
    }

    #[test]
    fn test_area_damage_applied_exactly_once() {
        let mut state = arena(&[Vec2::new(300.0, 300.0)]);
        state.enemies[0].health = 1000.0;
        state.enemies[0].max_health = 1000.0;
        let center = state.enemies[0].center();
        state
            .area_effects
            .push(AreaEffect::new(center, 50.0, 10.0, 400.0));

        for _ in 0..30 {
            resolve_area_effects(&mut state);
            for effect in &mut state.area_effects {
                effect.update(16.0);
            }
        }
        assert_eq!(state.enemies[0].health, 990.0);
    }

    #[test]
    fn test_area_radius_is_strict() {
        let mut state = arena(&[Vec2::new(300.0, 300.0)]);
        let before = state.enemies[0].health;
        let center = state.enemies[0].center();
        state
            .area_effects
            .push(AreaEffect::new(center + Vec2::new(50.0, 0.0), 50.0, 10.0, 400.0));
        resolve_area_effects(&mut state);
        assert_eq!(state.enemies[0].health, before);
        assert!(state.area_effects[0].damage_applied);
    }

    fn cleared_events(state: &GameState) -> usize {
        state
            .events()
            .iter()
            .filter(|e| matches!(e, GameEvent::ScreenCleared { .. }))
            .count()
    }

    fn chest_tasks(state: &GameState) -> usize {
        state
            .scheduler
            .count_where(|t| matches!(t, ScheduledTask::SpawnChest { .. }))
    }

    #[test]
    fn test_blast_killing_whole_roster_clears_once() {
        let mut state = arena(&[Vec2::new(300.0, 300.0), Vec2::new(320.0, 300.0)]);
        state.tuning.chest_spawn_chance = 1.0;
        let center = state.enemies[0].center();
        state
            .area_effects
            .push(AreaEffect::new(center, 100.0, 1e6, 400.0));

        resolve_area_effects(&mut state);

        assert_eq!(state.stats.kills, 2);
        assert!(state.is_screen_cleared(state.current_screen()));
        assert_eq!(cleared_events(&state), 1);
        assert_eq!(chest_tasks(&state), 1);
    }

    #[test]
    fn test_volley_killing_whole_roster_clears_once() {
        let mut state = arena(&[Vec2::new(300.0, 300.0), Vec2::new(500.0, 100.0)]);
        state.tuning.chest_spawn_chance = 1.0;
        let targets: Vec<Vec2> = state.enemies.iter().map(|e| e.center()).collect();
        for target in targets {
            state.projectiles.push(shot_at(target, ProjectileKind::Fire, 1e6));
        }

        resolve_player_projectiles(&mut state);

        assert_eq!(state.stats.kills, 2);
        assert_eq!(cleared_events(&state), 1);
        assert!(chest_tasks(&state) <= 1);
    }

    #[test]
    fn test_enemy_projectile_spent_even_when_invulnerable() {
        let mut state = arena(&[]);
        let center = state.player.center();
        state.player.invulnerable_ms = 500.0;
        state
            .projectiles
            .push(Projectile::enemy_shot(center, Vec2::X, 10.0, 3000.0));

        resolve_enemy_projectiles(&mut state);
        assert!(state.projectiles[0].spent);
        assert_eq!(state.player.health, state.player.max_health);
    }

    #[test]
    fn test_enemy_projectile_pushes_along_velocity() {
        let mut state = arena(&[]);
        let center = state.player.center();
        state
            .projectiles
            .push(Projectile::enemy_shot(center, Vec2::Y, 10.0, 3000.0));
        resolve_enemy_projectiles(&mut state);
        assert_eq!(state.player.health, state.player.max_health - 10.0);
        assert_eq!(state.player.knockback, Vec2::new(0.0, PROJECTILE_KNOCKBACK));
    }

    #[test]
    fn test_contact_cooldown_independent_of_invulnerability() {
        let mut state = arena(&[Vec2::new(30.0, 30.0)]);
        state.player.invulnerable_ms = 500.0;
        resolve_contact(&mut state);
        assert_eq!(state.player.health, state.player.max_health);
        let enemy = &state.enemies[0];
        assert_eq!(enemy.collision_cooldown_ms, enemy.collision_cooldown_max_ms);
        assert_eq!(enemy.speed, enemy.original_speed * status::COLLISION_SLOWDOWN);
    }

    #[test]
    fn test_contact_damages_and_knocks_back() {
        let mut state = arena(&[Vec2::new(30.0, 20.0)]);
        let damage = state.enemies[0].damage;
        resolve_contact(&mut state);
        assert_eq!(state.player.health, state.player.max_health - damage);
        // Enemy sits to the right, so the player is pushed left
        assert!(state.player.knockback.x < 0.0);
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let mut state = arena(&[Vec2::new(20.0 + crate::consts::PLAYER_SIZE, 20.0)]);
        resolve_contact(&mut state);
        assert_eq!(state.player.health, state.player.max_health);
        assert_eq!(state.enemies[0].collision_cooldown_ms, 0.0);
    }

    #[test]
    fn test_pickup_applies_reward() {
        let mut state = arena(&[]);
        let damage = state.player.damage;
        state
            .pickups
            .push(Pickup::new(state.player.center(), Reward::Damage));
        state
            .pickups
            .push(Pickup::new(Vec2::new(700.0, 500.0), Reward::Speed));
        resolve_pickups(&mut state);

        assert_eq!(state.player.damage, damage + 2.0);
        assert_eq!(state.pickups.len(), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ItemAcquired {
                reward: Reward::Damage
            }]
        );
    }

    #[test]
    fn test_chest_touch_starts_opening() {
        let mut state = arena(&[]);
        state
            .chests
            .push(RewardChest::new(state.player.center(), Reward::Multishot));
        resolve_chests(&mut state);
        assert!(matches!(
            state.chests[0].state,
            crate::sim::loot::ChestState::Opening { .. }
        ));
    }
}
