//! Variable timestep simulation tick
//!
//! One call advances the session by one rendered frame. Order within a frame:
//! scheduled tasks, player, screen transition, enemies, projectiles, area
//! effects, chests, then collision resolution. Dead enemies are purged at the
//! start of the following frame's enemy pass.

use glam::{IVec2, Vec2};

use super::combat;
use super::enemy::EnemyContext;
use super::events::GameEvent;
use super::scheduler::ScheduledTask;
use super::state::{GamePhase, GameState};
use super::status;
use super::transition::Edge;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement intent, each axis in -1..=1
    pub movement: Vec2,
    /// Trigger held
    pub fire: bool,
    /// Aim point in play-area coordinates; falls back to facing
    pub aim: Option<Vec2>,
    /// Cast the area blast
    pub special: bool,
    /// Switch to the next projectile kind
    pub cycle_weapon: bool,
    /// Jump straight to a screen (debug/testing)
    pub warp_to: Option<IVec2>,
    /// Demo mode - AI plays the game
    pub autopilot: bool,
}

/// Advance the game state by one frame of `dt_ms` milliseconds
pub fn tick(state: &mut GameState, input: &TickInput, dt_ms: f32) {
    if state.phase == GamePhase::GameOver {
        return;
    }

    let dt = state.clock.advance(dt_ms);

    let input = if input.autopilot {
        autopilot_input(state)
    } else {
        input.clone()
    };

    run_scheduled(state);

    if let Some(target) = input.warp_to {
        state.force_transition(target);
    }

    update_player(state, &input, dt);
    state.check_screen_transition();

    update_enemies(state, dt);
    update_projectiles(state, dt);
    update_area_effects(state, dt);
    update_chests(state, dt);

    combat::resolve(state);

    if !state.player.is_alive() {
        state.phase = GamePhase::GameOver;
        log::info!(
            "Game over at {:.1}s: level {}, {} kills, {} screens",
            state.clock.now_ms / 1000.0,
            state.player.level,
            state.stats.kills,
            state.stats.screens_entered
        );
        state.push_event(GameEvent::PlayerDied);
    }
}

/// Run every task that has come due. Each one re-checks its guard here.
fn run_scheduled(state: &mut GameState) {
    for task in state.scheduler.drain_due(state.clock.now_ms) {
        match task {
            ScheduledTask::RestoreSpeed { target } => {
                if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == target && e.is_active()) {
                    status::restore_speed(enemy);
                }
            }
            ScheduledTask::SpawnChest { screen } => {
                if screen == state.current_screen() {
                    state.spawn_chest(screen);
                } else {
                    log::debug!("Chest for {} dropped, player moved on", screen);
                }
            }
            ScheduledTask::BurstShot {
                screen,
                direction,
                kind,
            } => {
                if screen == state.current_screen() && state.player.is_alive() {
                    let shot = state.player.shot(direction, kind);
                    state.projectiles.push(shot);
                }
            }
        }
    }
}

fn update_player(state: &mut GameState, input: &TickInput, dt: f32) {
    state.player.update(input.movement, dt);

    if input.cycle_weapon {
        state.player.cycle_weapon();
    }

    if input.fire {
        fire_weapon(state, input.aim);
    }

    if input.special {
        if let Some(blast) = state.player.try_special(&state.tuning) {
            state.area_effects.push(blast);
        }
    }
}

fn fire_weapon(state: &mut GameState, aim: Option<Vec2>) {
    let Some(direction) = state.player.try_fire(aim) else {
        return;
    };
    let kind = state.player.weapon;
    state.projectiles.push(state.player.shot(direction, kind));

    // Extra multishot projectiles follow one stagger step apart
    let screen = state.current_screen();
    for i in 1..=state.player.multishot {
        let due = state.clock.now_ms + (state.tuning.multishot_stagger_ms * i as f32) as f64;
        state.scheduler.schedule(
            due,
            ScheduledTask::BurstShot {
                screen,
                direction,
                kind,
            },
        );
    }
}

fn update_enemies(state: &mut GameState, dt: f32) {
    let now = state.clock.now_ms;

    // Purge last frame's dead and anything flagged invalid
    state.enemies.retain(|e| e.is_active());

    for id in state.freezes.take_expired(now) {
        if let Some(enemy) = state.enemies.iter_mut().find(|e| e.id == id) {
            status::thaw(enemy, &mut state.rng);
        }
    }
    let enemies = &state.enemies;
    state.freezes.retain(|id| enemies.iter().any(|e| e.id == id));

    let mut killed = Vec::new();
    for enemy in state.enemies.iter_mut() {
        if status::tick_poison(enemy, now) {
            killed.push(enemy.id);
        }
    }
    for id in killed {
        state.on_enemy_killed(id);
    }

    let ctx = EnemyContext {
        player_center: state.player.center(),
        tuning: &state.tuning,
    };
    for enemy in state.enemies.iter_mut() {
        if let Some(shot) = enemy.update(dt, &ctx, &mut state.rng) {
            state.projectiles.push(shot);
        }
    }
}

fn update_projectiles(state: &mut GameState, dt: f32) {
    for projectile in state.projectiles.iter_mut() {
        projectile.update(dt);
    }
    state.projectiles.retain(|p| {
        if !p.is_finite() {
            log::warn!("Dropping projectile with non-finite state at {:?}", p.pos);
            return false;
        }
        !p.should_remove()
    });
}

fn update_area_effects(state: &mut GameState, dt: f32) {
    for effect in state.area_effects.iter_mut() {
        effect.update(dt);
    }
    state.area_effects.retain(|a| a.is_alive());
}

fn update_chests(state: &mut GameState, dt: f32) {
    let mut rewards = Vec::new();
    for chest in state.chests.iter_mut() {
        if let Some(reward) = chest.update(dt) {
            rewards.push(reward);
        }
    }
    state.chests.retain(|c| !c.is_collected());

    for reward in rewards {
        state.player.apply_reward(reward);
        state.stats.chests_opened += 1;
        state.push_event(GameEvent::ItemAcquired { reward });
    }
}

/// Keep-away distance band the autopilot tries to hold from its target
const AUTOPILOT_NEAR: f32 = 140.0;
const AUTOPILOT_FAR: f32 = 260.0;

/// Demo input: kite the nearest enemy while shooting, grab loot when the
/// screen is quiet, then walk toward an unexplored neighbor
fn autopilot_input(state: &GameState) -> TickInput {
    let me = state.player.center();

    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.is_active())
        .min_by(|a, b| {
            a.center()
                .distance(me)
                .partial_cmp(&b.center().distance(me))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    if let Some(enemy) = nearest {
        let target = enemy.center();
        let to_target = (target - me).normalize_or_zero();
        let distance = target.distance(me);
        let movement = if distance < AUTOPILOT_NEAR {
            -to_target
        } else if distance > AUTOPILOT_FAR {
            to_target
        } else {
            // Strafe around the target
            to_target.perp()
        };
        return TickInput {
            movement,
            fire: true,
            aim: Some(target),
            special: distance < state.tuning.special_radius,
            // Rotate through projectile kinds now and then
            cycle_weapon: state.clock.frame % 240 == 0,
            ..Default::default()
        };
    }

    let loot = state
        .pickups
        .iter()
        .map(|p| p.rect().center())
        .chain(state.chests.iter().map(|c| c.rect().center()))
        .next();
    if let Some(target) = loot {
        return TickInput {
            movement: (target - me).normalize_or_zero(),
            ..Default::default()
        };
    }

    // Chests only appear while the player stays on the screen
    if !state.scheduler.is_empty() {
        return TickInput::default();
    }

    TickInput {
        movement: exploration_edge(state).offset().as_vec2(),
        ..Default::default()
    }
}

/// Edge toward the first uncleared neighbor, preferring right, down, left, up
fn exploration_edge(state: &GameState) -> Edge {
    let here = state.current_screen();
    let candidates = [Edge::Right, Edge::Bottom, Edge::Left, Edge::Top];
    let inside: Vec<Edge> = candidates
        .into_iter()
        .filter(|edge| state.world.contains(here + edge.offset()))
        .collect();

    inside
        .iter()
        .copied()
        .find(|edge| !state.is_screen_cleared(here + edge.offset()))
        .or_else(|| {
            // Everything nearby is cleared; wander in a frame-dependent direction
            let pick = (state.clock.frame / 600) as usize % inside.len().max(1);
            inside.get(pick).copied()
        })
        .unwrap_or(Edge::Right)
}
