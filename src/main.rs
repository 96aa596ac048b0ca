//! Rift Warden entry point
//!
//! Headless runner: drives a session with the autopilot and reports what
//! happened. Rendering and live input belong to a separate host.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use anyhow::{Context, Result};
    use clap::Parser;

    use rift_warden::Tuning;
    use rift_warden::sim::{GamePhase, GameState, TickInput, tick};

    /// Top-down combat simulation, played by the built-in autopilot
    #[derive(Parser, Debug)]
    #[command(name = "rift-warden")]
    #[command(about = "Headless top-down combat simulation")]
    #[command(version)]
    pub struct Args {
        /// Number of frames to simulate
        #[arg(long, default_value = "3600")]
        pub frames: u32,

        /// Frame delta in milliseconds
        #[arg(long, default_value = "16.0")]
        pub frame_ms: f32,

        /// RNG seed (defaults to the current time)
        #[arg(long)]
        pub seed: Option<u64>,

        /// JSON file with balance overrides
        #[arg(long, value_name = "TUNING_FILE")]
        pub tuning: Option<PathBuf>,

        /// Print the per-screen persistence store as JSON when done
        #[arg(long)]
        pub dump_store: bool,
    }

    pub fn run() -> Result<()> {
        let args = Args::parse();

        let tuning = match &args.tuning {
            Some(path) => Tuning::load(path)
                .with_context(|| format!("loading tuning from {}", path.display()))?,
            None => Tuning::default(),
        };

        let seed = args.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0)
        });

        let mut state = GameState::with_tuning(seed, tuning);
        let input = TickInput {
            autopilot: true,
            ..Default::default()
        };

        for _ in 0..args.frames {
            tick(&mut state, &input, args.frame_ms);
            for event in state.drain_events() {
                log::info!(
                    "[{:>7.1}s] {}",
                    state.clock.now_ms / 1000.0,
                    event.message()
                );
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }

        let stats = &state.stats;
        println!("seed            {}", seed);
        println!("sim time        {:.1}s ({} frames)", state.clock.now_ms / 1000.0, state.clock.frame);
        println!(
            "outcome         {}",
            match state.phase {
                GamePhase::Playing => "alive",
                GamePhase::GameOver => "fallen",
            }
        );
        println!(
            "player          level {}, {:.0}/{:.0} hp, {}",
            state.player.level,
            state.player.health,
            state.player.max_health,
            state.player.weapon.name()
        );
        println!("kills           {}", stats.kills);
        println!("xp earned       {}", stats.xp_earned);
        println!("loot            {}/{} rolls dropped", stats.loot_dropped, stats.loot_rolls);
        println!("chests          {} spawned, {} opened", stats.chests_spawned, stats.chests_opened);
        println!(
            "screens         {} entered, {} cleared, {} holding enemies",
            stats.screens_entered,
            state.store.cleared_count(),
            state.store.saved_count()
        );
        println!(
            "current screen  {} ({})",
            state.current_screen(),
            state.current_zone().name()
        );

        if args.dump_store {
            let json = state
                .store
                .to_json()
                .context("serializing persistence store")?;
            println!("{}", json);
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Rift Warden (headless) starting...");
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host on this target
}
