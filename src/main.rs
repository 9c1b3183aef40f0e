//! Slot Reels entry point
//!
//! Runs the machine headless on a fixed frame step and prints where the
//! reels land after each spin.

use std::error::Error;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;

use slot_reels::assets::TextureTable;
use slot_reels::audio::LogPlayer;
use slot_reels::consts::FRAME_MS;
use slot_reels::renderer::{TextRenderer, collect_sprites};
use slot_reels::sim::{MachineEvent, MachineServices, SlotMachine};
use slot_reels::{MachineConfig, SessionStats, SpinPreset};

/// Give up on a cycle after this many frames (a stalled barrier)
const MAX_FRAMES_PER_SPIN: u32 = 60 * 60 * 5;

#[derive(Parser)]
#[command(version, about = "Headless slot-machine reel simulator")]
struct Cli {
    /// Machine config (JSON). Defaults are used for missing fields.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// RNG seed (defaults to the current time)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of spin cycles to run
    #[arg(long, default_value_t = 3)]
    spins: u32,

    /// Simulated frame length in ms
    #[arg(long, default_value_t = FRAME_MS)]
    frame_ms: f64,

    /// Visible symbol slots per reel
    #[arg(long, default_value_t = 3)]
    window: usize,

    /// Use turbo timings
    #[arg(long)]
    turbo: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MachineConfig::load(path)?,
        None => MachineConfig::default(),
    };
    if cli.turbo {
        config.apply_preset(SpinPreset::Turbo);
    }
    log::info!("Timing preset: {}", config.preset.as_str());

    let seed = cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default()
    });

    let registry = config.symbol_registry()?;
    let textures = TextureTable::preload(&registry);
    let services = MachineServices {
        sound: Box::new(LogPlayer::new()),
    };
    let mut machine = SlotMachine::new(&config, seed, services)?;
    let text = TextRenderer::new(&registry, cli.window);
    let view_width = cli.window as f32 * config.symbol_size;
    let mut stats = SessionStats::new();

    for spin in 1..=cli.spins {
        machine.spin();

        let mut frames = 0;
        while machine.cycle_active() && frames < MAX_FRAMES_PER_SPIN {
            machine.update(cli.frame_ms);
            frames += 1;

            for event in machine.drain_events() {
                stats.record(&event);
                if let MachineEvent::WinDetected { multiplier } = event.event {
                    println!("spin {spin}: WIN x{multiplier:.1}");
                }
            }
        }

        if machine.cycle_active() {
            log::warn!("spin {} still running after {} frames, giving up", spin, frames);
            break;
        }

        let sprites = collect_sprites(machine.reels(), &textures, view_width);
        log::debug!("spin {}: {} sprites in view after {} frames", spin, sprites.len(), frames);
        println!("spin {spin}:\n{}", text.render(machine.reels()));
    }

    println!("{}", stats.to_json_pretty()?);
    Ok(())
}
