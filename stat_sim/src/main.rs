//! stat_sim - Headless frame-loop driver for stat_engine
//!
//! Usage: `stat_sim [config.toml] [seconds]`

mod simulation;

use anyhow::{Context, Result};
use simulation::FrameLoop;
use stat_engine::config::load_stat_config;
use stat_engine::{default_stat_config, SourceId, StatController, StatEvent};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const OBJECT_ID: &str = "sim_entity";

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("stat_sim=info".parse()?))
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_stat_config(Path::new(&path))
            .with_context(|| format!("loading config {}", path))?,
        None => default_stat_config(),
    };
    let seconds: f64 = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid duration {}", raw))?,
        None => 10.0,
    };

    let registry = config.registry();
    let store = config.store();
    let mut rng = rand::thread_rng();

    let mut controller = config.build_controller();
    attach_logger(&mut controller);

    let mut preset_ids: Vec<&str> = registry.ids().collect();
    preset_ids.sort_unstable();
    for id in preset_ids {
        if let Some(modifier) = registry.instantiate(id, SourceId::new()) {
            info!(preset = id, "applying preset");
            controller.add_modifier(modifier);
        }
    }

    // First half on the original controller, then hand over through a save file
    let first = FrameLoop::run(&mut controller, seconds / 2.0, &mut rng);
    controller.save(&store, OBJECT_ID)?;
    info!(frames = first.frames, "saved after {:.2}s", first.simulated);

    let mut restored = config.build_controller();
    attach_logger(&mut restored);
    let count = restored.load(&store, OBJECT_ID)?;
    let path = store.path_for(OBJECT_ID)?;
    info!(modifiers = count, "restored from {}", path.display());

    let second = FrameLoop::run(&mut restored, seconds - seconds / 2.0, &mut rng);
    info!(frames = second.frames, "finished after {:.2}s", second.simulated);

    print_summary(&restored);
    Ok(())
}

fn attach_logger(controller: &mut StatController) {
    controller.subscribe_all(|event| match event {
        StatEvent::Modified { stat_id, delta } => info!(stat = %stat_id, delta, "stat modified"),
        StatEvent::OverTimeActiveChanged { stat_id, active } => {
            info!(stat = %stat_id, active, "over-time state changed")
        }
    });
}

fn print_summary(controller: &StatController) {
    let mut ids: Vec<&str> = controller.stat_ids().collect();
    ids.sort_unstable();

    println!("{:<12} {:>10} {:>10}", "stat", "current", "base");
    for id in ids {
        println!(
            "{:<12} {:>10.2} {:>10.2}",
            id,
            controller.get_stat(id),
            controller.get_base_value(id)
        );
    }

    for modifier in controller.active_modifiers() {
        println!(
            "active: {:?} on {} ({:.2}s left)",
            modifier.modifier_type,
            modifier.stat_id,
            modifier.remaining()
        );
    }
}
