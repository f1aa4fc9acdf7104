//! # Headless World Driver
//!
//! Runs a world session without a renderer or a server: walks the actor in a
//! slow circle, drains every outbound intent as JSON, and logs diagnostics.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release -- [config.json] [ticks]
//! ```

use std::{env, fs};

use anyhow::Context;
use log::{debug, info};
use voxel_world_engine::{init_logger, EngineState, TickInput, WorldConfig};
use web_time::Instant;

const DEFAULT_TICKS: u32 = 600;
const TICK_SECONDS: f32 = 1.0 / 60.0;

fn main() -> anyhow::Result<()> {
    init_logger();

    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => {
            let raw = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            WorldConfig::from_json_str(&raw)
        }
        None => WorldConfig::default(),
    };
    let ticks = match args.next() {
        Some(raw) => raw.parse::<u32>().with_context(|| format!("invalid tick count {raw:?}"))?,
        None => DEFAULT_TICKS,
    };

    let start = Instant::now();
    let mut engine = EngineState::new(config, Vec::new(), None);
    info!("Session ready in {:?}", start.elapsed());

    let mut sent = 0usize;
    for tick in 0..ticks {
        let input = TickInput {
            forward: 1.0,
            camera_rotate: (0.004, 0.0),
            jump: tick % 90 == 0,
            ..TickInput::default()
        };
        engine.tick(TICK_SECONDS, &input);

        for message in engine.take_outbound_messages() {
            debug!("-> {}", message.to_json()?);
            sent += 1;
        }
        for hazard in engine.take_hazard_events() {
            info!("Hazard: {hazard:?}");
        }
        engine.take_mesh_changes();
    }

    let diagnostics = serde_json::to_string(&engine.diagnostics())?;
    info!(
        "Ran {ticks} ticks in {:?}; actor at {:?}; {sent} messages; diagnostics {diagnostics}",
        start.elapsed(),
        engine.actor().position
    );
    Ok(())
}
