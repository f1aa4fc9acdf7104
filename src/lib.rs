#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::invalid_rust_codeblocks)]

//! # Voxel World Engine
//!
//! The client-side core of a streamed, destructible voxel world: deterministic
//! terrain, chunk storage and generation, face-culled meshing, streaming around
//! the actor, grounded/airborne movement with a follow camera, and optimistic
//! voxel editing reconciled against an authoritative server.
//!
//! ## Key Modules
//!
//! * `engine_state` - The `EngineState` owner and every subsystem it drives
//! * `engine_state::voxels` - Terrain sampler, chunks, overrides and the chunk store
//! * `engine_state::rendering` - Renderer-ready chunk meshes
//! * `engine_state::actor_state` - Movement, colliders and camera
//! * `engine_state::interaction` - Raycast picking and edit reconciliation
//! * `engine_state::protocol` - Validated wire records
//!
//! ## Architecture
//!
//! The engine is single-threaded and pull-based. An embedding application
//! creates one [`EngineState`] per session, calls [`EngineState::tick`] once per
//! frame, feeds server records to [`EngineState::handle_server_message`] and
//! drains outbound intents and mesh changes whenever it likes. Drawing,
//! networking and UI live outside this crate.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = EngineState::new(WorldConfig::default(), Vec::new(), None);
//! engine.tick(1.0 / 60.0, &TickInput::default());
//! for message in engine.take_outbound_messages() {
//!     socket.send(message.to_json()?);
//! }
//! ```

use log::info;

pub mod engine_state;

pub use engine_state::{
    config::WorldConfig, input_state::TickInput, protocol::ClientMessage, Diagnostics,
    EngineState, TickSummary,
};

/// Initialises `env_logger` on stdout, filtered by `RUST_LOG`.
pub fn init_logger() {
    let mut log_builder = env_logger::Builder::new();
    log_builder
        .target(env_logger::Target::Stdout)
        .parse_env("RUST_LOG")
        .init();

    info!("Logger initialized");
}
