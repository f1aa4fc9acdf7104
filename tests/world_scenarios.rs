use cgmath::{Point3, Vector3};
use voxel_world_engine::{
    engine_state::{
        actor_state::{colliders::ColliderSet, Actor, MovementController, MovementInput},
        config::WorldStyle,
        interaction::{raycast::raycast, RequestOutcome},
        rendering::{meshing::MeshPalette, MeshManager},
        streaming::StreamingController,
        voxels::{
            block::{block_type::BlockType, AIR_ID},
            chunk::ChunkKey,
            chunk_store::ChunkStore,
            overrides::VoxelOverride,
            terrain::{Biome, TerrainSampler, TerrainZone},
        },
    },
    EngineState, TickInput, WorldConfig,
};

const DT: f32 = 1.0 / 60.0;

fn flat_config() -> WorldConfig {
    let mut config = WorldConfig::default();
    config.noise.height_variation = 0.0;
    config.noise.base_height = 20.0;
    config.world_height = 32;
    config.view_distance = 1;
    config
}

#[test]
fn scenario_a_floating_islands_layout() {
    let config = WorldConfig::from_json_str(
        r#"{"world_style":"floating_hub_islands","floating":{"hub_radius":28,"ring_radius":72}}"#,
    );
    assert_eq!(config.world_style, WorldStyle::FloatingHubIslands);
    let sampler = TerrainSampler::new(&config);

    let hub = sampler.sample(0, 0);
    assert_eq!(hub.zone, TerrainZone::Hub);
    assert_eq!(hub.biome, Biome::Stone);
    assert_eq!(hub.height, Some(58));

    let east = sampler.sample(72, 0);
    assert_eq!(east.zone, TerrainZone::Island);
    assert_eq!(east.biome, Biome::Wind);
    assert_eq!(east.height, Some(58));

    let gap = sampler.sample(40, 40);
    assert_eq!(gap.height, None);
    assert_eq!(gap.biome, Biome::Void);
}

#[test]
fn scenario_b_rejected_break_restores_the_block() {
    let target = Point3::new(3, 20, 3);
    let overrides = [VoxelOverride::new(target, BlockType::STONE.id())];
    let mut engine = EngineState::new(flat_config(), overrides, None);
    assert_eq!(engine.store().block_at(target), 3);

    let input = TickInput {
        break_block: true,
        pointer_ray: Some((Point3::new(3.5, 24.0, 3.5), Vector3::new(0.0, -1.0, 0.0))),
        ..TickInput::default()
    };
    let summary = engine.tick(DT, &input);
    let Some(RequestOutcome::Queued(index)) = summary.voxel_request else {
        panic!("break was not queued: {:?}", summary.voxel_request);
    };
    assert_eq!(engine.store().block_at(target), AIR_ID);

    let raw = format!(r#"{{"action":"voxel_batch_result","payload":{{"results":[{{"index":{index},"ok":false}}]}}}}"#);
    engine.handle_server_message(&raw).expect("valid batch result");
    assert_eq!(engine.store().block_at(target), 3);
    assert_eq!(engine.interaction().pending_len(), 0);
}

#[test]
fn scenario_c_downward_ray_hits_the_column_top() {
    let config = flat_config();
    let sampler = TerrainSampler::new(&config);
    let mut store = ChunkStore::new(config.chunk_size, config.world_height);
    store.generate_now(ChunkKey::new(0, -1), &sampler);
    let top = store.column_top(5, -3).expect("generated column");

    let origin = Point3::new(5.5, (config.world_height + 5) as f32, -2.5);
    let hit = raycast(
        |c| store.is_solid_at(c),
        origin,
        Vector3::new(0.0, -1.0, 0.0),
        64.0,
        256,
    )
    .expect("column below the ray");
    assert_eq!(hit.block, Point3::new(5, top, -3));
    assert_eq!(hit.normal, Vector3::new(0, 1, 0));
}

#[test]
fn scenario_d_streaming_follows_the_actor() {
    let config = flat_config();
    let sampler = TerrainSampler::new(&config);
    let mut store = ChunkStore::new(16, config.world_height);
    let palette = MeshPalette::new(sampler.seed_hash(), 20, config.world_height);
    let mut meshes = MeshManager::new(palette);
    let mut streaming = StreamingController::new(3, 16);

    streaming.update(Point3::new(1.0, 21.0, 1.0), &mut store, &mut meshes);
    store.process_queue(&sampler, usize::MAX, ChunkKey::new(0, 0));
    assert_eq!(store.resident_len(), 49);

    let update = streaming
        .update(Point3::new(81.0, 21.0, 1.0), &mut store, &mut meshes)
        .expect("actor changed chunk");
    let center = ChunkKey::new(5, 0);
    for key in &update.unloaded {
        assert!(key.chebyshev_distance(center) > 4, "{key:?} should have stayed");
    }
    for key in store.resident_keys() {
        assert!(key.chebyshev_distance(center) <= 4, "{key:?} should have been unloaded");
    }
    let distances: Vec<i64> = update.enqueued.iter().map(|k| k.distance_squared(center)).collect();
    assert!(distances.windows(2).all(|w| w[0] <= w[1]));
    assert!(update.enqueued.iter().all(|k| !store.is_resident(*k)));
}

#[test]
fn generation_is_deterministic_across_stores() {
    let config = WorldConfig::default();
    let sampler = TerrainSampler::new(&config);
    let mut a = ChunkStore::new(config.chunk_size, config.world_height);
    let mut b = ChunkStore::new(config.chunk_size, config.world_height);
    for key in [ChunkKey::new(0, 0), ChunkKey::new(-3, 7)] {
        let first = a.generate_now(key, &sampler).clone();
        let second = b.generate_now(key, &sampler).clone();
        assert_eq!(first, second);
    }
}

#[test]
fn overrides_win_over_generated_terrain() {
    let config = flat_config();
    let sampler = TerrainSampler::new(&config);
    let mut store = ChunkStore::new(config.chunk_size, config.world_height);
    let floating = Point3::new(-4, 25, 9);
    store.load_overrides([VoxelOverride::new(floating, BlockType::BRIDGE.id())]);
    store.generate_now(ChunkKey::new(-1, 0), &sampler);
    assert_eq!(store.block_at(floating), BlockType::BRIDGE.id());
    assert_eq!(store.column_top(-4, 9), Some(25));
}

#[test]
fn out_of_range_heights_read_air_and_ignore_writes() {
    let config = flat_config();
    let sampler = TerrainSampler::new(&config);
    let mut store = ChunkStore::new(config.chunk_size, config.world_height);
    store.generate_now(ChunkKey::new(0, 0), &sampler);
    for y in [-1, config.world_height, 1000] {
        let coordinate = Point3::new(2, y, 2);
        assert_eq!(store.block_at(coordinate), AIR_ID);
        assert_eq!(store.set_block(coordinate, BlockType::STONE.id()), None);
        assert!(!store.apply_override(coordinate, BlockType::STONE.id()));
    }
}

#[test]
fn movement_never_exceeds_the_speed_limit() {
    let config = WorldConfig::default();
    let sampler = TerrainSampler::new(&config);
    let mut store = ChunkStore::new(config.chunk_size, config.world_height);
    for key in StreamingController::chunks_in_view(ChunkKey::new(0, 0), 2) {
        store.generate_now(key, &sampler);
    }
    let top = store.column_top(0, 0).expect("generated column");
    let controller = MovementController::new(config.physics.clone(), config.hazards.clone());
    let colliders = ColliderSet::new();
    let mut actor = Actor::new(Point3::new(0.5, (top + 1) as f32, 0.5));
    let limit = config.physics.max_speed();

    let mut rng = fastrand::Rng::with_seed(11);
    for tick in 0..300 {
        let dt = rng.f32() * 0.1;
        let input = MovementInput {
            forward: rng.f32() * 2.0 - 1.0,
            strafe: rng.f32() * 2.0 - 1.0,
            sprint: rng.bool(),
            jump: tick % 40 == 0,
            heading: rng.f32() * std::f32::consts::TAU,
        };
        let report = controller.tick(dt, &input, &mut actor, &store, &colliders);
        assert!(
            report.displacement <= limit * dt.min(0.05) + 1e-4,
            "tick {tick}: moved {} in {dt}s",
            report.displacement
        );
    }
}
