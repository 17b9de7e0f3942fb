//! Repaints biomes in an in-process world and re-syncs nearby observers.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use verdant_adapter::detect_and_select_adapter;
use verdant_config::{CliArgs, Config};
use verdant_paint::BiomeService;
use verdant_sync::{ObserverSyncBroadcaster, SyncConfig};
use verdant_world::{
    BiomeId, BoundingBox, ChunkPos, HeightRange, Location, MemoryHost, VoxelCoord, WorldId,
};

/// Columns made resident around the origin, per axis.
const LOADED_RADIUS: i32 = 2;
const FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args.config.clone().unwrap_or_else(|| {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("verdant")
    });

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    verdant_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let (host, world) = build_host(&config);

    // Adapter selection failure aborts startup.
    let adapter = match detect_and_select_adapter(&*host) {
        Ok(adapter) => adapter,
        Err(e) => {
            error!("Cannot start biome service: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sync = Arc::new(ObserverSyncBroadcaster::spawn(
        host.clone(),
        Arc::clone(&adapter),
        SyncConfig {
            queue_capacity: config.sync.queue_capacity,
        },
    ));
    let service = BiomeService::new(host.clone(), adapter).with_broadcaster(Arc::clone(&sync));

    let biomes = register_biomes(&service, &config);
    let Some(biome) = biomes.first() else {
        warn!("No custom biome could be registered, nothing to paint");
        return ExitCode::SUCCESS;
    };

    demonstrate_painting(&service, &host, &world, biome, config.painter.update_observers);

    if sync.flush(FLUSH_TIMEOUT) {
        info!(
            "Observer sync: {} snapshots sent, {} skipped, {} merged, {} dropped",
            sync.sent(),
            sync.skipped(),
            sync.merged(),
            sync.dropped()
        );
    } else {
        warn!("Observer sync did not drain within {:?}", FLUSH_TIMEOUT);
    }
    info!("{} snapshots delivered in total", host.take_sent().len());

    ExitCode::SUCCESS
}

/// Creates the configured world with a square of resident columns and one
/// observer standing at the origin.
fn build_host(config: &Config) -> (Arc<MemoryHost>, WorldId) {
    let host = Arc::new(MemoryHost::new(config.host.version_banner.clone()));
    let world = WorldId::new(&config.host.world);
    host.add_world(world.clone(), config.host.build_height());

    for x in -LOADED_RADIUS..LOADED_RADIUS {
        for z in -LOADED_RADIUS..LOADED_RADIUS {
            host.load_column(&world, ChunkPos::new(x, z));
        }
    }
    host.add_observer(world.clone(), VoxelCoord::new(0, 64, 0), config.host.view_distance);

    info!(
        "Host '{}' ready: world {} with {} resident columns",
        config.host.version_banner,
        world,
        host.loaded_count(&world)
    );
    (host, world)
}

/// Registers the configured biomes, or a built-in one if none are listed.
fn register_biomes(service: &BiomeService, config: &Config) -> Vec<BiomeId> {
    let definitions = if config.biomes.is_empty() {
        vec![verdant_config::BiomeDefinition {
            id: BiomeId::new("verdant", "crystal_caves"),
            descriptor: Default::default(),
        }]
    } else {
        config.biomes.clone()
    };

    definitions
        .into_iter()
        .filter_map(|definition| {
            match service.register_or_replace_biome(definition.id.clone(), definition.descriptor) {
                Ok(entry) => Some(entry.id().clone()),
                Err(e) => {
                    error!("Failed to register biome {}: {}", definition.id, e);
                    None
                }
            }
        })
        .collect()
}

fn demonstrate_painting(
    service: &BiomeService,
    host: &MemoryHost,
    world: &WorldId,
    biome: &BiomeId,
    update_observers: bool,
) {
    info!("Starting biome painting demonstration with {}", biome);

    let shapes = [
        (
            "voxel",
            service.set_voxel_biome(world, VoxelCoord::new(-3, 70, 5), biome, update_observers),
        ),
        (
            "column",
            service.set_column_biome(world, ChunkPos::new(-1, -1), biome, update_observers),
        ),
        (
            "column band",
            service.set_column_biome_within(
                world,
                ChunkPos::new(1, 0),
                HeightRange::new(0, 64),
                biome,
                update_observers,
            ),
        ),
        (
            "box",
            service.set_box_biome(
                world,
                &BoundingBox::of([-8.5, 60.0, -8.5], [8.5, 72.0, 8.5]),
                biome,
                update_observers,
            ),
        ),
        (
            "region across unloaded columns",
            service.set_region_biome(
                world,
                VoxelCoord::new(0, 60, 0),
                VoxelCoord::new(47, 60, 15),
                biome,
                update_observers,
            ),
        ),
        (
            "region between locations",
            service.set_region_biome_between(
                &Location::new(world.clone(), 15.9, 60.0, 15.9),
                &Location::new(world.clone(), 0.0, 60.0, 0.0),
                biome,
                update_observers,
            ),
        ),
    ];

    for (shape, result) in shapes {
        match result {
            Ok(report) => info!(
                "Painted {}: {} written, {} skipped, {} columns touched",
                shape,
                report.written,
                report.skipped,
                report.chunks.len()
            ),
            Err(e) => warn!("Painting {} failed: {}", shape, e),
        }
    }

    let elsewhere = Location::new(WorldId::new("elsewhere"), 0.0, 0.0, 0.0);
    if let Err(e) = service.set_region_biome_between(
        &Location::new(world.clone(), 0.0, 0.0, 0.0),
        &elsewhere,
        biome,
        update_observers,
    ) {
        info!("Cross-world region rejected as expected: {}", e);
    }

    info!(
        "Biome at origin is now {:?}; {} cell writes in total",
        host.biome_at(world, VoxelCoord::new(0, 60, 0)).map(|id| id.to_string()),
        host.cell_writes()
    );
}
