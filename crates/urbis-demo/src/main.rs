//! Headless demo that drives the renderer core the way the frame loop does.
//!
//! Stands in for the windowed frame orchestrator: generates a deterministic
//! city grid, flies the camera down a street, and every frame rebuilds
//! visibility, uploads per-tier instance data through the arena + upload
//! queue, and logs the stats. Configuration is loaded from `config.ron` and
//! can be overridden via CLI flags.
//!
//! Run with `cargo run -p urbis-demo -- --frames 120 --show-stats`.

use std::path::PathBuf;

use clap::Parser;
use glam::{Mat4, Vec3};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::{error, info};
use urbis_alloc::{Arena, UploadQueue};
use urbis_config::{BackendSelection, CliArgs, Config};
use urbis_render::{HeadlessBackend, PoolKind, RenderBackend, ResourcePool};
use urbis_visibility::{CameraState, ClipConvention, RenderableDesc, VisibilityManager};

/// Buildings per side of the square city grid.
const CITY_SIZE: i32 = 30;
/// Street spacing between building centers, in world units.
const BLOCK_SPACING: f32 = 60.0;
/// Per-frame clear color (daylight sky).
const SKY_CLEAR: [f32; 4] = [0.45, 0.66, 0.95, 1.0];

/// Per-instance data uploaded for every active object.
#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
struct Instance {
    position: [f32; 3],
    lod: u32,
}

/// Map the configured backend family to its clip-space convention.
fn clip_convention(backend: BackendSelection) -> ClipConvention {
    match backend {
        BackendSelection::Vulkan => ClipConvention::YDown,
        BackendSelection::OpenGl => ClipConvention::YUp,
    }
}

/// Register a seeded grid of buildings plus a camera-tracking sky dome.
fn build_city(manager: &mut VisibilityManager) {
    let mut rng = Xoshiro256StarStar::seed_from_u64(42); // reproducible layout

    let half = CITY_SIZE / 2;
    for gx in -half..half {
        for gz in -half..half {
            let height = rng.gen_range(12.0..180.0);
            let radius = rng.gen_range(8.0..22.0);
            manager.register(RenderableDesc {
                position: Vec3::new(
                    gx as f32 * BLOCK_SPACING,
                    0.0,
                    gz as f32 * BLOCK_SPACING,
                ),
                bounding_radius: radius,
                max_height: height,
                ignore_frustum: false,
            });
        }
    }

    // The sky dome tracks the camera and must render every frame.
    manager.register(RenderableDesc {
        position: Vec3::ZERO,
        bounding_radius: 1.0,
        max_height: 0.0,
        ignore_frustum: true,
    });
}

/// Camera flythrough: eastward down a street at rooftop height.
fn camera_for_frame(frame: u32) -> CameraState {
    let t = frame as f32 / 60.0;
    let position = Vec3::new(-1200.0 + t * 80.0, 60.0, 30.0);
    let forward = Vec3::new(1.0, -0.05, 0.1).normalize();

    CameraState {
        view: Mat4::look_at_rh(position, position + forward, Vec3::Y),
        projection: Mat4::perspective_rh(
            std::f32::consts::FRAC_PI_3,
            16.0 / 9.0,
            0.5,
            4000.0,
        ),
        position,
    }
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(|| PathBuf::from("."));
    let mut config = match Config::load_or_create(&config_dir) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load config: {err}");
            std::process::exit(1);
        }
    };
    config.apply_cli_overrides(&args);
    urbis_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    let convention = clip_convention(config.render.backend);
    info!(backend = ?config.render.backend, ?convention, "starting urbis demo");

    let mut backend = HeadlessBackend::new(
        convention,
        config.memory.device_pool_bytes() as usize,
        config.memory.host_pool_bytes() as usize,
    );

    let mut visibility = VisibilityManager::new(convention);
    build_city(&mut visibility);
    info!("registered {} renderables", visibility.len());

    // Facade atlas mip chain lives in the device pool for the whole run.
    let mut device_pool = ResourcePool::new("device", config.memory.device_pool_bytes());
    let facades: Vec<_> = (0..4)
        .map(|mip| {
            device_pool
                .create_texture(&mut backend, 256 >> mip, 256 >> mip, 4)
                .expect("device pool sized for the facade atlas")
        })
        .collect();

    // Per-frame instance buffers are carved from the host pool.
    let mut host_arena = Arena::new("host-instances", config.memory.host_pool_bytes());

    let frames = args.frames.unwrap_or(600);
    for frame in 0..frames {
        let camera = camera_for_frame(frame);

        // Visibility first: every draw and upload decision depends on it.
        let stats = visibility.rebuild(&camera);
        backend.clear(SKY_CLEAR);

        // Bucket active instances by tier, in active-bin order.
        let mut tiers: [Vec<Instance>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for object in visibility.active_bin() {
            tiers[object.lod.index()].push(Instance {
                position: object.position.to_array(),
                lod: object.lod.index() as u32,
            });
        }

        // All acquires for the frame happen before the flush.
        let mut queue = UploadQueue::new();
        let mut frame_blocks = Vec::new();
        for instances in &tiers {
            if instances.is_empty() {
                continue;
            }
            let bytes: &[u8] = bytemuck::cast_slice(instances);
            let block = match host_arena.acquire_or_coalesce(bytes.len() as u64) {
                Ok(block) => block,
                Err(err) => {
                    error!("host pool exhausted on frame {frame}: {err}");
                    std::process::exit(1);
                }
            };
            queue
                .enqueue(block, bytes)
                .expect("block was sized from the source length");
            frame_blocks.push(block);
        }

        let pending = queue.pending_bytes();
        let mapped = match backend.map_pool(PoolKind::Host) {
            Ok(mapped) => mapped,
            Err(err) => {
                // Mapping failure mid-frame is unrecoverable by design.
                error!("frame {frame} aborted: {err}");
                std::process::exit(1);
            }
        };
        let written = queue
            .flush(mapped)
            .expect("instance blocks were carved from the mapped pool");
        debug_assert_eq!(written as u64, pending);

        // Instance blocks are transient: give them back every frame and
        // merge the accumulated fragments at a coarse cadence.
        for block in frame_blocks {
            host_arena
                .release(block)
                .expect("block was acquired this frame");
        }
        if frame % 120 == 0 {
            host_arena.coalesce();
            device_pool.coalesce();
        }

        if config.debug.show_stats || frame % 120 == 0 {
            info!(
                frame,
                active = stats.active,
                culled = stats.culled,
                tiers = ?stats.per_tier,
                uploaded = written,
                host_used = host_arena.bytes_used(),
                host_fragments = host_arena.free_fragments(),
                "frame"
            );
        }
    }

    for facade in facades {
        device_pool
            .destroy_texture(facade)
            .expect("facade was created by this pool");
    }
    info!(
        "demo finished: device pool {} of {} bytes free, {} textures live",
        device_pool.arena().bytes_free(),
        device_pool.arena().capacity(),
        device_pool.live_textures(),
    );
}
