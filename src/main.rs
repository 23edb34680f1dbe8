//! Deterministic soak run: random box fields resolved on the job scheduler.
//!
//! Usage: `peregrine_kernel [seed] [ticks]`
//!
//! The final checksum only depends on the seed and tick count. Compare it across
//! machines (or thread counts in `assets/kernel_config.ron`) to check that the
//! kernel is bit-identical.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::error::Error;
use std::sync::{Arc, OnceLock};
use tracing::info;

use peregrine_kernel::config::KernelConfig;
use peregrine_kernel::contacts::{all_pairs, contacts_checksum, ContactBatch};
use peregrine_kernel::fixed_math::{FixedNum, FixedVec2};
use peregrine_kernel::geometry::{Aabb, RaycastHit, RaycastMode};
use peregrine_kernel::jobs::{JobHandle, Scheduler};
use peregrine_kernel::logging::init_file_logging;
use peregrine_kernel::profiling::profile;

const CONFIG_PATH: &str = "assets/kernel_config.ron";
const BOX_COUNT: usize = 256;
const RAY_COUNT: usize = 64;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_TICKS: u64 = 300;

fn main() -> Result<(), Box<dyn Error>> {
    let log_file = init_file_logging("logs", "peregrine_kernel", 25)?;

    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║  Peregrine Kernel soak - Logging to file                 ║");
    println!("╠══════════════════════════════════════════════════════════╣");
    println!("║  Log file: {:<45} ║", log_file.display());
    println!("╚══════════════════════════════════════════════════════════╝");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_SEED);
    let ticks = args.next().and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_TICKS);

    let config = KernelConfig::load_or_default(CONFIG_PATH);
    let scheduler = Scheduler::new(config.scheduler.clone())?;
    let mut rng = StdRng::seed_from_u64(seed);

    info!("Soak: seed {}, {} ticks, {} boxes, {} rays", seed, ticks, BOX_COUNT, RAY_COUNT);

    let pairs: Arc<[(usize, usize)]> = all_pairs(BOX_COUNT).into();
    let mut checksum: u64 = 0;
    let mut total_contacts = 0usize;
    let mut total_hits = 0usize;

    for tick in 0..ticks {
        let boxes: Arc<[Aabb]> = spawn_boxes(&mut rng, BOX_COUNT).into();
        let summary = run_tick(&scheduler, boxes, Arc::clone(&pairs), config.raycast_mode, tick)?;

        checksum = checksum.rotate_left(7) ^ summary.checksum;
        total_contacts += summary.contacts;
        total_hits += summary.hits;
        peregrine_kernel::profile_log!(tick, "[SOAK] tick {} | contacts {} | hits {}", tick, summary.contacts, summary.hits);
    }

    let stats = scheduler.stats();
    info!(
        "Soak done: {} contacts, {} ray hits, {} jobs ({} panicked)",
        total_contacts, total_hits, stats.executed, stats.panicked
    );
    info!("Checksum: {:016x}", checksum);
    println!("checksum {:016x}", checksum);

    Ok(())
}

struct TickSummary {
    contacts: usize,
    hits: usize,
    checksum: u64,
}

/// Boxes of size 1..=8 scattered over a 200x200 field, on a 1/16 grid.
fn spawn_boxes(rng: &mut StdRng, count: usize) -> Vec<Aabb> {
    let sixteenth = |n: i32| FixedNum::from_num(n) / FixedNum::from_num(16);
    (0..count)
        .map(|_| {
            let min = FixedVec2::new(
                sixteenth(rng.random_range(-1600..1600)),
                sixteenth(rng.random_range(-1600..1600)),
            );
            let size = FixedVec2::new(
                sixteenth(rng.random_range(16..=128)),
                sixteenth(rng.random_range(16..=128)),
            );
            Aabb::new(min, min + size)
        })
        .collect()
}

/// Resolves every pair, then sweeps horizontal rays across the field once the
/// contacts are in.
#[profile]
fn run_tick(
    scheduler: &Scheduler,
    boxes: Arc<[Aabb]>,
    pairs: Arc<[(usize, usize)]>,
    mode: RaycastMode,
    tick: u64,
) -> Result<TickSummary, Box<dyn Error>> {
    let batch = ContactBatch::schedule(scheduler, Arc::clone(&boxes), pairs, JobHandle::NONE)?;

    let hits: Arc<[OnceLock<Option<RaycastHit>>]> = (0..RAY_COUNT).map(|_| OnceLock::new()).collect();
    let sweep_hits = Arc::clone(&hits);
    let sweep = scheduler.schedule_parallel(
        move |ray: usize| {
            let _ = sweep_hits[ray].set(cast_sweep_ray(&boxes, ray, mode));
        },
        RAY_COUNT,
        batch.handle(),
    )?;

    let contacts = batch.wait(scheduler)?;
    scheduler.wait(sweep)?;

    let hit_count = hits.iter().filter(|slot| matches!(slot.get(), Some(Some(_)))).count();
    let mut checksum = contacts_checksum(&contacts);
    for hit in hits.iter().filter_map(|slot| slot.get().copied().flatten()) {
        checksum ^= (hit.point.x.to_bits() as u64).rotate_left(17) ^ hit.point.y.to_bits() as u64;
    }

    Ok(TickSummary {
        contacts: contacts.len(),
        hits: hit_count,
        checksum: checksum ^ tick,
    })
}

/// Ray `index` starts left of the field and points right; returns the closest
/// box hit.
fn cast_sweep_ray(boxes: &[Aabb], index: usize, mode: RaycastMode) -> Option<RaycastHit> {
    let y = FixedNum::from_num(index as i32 * 3 - 96) + FixedNum::from_num(1) / FixedNum::from_num(3);
    let origin = FixedVec2::new(FixedNum::from_num(-120), y);
    let max_distance = FixedNum::from_num(260);

    boxes
        .iter()
        .filter_map(|aabb| aabb.raycast_with_mode(origin, FixedVec2::RIGHT, max_distance, mode))
        .min_by_key(|hit| hit.distance_from(origin))
}
