//! # Facility Simulator
//!
//! Headless driver for the progression core. Walks a few scripted players
//! through the normal world and the facility, ticks the ambient scheduler,
//! and prints what happened.
//!
//! ```bash
//! # Defaults
//! ./facility_sim
//!
//! # Custom configuration, 60 simulated seconds
//! ./facility_sim config/facility.toml 60
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use liminal::shared::{
    FacilityConfig, MovementEvent, PlayerId, Position, Realm, TICKS_PER_SECOND,
};
use liminal::{Facility, IntentBus, Location, Transition};

/// Blocks walked per tick (a brisk walk).
const STEP: f64 = 0.25;

/// Ticks between heading changes.
const TURN_EVERY: u64 = 40;

/// Simulated seconds when none are given.
const DEFAULT_SECONDS: u64 = 30;

/// A scripted player.
struct Walker {
    id: PlayerId,
    name: &'static str,
    privileged: bool,
    heading: f64,
}

impl Walker {
    const fn new(id: u64, name: &'static str, privileged: bool, heading: f64) -> Self {
        Self { id: PlayerId(id), name, privileged, heading }
    }
}

fn label(transition: &Transition) -> &'static str {
    match transition {
        Transition::Idle => "idle",
        Transition::Warned { .. } => "warned",
        Transition::Spared => "spared",
        Transition::Noclipped { .. } => "noclipped",
        Transition::Contained { .. } => "contained",
        Transition::Descended { .. } => "descended",
        Transition::Ascended { .. } => "ascended",
        Transition::Escaped => "escaped",
    }
}

fn load_config(path: Option<&String>) -> FacilityConfig {
    let Some(path) = path else {
        println!("   ✓ Using default configuration");
        return FacilityConfig { event_seed: Some(42), ..FacilityConfig::default() };
    };
    match FacilityConfig::load(path) {
        Ok(config) => {
            println!("   ✓ Loaded {path}");
            config
        }
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    LIMINAL FACILITY SIMULATOR");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();

    let config = load_config(args.get(1));
    let seconds = match args.get(2).map(|s| s.parse::<u64>()) {
        None => DEFAULT_SECONDS,
        Some(Ok(seconds)) => seconds,
        Some(Err(e)) => {
            eprintln!("   ✗ FATAL: invalid duration {:?}: {e}", args[2]);
            std::process::exit(1);
        }
    };

    let (sender, receiver) = IntentBus::create_pair(8192);
    let facility = match Facility::new(config, Arc::new(sender)) {
        Ok(facility) => facility,
        Err(e) => {
            eprintln!("   ✗ FATAL: {e}");
            std::process::exit(1);
        }
    };
    println!(
        "   ✓ Facility ready: {} levels, containment [{}, {}]",
        facility.config().max_levels,
        facility.config().room_min,
        facility.config().room_max
    );

    let mut walkers = [
        Walker::new(1, "Wanderer", false, 0.3),
        Walker::new(2, "Explorer", false, 2.1),
        Walker::new(3, "Warden", true, 4.0),
    ];
    for walker in &walkers {
        facility.join(walker.id, walker.name, walker.privileged);
    }

    // The explorer goes straight in; the warden pulls them out halfway
    if let Err(e) = facility.enter(PlayerId(2), Some("1")) {
        eprintln!("   ⚠ enter failed: {e}");
    }

    println!();
    println!("🚶 Simulating {seconds}s with {} players...", walkers.len());

    let ticks = seconds * u64::from(TICKS_PER_SECOND);
    let mut transitions: BTreeMap<&'static str, u64> = BTreeMap::new();
    let mut intents = 0usize;
    let start = Instant::now();

    for now in 0..ticks {
        for walker in &mut walkers {
            if now % TURN_EVERY == 0 {
                walker.heading += 0.7 + (now / TURN_EVERY % 3) as f64 * 0.4;
            }

            let (from, location) = match facility.sessions().get(walker.id) {
                Some(handle) => {
                    let session = handle.lock();
                    (session.position, session.location)
                }
                None => continue,
            };
            let (realm, y) = match location {
                Location::Outside => (Realm::Normal, 64.0),
                Location::InFacility(level) => (
                    Realm::Facility(level),
                    f64::from(facility.registry().profile(level).standing_y()),
                ),
            };
            let to = Position::new(
                from.x + walker.heading.cos() * STEP,
                y,
                from.z + walker.heading.sin() * STEP,
            );

            let transition = facility.handle_move(&MovementEvent {
                player: walker.id,
                from,
                to,
                realm,
            });
            if transition != Transition::Idle {
                println!("   [{now:>5}] {:<9} {}", walker.name, label(&transition));
            }
            *transitions.entry(label(&transition)).or_default() += 1;
        }

        if now == ticks / 2 {
            match facility.force_exit(PlayerId(3), Some("explorer")) {
                Ok(id) => println!("   [{now:>5}] Warden    force_exit {id}"),
                Err(e) => println!("   [{now:>5}] Warden    force_exit failed: {e}"),
            }
        }

        facility.tick(now);
        intents += receiver.drain().len();
    }

    let elapsed = start.elapsed();
    let stats = facility.ambient_stats();

    println!();
    println!("═══════════════════════════════════════════════════════════════════");
    println!("                           SUMMARY");
    println!("═══════════════════════════════════════════════════════════════════");
    println!("  Ticks:            {ticks} in {elapsed:?}");
    for (kind, count) in &transitions {
        println!("  {kind:<17} {count}");
    }
    println!("  Intents:          {intents}");
    println!("  Chunks generated: {}", facility.registry().generated_count());
    println!("  Active levels:    {}", facility.registry().active_levels());
    println!("  Known exits:      {}", facility.navigation().known_exits());
    println!(
        "  Ambience:         {} flickers, {} sounds, {} fog, {} deferred",
        stats.flickers, stats.sounds, stats.fog_effects, stats.deferred_run
    );
    println!();
    for walker in &walkers {
        let location = facility.location(walker.id).unwrap_or_default();
        println!("  {:<9} {:?}", walker.name, location);
    }
    println!("═══════════════════════════════════════════════════════════════════");
}
