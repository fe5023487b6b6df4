//! # Gameplay Randomness
//!
//! [`EventRng`] feeds the noclip roll, spawn offsets and ambient hazards.
//! It never touches terrain: chunks draw from their own per-chunk stream in
//! `liminal_procedural`, so gameplay cannot disturb the world.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of gameplay randomness.
///
/// Injected into the navigation controller and the ambient scheduler so
/// hosts can seed it and tests can script it.
pub trait EventRng: Send {
    /// Uniform double in `[0, 1)`.
    fn next_double(&mut self) -> f64;

    /// Uniform integer in `[0, bound)`. `bound` must be positive.
    fn next_int(&mut self, bound: i32) -> i32;

    /// Fair coin.
    fn next_bool(&mut self) -> bool {
        self.next_double() < 0.5
    }

    /// Draws once and returns true with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_double() < p
    }

    /// Uniform integer in `[-half, half)`.
    fn spread(&mut self, half: i32) -> i32 {
        self.between(-half, half)
    }

    /// Uniform integer in `[low, high)`. `high` must exceed `low`.
    ///
    /// Spans wider than `i32::MAX` are drawn from a scaled double.
    fn between(&mut self, low: i32, high: i32) -> i32 {
        let span = i64::from(high) - i64::from(low);
        let offset = match i32::try_from(span) {
            Ok(span) => i64::from(self.next_int(span)),
            Err(_) => ((self.next_double() * span as f64) as i64).clamp(0, span - 1),
        };
        (i64::from(low) + offset) as i32
    }
}

/// ChaCha-backed [`EventRng`].
pub struct SeededEventRng {
    inner: ChaCha8Rng,
}

impl SeededEventRng {
    /// Reproducible stream.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Stream seeded from the wall clock.
    #[must_use]
    pub fn from_clock() -> Self {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(0);
        Self::from_seed(nanos)
    }

    /// `from_seed` when a seed is configured, `from_clock` otherwise.
    #[must_use]
    pub fn from_config(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_clock, Self::from_seed)
    }
}

impl EventRng for SeededEventRng {
    fn next_double(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn next_int(&mut self, bound: i32) -> i32 {
        self.inner.gen_range(0..bound)
    }

    fn next_bool(&mut self) -> bool {
        self.inner.gen::<bool>()
    }
}

/// [`EventRng`] that replays a fixed list of doubles.
///
/// Once the script runs out every draw returns `fallback`. Integers are
/// derived from the same doubles (`floor(d * bound)`), so a fallback of
/// `0.0` makes every chance succeed and every offset land on its low end.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    rolls: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedRng {
    /// Every draw returns `roll`.
    #[must_use]
    pub fn constant(roll: f64) -> Self {
        Self { rolls: VecDeque::new(), fallback: roll }
    }

    /// Replays `rolls`, then returns `fallback` forever.
    #[must_use]
    pub fn scripted(rolls: impl IntoIterator<Item = f64>, fallback: f64) -> Self {
        Self { rolls: rolls.into_iter().collect(), fallback }
    }

    /// Draws left in the script.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl EventRng for ScriptedRng {
    fn next_double(&mut self) -> f64 {
        self.rolls.pop_front().unwrap_or(self.fallback)
    }

    fn next_int(&mut self, bound: i32) -> i32 {
        let d = self.next_double().clamp(0.0, 1.0 - f64::EPSILON);
        (d * f64::from(bound)).floor() as i32
    }
}
