// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Deterministic, seedable random sampling.
//!
//! The synthetic-value tiers of the cascade must replay bit-for-bit across
//! platforms and thread counts, so sampling is built on splitmix64 rather
//! than a platform RNG. Each monitoring point gets its own stream derived
//! from the batch seed; no stream is ever shared across threads.

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
const STREAM_SALT: u64 = 0xa076_1d64_78bd_642f;
const UNIT_DENOM: f64 = (1u64 << 53) as f64;

/// Splitmix64-based generator with uniform and Gaussian sampling.
#[derive(Clone, Debug)]
pub struct StableRng {
    state: u64,
    spare_normal: Option<f64>,
}

impl StableRng {
    pub fn new(seed: u64) -> Self {
        Self {
            state: seed,
            spare_normal: None,
        }
    }

    /// Generator for an independent stream, e.g. one per monitoring point.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        Self::new(seed ^ stream.wrapping_mul(STREAM_SALT).wrapping_add(GOLDEN_GAMMA))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    }

    /// Uniform draw in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / UNIT_DENOM
    }

    /// Uniform draw in `[lo, hi)`.
    pub fn uniform_in(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Standard normal draw via the Box-Muller transform.
    ///
    /// Both values of each transform are used; the second is cached and
    /// handed out on the next call.
    pub fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.spare_normal.take() {
            return z;
        }

        // ln(0) is -inf; nudge u1 off zero to keep the radius finite.
        let u1 = self.next_f64().max(f64::MIN_POSITIVE);
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let angle = std::f64::consts::TAU * u2;
        self.spare_normal = Some(radius * angle.sin());
        radius * angle.cos()
    }
}
