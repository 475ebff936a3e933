/// FNV-1a, used to derive stable per-item seeds from string identifiers.
#[derive(Clone, Copy, Debug)]
pub struct Fnv1a64(u64);

impl Fnv1a64 {
    pub const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

pub fn seed_from_str(s: &str) -> u64 {
    let mut h = Fnv1a64::new_default();
    h.write_bytes(s.as_bytes());
    h.finish()
}

/// SplitMix64 generator. Deterministic for a given seed so that star layouts and
/// hand-drawn jitter are reproducible across redraws.
#[derive(Clone, Copy, Debug)]
pub struct Rng64 {
    state: u64,
}

impl Rng64 {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform in `[0, 1)` with 53 bits of precision.
    pub fn next_f64_01(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) * (1.0 / ((1u64 << 53) as f64))
    }

    pub fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64_01()
    }

    /// Uniform in `[-1, 1)`.
    pub fn signed(&mut self) -> f64 {
        self.next_f64_01() * 2.0 - 1.0
    }
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Maps `v` from `[lo, hi]` to `[0, 1]` without clamping. Returns 0 for an empty span.
pub fn inverse_lerp(lo: f64, hi: f64, v: f64) -> f64 {
    let span = hi - lo;
    if span.abs() <= f64::EPSILON {
        return 0.0;
    }
    (v - lo) / span
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
