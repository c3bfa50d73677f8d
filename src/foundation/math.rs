use kurbo::Vec2;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

/// Map a hash to `[0, 1)` using its top 53 bits.
fn unit_f64(h: u64) -> f64 {
    (h >> 11) as f64 / (1u64 << 53) as f64
}

/// Deterministic point inside the disc of radius `radius`, keyed by `(seed, step)`.
///
/// Shake tweens use this instead of a process-wide RNG so replays are reproducible.
pub(crate) fn jitter_in_disc(seed: u64, step: u64, radius: f64) -> Vec2 {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_u64(step);
    let a = h.finish();
    h.write_u64(a);
    let b = h.finish();

    let angle = unit_f64(a) * std::f64::consts::TAU;
    let r = radius * unit_f64(b).sqrt();
    Vec2::new(r * angle.cos(), r * angle.sin())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
