//! # Lattice Value Noise
//!
//! Seeded 2D value noise. Lattice values come from an integer hash of the
//! lattice corner and the seed hash, and are blended bilinearly with smoothstep
//! easing. Octaves are summed with fixed frequency steps and halving amplitudes,
//! then normalised by the amplitude sum so the output stays in `[-1, 1]`.

use noise::NoiseFn;

const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Frequency of each successive octave.
const OCTAVE_FREQUENCIES: [f64; 6] = [1.0, 2.1, 4.3, 8.7, 17.5, 35.2];

/// Hashes a seed string with 32-bit FNV-1a over its UTF-16 code units.
pub fn hash_seed(seed: &str) -> u32 {
    seed.encode_utf16()
        .fold(FNV_OFFSET_BASIS, |hash, unit| (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME))
}

/// Seeded lattice value noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LatticeNoise {
    seed_hash: u32,
}

impl LatticeNoise {
    /// Creates a noise source for the given seed hash.
    pub fn new(seed_hash: u32) -> Self {
        Self { seed_hash }
    }

    /// The seed hash this source was created with.
    pub fn seed_hash(&self) -> u32 {
        self.seed_hash
    }

    /// Pseudo-random value in `[0, 1]` for an integer lattice corner.
    pub fn lattice(&self, x: i32, z: i32) -> f64 {
        let mut n = (x.wrapping_mul(374_761_393) ^ z.wrapping_mul(668_265_263)) as u32 ^ self.seed_hash;
        n ^= n >> 13;
        n = n.wrapping_mul(1_274_126_177);
        (n & 0x7fff_ffff) as f64 / 0x7fff_ffff as f64
    }

    /// Single-octave noise in `[-1, 1]`.
    pub fn value(&self, x: f64, z: f64) -> f64 {
        let x0 = x.floor();
        let z0 = z.floor();
        let sx = smoothstep(x - x0);
        let sz = smoothstep(z - z0);
        let (ix, iz) = (x0 as i32, z0 as i32);

        let a = self.lattice(ix, iz);
        let b = self.lattice(ix.wrapping_add(1), iz);
        let c = self.lattice(ix, iz.wrapping_add(1));
        let d = self.lattice(ix.wrapping_add(1), iz.wrapping_add(1));

        let near = lerp(a, b, sx);
        let far = lerp(c, d, sx);
        lerp(near, far, sz) * 2.0 - 1.0
    }

    /// Sum of `octaves` octaves, normalised to `[-1, 1]`.
    ///
    /// `octaves` is clamped to `1..=6`.
    pub fn fractal(&self, x: f64, z: f64, octaves: u32) -> f64 {
        let octaves = octaves.clamp(1, OCTAVE_FREQUENCIES.len() as u32) as usize;
        let mut sum = 0.0;
        let mut amplitude_sum = 0.0;
        let mut amplitude = 1.0;
        for frequency in OCTAVE_FREQUENCIES.iter().take(octaves) {
            sum += self.get([x * frequency, z * frequency]) * amplitude;
            amplitude_sum += amplitude;
            amplitude *= 0.5;
        }
        sum / amplitude_sum
    }
}

impl NoiseFn<f64, 2> for LatticeNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.value(point[0], point[1])
    }
}

#[inline]
fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_hash_matches_fnv1a() {
        assert_eq!(hash_seed(""), 2_166_136_261);
        assert_eq!(hash_seed("a"), 0xe40c_292c);
    }

    #[test]
    fn seed_hash_folds_utf16_code_units() {
        let expected = [0xd83c_u32, 0xdf32]
            .iter()
            .fold(FNV_OFFSET_BASIS, |hash, unit| (hash ^ unit).wrapping_mul(FNV_PRIME));
        assert_eq!(hash_seed("\u{1F332}"), expected);
        assert_ne!(hash_seed("\u{1F332}"), hash_seed("\u{F332}"));
    }

    #[test]
    fn value_hits_lattice_at_integer_points() {
        let noise = LatticeNoise::new(hash_seed("lattice"));
        for (x, z) in [(0, 0), (3, -7), (-12, 40)] {
            let expected = noise.lattice(x, z) * 2.0 - 1.0;
            let actual = noise.value(x as f64, z as f64);
            assert!((expected - actual).abs() < 1e-12);
        }
    }

    #[test]
    fn noise_fn_samples_the_same_field() {
        let noise = LatticeNoise::new(hash_seed("adapter"));
        let sampled = NoiseFn::get(&noise, [1.5, -2.25]);
        assert_eq!(sampled, noise.value(1.5, -2.25));
    }

    #[test]
    fn fractal_stays_in_unit_range() {
        let noise = LatticeNoise::new(hash_seed("range"));
        for i in 0..500 {
            let x = i as f64 * 0.37 - 90.0;
            let z = i as f64 * -0.53 + 14.0;
            let v = noise.fractal(x, z, 3);
            assert!((-1.0..=1.0).contains(&v), "fractal({x}, {z}) = {v}");
        }
    }

    #[test]
    fn different_seeds_produce_different_fields() {
        let a = LatticeNoise::new(hash_seed("one"));
        let b = LatticeNoise::new(hash_seed("two"));
        let differs = (0..32).any(|i| a.lattice(i, i * 3) != b.lattice(i, i * 3));
        assert!(differs);
    }
}
