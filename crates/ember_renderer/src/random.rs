//! Random sampling helpers.
//!
//! Every helper takes the generator explicitly. Workers own their generator,
//! so no random state is ever shared between threads.

use ember_math::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Uniform sample in `[0, 1)`.
#[inline]
pub fn gen_f32(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>()
}

/// Rejection-sample a point strictly inside the unit sphere.
pub fn random_in_unit_sphere(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
            gen_f32(rng) * 2.0 - 1.0,
        );
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Rejection-sample a point strictly inside the unit disk (z = 0).
pub fn random_in_unit_disk(rng: &mut dyn RngCore) -> Vec3 {
    loop {
        let p = Vec3::new(gen_f32(rng) * 2.0 - 1.0, gen_f32(rng) * 2.0 - 1.0, 0.0);
        if p.length_squared() < 1.0 {
            return p;
        }
    }
}

/// Generator for one tile of a seeded render.
///
/// Mixing the tile index into the seed makes every tile's sample stream
/// independent of which worker picks it up.
pub fn tile_rng(seed: u64, tile_index: usize) -> SmallRng {
    let mixed = seed ^ (tile_index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    SmallRng::seed_from_u64(mixed)
}

/// Generator seeded from OS entropy, one per worker thread.
pub fn entropy_rng() -> SmallRng {
    SmallRng::from_entropy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn test_gen_f32_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let x = gen_f32(&mut rng);
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn test_unit_sphere_and_disk() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..1000 {
            assert!(random_in_unit_sphere(&mut rng).length_squared() < 1.0);
            let d = random_in_unit_disk(&mut rng);
            assert!(d.length_squared() < 1.0);
            assert_eq!(d.z, 0.0);
        }
    }

    #[test]
    fn test_tile_rng_reproducible() {
        let mut a = tile_rng(42, 3);
        let mut b = tile_rng(42, 3);
        let mut c = tile_rng(42, 4);
        let xa: Vec<f32> = (0..8).map(|_| gen_f32(&mut a)).collect();
        let xb: Vec<f32> = (0..8).map(|_| gen_f32(&mut b)).collect();
        let xc: Vec<f32> = (0..8).map(|_| gen_f32(&mut c)).collect();
        assert_eq!(xa, xb);
        assert_ne!(xa, xc);
    }
}
