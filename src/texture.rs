use nalgebra::{Unit, Vector3};

use crate::{canvas::Color, float::Float};

/// Colors a surface by its normal, mapping each component from `[-1, 1]` onto `[1, 0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalTexture;

/// Each component of a normal is quantized into this many bits of a cache key.
const KEY_BITS: u32 = 21;

impl NormalTexture {
    pub fn new() -> Self {
        NormalTexture
    }

    pub fn color(&self, normal: &Unit<Vector3<Float>>) -> Color {
        let channel = |n: Float| (1. - (n + 1.) / 2.) as f32;
        Color::new(channel(normal.x), channel(normal.y), channel(normal.z))
    }

    /// A key that identifies the color produced for `normal`. Normals that quantize to the same
    /// key produce colors that are indistinguishable once written out.
    pub fn cache_key(&self, normal: &Unit<Vector3<Float>>) -> u64 {
        // `n + 1` lies in `[0, 2]`, so the largest quantized value still fits in `KEY_BITS`.
        let scale = (1u64 << (KEY_BITS - 2)) as Float;
        let quantize = |n: Float| ((n + 1.) * scale) as u64;

        (quantize(normal.x) << (2 * KEY_BITS))
            | (quantize(normal.y) << KEY_BITS)
            | quantize(normal.z)
    }
}
