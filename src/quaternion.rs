use nalgebra::{Point3, Quaternion};

use crate::float::Float;

pub type Quat = Quaternion<Float>;

/// Embed a point into the quaternions. The same embedding is used for every iteration of the
/// map: `x` is the real part, `y` and `z` are the `i` and `j` parts, and `k` is zero.
#[inline]
pub fn embed(p: &Point3<Float>) -> Quat {
    Quaternion::new(p.x, p.y, p.z, 0.)
}

/// The quaternions that move the embedding of a point by `amount` along the spatial `x`, `y`
/// and `z` axes.
pub fn axis_offsets(amount: Float) -> [Quat; 3] {
    [
        Quaternion::new(amount, 0., 0., 0.),
        Quaternion::new(0., amount, 0., 0.),
        Quaternion::new(0., 0., amount, 0.),
    ]
}

/// One application of `z -> z^2 + c`, carrying the derivative `dz -> 2 z dz` along with it.
/// Returns the new `(z, dz)` pair.
#[inline]
pub fn iterate(z: &Quat, dz: &Quat, c: &Quat) -> (Quat, Quat) {
    let next_dz = (z * dz) * 2.;
    let next_z = z * z + c;
    (next_z, next_dz)
}

/// True when every component is finite.
#[inline]
pub fn is_finite(q: &Quat) -> bool {
    q.coords.iter().all(|c| c.is_finite())
}
