use log::debug;
use nalgebra::{Point3, Unit, Vector3};

use crate::{
    float::Float,
    params::JuliaParams,
    quaternion::{self, Quat},
};

/// The difference in derivative magnitude between the orbits of `q + offset` and `q - offset`.
/// Iteration stops as soon as the difference is no longer finite, and the last finite
/// difference is used.
fn derivative_difference(params: &JuliaParams, q: &Quat, offset: &Quat) -> Float {
    let mut lo = q - offset;
    let mut hi = q + offset;
    let mut dlo = Quat::identity();
    let mut dhi = Quat::identity();
    let mut difference = 0.;

    for _ in 0..params.max_iterations() {
        (lo, dlo) = quaternion::iterate(&lo, &dlo, params.c());
        (hi, dhi) = quaternion::iterate(&hi, &dhi, params.c());

        let next = dhi.norm() - dlo.norm();
        if !next.is_finite() {
            break;
        }
        difference = next;
    }

    difference
}

/// The gradient of the derivative magnitude at `p`, by central differences along each axis.
pub fn gradient(params: &JuliaParams, p: &Point3<Float>) -> Vector3<Float> {
    let q = quaternion::embed(p);
    let [x, y, z] = quaternion::axis_offsets(params.delta())
        .map(|offset| derivative_difference(params, &q, &offset));
    Vector3::new(x, y, z)
}

/// Estimate the surface normal at `p`, or `None` when the gradient is too small to give a
/// direction.
pub fn estimate(params: &JuliaParams, p: &Point3<Float>) -> Option<Unit<Vector3<Float>>> {
    let gradient = gradient(params, p);

    // rescale first, so that huge gradients don't overflow while normalizing.
    let scale = gradient.amax();
    if !(scale > 0.) || !scale.is_finite() {
        return None;
    }

    Unit::try_new(gradient / scale, Float::EPSILON)
}

/// Estimate the surface normal at `p`. When the gradient is degenerate, the normal faces back
/// along `incoming`.
pub fn normal_at(
    params: &JuliaParams,
    p: &Point3<Float>,
    incoming: &Unit<Vector3<Float>>,
) -> Unit<Vector3<Float>> {
    estimate(params, p).unwrap_or_else(|| {
        debug!("degenerate gradient at {:?}, facing the ray instead", p);
        -*incoming
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JuliaParamsBuilder;
    use approx::assert_relative_eq;
    use nalgebra::Quaternion;

    #[test]
    fn test_unit_ball() {
        // with c = 0 the derivative only depends on |z|, so the gradient points away from the
        // origin.
        let params = JuliaParamsBuilder::default()
            .set_max_iterations(4)
            .set_delta(1e-6)
            .build()
            .expect("valid");

        let n = estimate(&params, &Point3::new(0.6, 0., 0.8)).expect("normal");
        assert_relative_eq!(0.6, n.x, epsilon = 1e-4);
        assert_relative_eq!(0., n.y, epsilon = 1e-4);
        assert_relative_eq!(0.8, n.z, epsilon = 1e-4);
    }

    #[test]
    fn test_deterministic() {
        let params = JuliaParamsBuilder::default()
            .set_c(Quaternion::new(-0.8, 0.2, 0., 0.))
            .build()
            .expect("valid");
        let p = Point3::new(0.3, 0.1, -0.4);
        assert_eq!(gradient(&params, &p), gradient(&params, &p));
    }

    #[test]
    fn test_degenerate_gradient_faces_the_ray() {
        // the origin is a critical point when c = 0, so every difference is zero.
        let params = JuliaParams::default();
        let incoming = Unit::new_normalize(Vector3::new(1., 2., 3.));

        assert_eq!(None, estimate(&params, &Point3::origin()));
        assert_eq!(-incoming, normal_at(&params, &Point3::origin(), &incoming));
    }

    #[test]
    fn test_overflow_keeps_last_finite_difference() {
        // far outside the set the derivative overflows long before the iterations run out.
        let params = JuliaParamsBuilder::default()
            .set_max_iterations(200)
            .build()
            .expect("valid");
        let n = estimate(&params, &Point3::new(2., 0.5, 0.)).expect("normal");
        assert!(n.iter().all(|c| c.is_finite()));
        assert_relative_eq!(1., n.norm(), epsilon = 1e-12);
    }
}
