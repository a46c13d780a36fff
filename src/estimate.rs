//! Escape-time distance estimation for quaternion Julia sets.
//!
//! Both estimates are lower bounds on the distance to the boundary of the set, so they are only
//! ever used as safe step sizes while marching.

use nalgebra::Point3;

use crate::{
    float::Float,
    params::JuliaParams,
    quaternion::{self, Quat},
};

/// The result of estimating from a point that was believed to be inside the set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Lower bound on the distance to the boundary.
    pub distance: Float,

    /// The orbit escaped, so the point has left the solid.
    pub outside: bool,
}

/// The orbit of a point under `z -> z^2 + c`, along with its derivative.
#[derive(Debug, Clone)]
struct Orbit {
    z: Quat,
    dz: Quat,
}

impl Orbit {
    fn new(z: Quat) -> Self {
        Orbit {
            z,
            dz: Quat::identity(),
        }
    }

    /// Iterate until the orbit escapes or runs out of iterations, returning `true` if it escaped.
    /// An orbit that stops being finite has escaped too, and keeps its last finite state.
    fn run(&mut self, params: &JuliaParams) -> bool {
        for _ in 0..params.max_iterations() {
            let (z, dz) = quaternion::iterate(&self.z, &self.dz, params.c());
            if !quaternion::is_finite(&z) || !quaternion::is_finite(&dz) {
                return true;
            }

            self.z = z;
            self.dz = dz;

            let magnitude = z.norm_squared();
            if magnitude > params.escape_radius_squared() || !magnitude.is_finite() {
                return true;
            }
        }

        false
    }

    /// `0.5 |z| ln|z| / |dz|`. Degenerate orbits whose estimate is undefined, or infinitely far
    /// inside, are treated as lying on the boundary. An orbit whose derivative vanished while
    /// escaping still gives `+inf`, which is not a usable step.
    fn escape_distance(&self) -> Float {
        let zl = self.z.norm();
        let distance = 0.5 * zl * zl.ln() / self.dz.norm();
        if distance.is_nan() || distance == Float::NEG_INFINITY {
            0.
        } else {
            distance
        }
    }
}

/// Estimate the distance from a point outside the solid to the closest point inside it.
pub fn exterior(params: &JuliaParams, p: &Point3<Float>) -> Float {
    let mut orbit = Orbit::new(quaternion::embed(p));
    orbit.run(params);
    orbit.escape_distance()
}

/// Estimate the distance from a point inside the solid to the closest point outside it. When
/// the orbit escapes the point was not inside after all, and the exterior estimate is returned
/// with `outside` set.
///
/// The interior distance is `|z - z0| / |dz|`, which may be infinite or NaN for orbits that
/// collapse onto zero; callers must floor the step they take.
pub fn interior(params: &JuliaParams, p: &Point3<Float>) -> Estimate {
    let start = quaternion::embed(p);
    let mut orbit = Orbit::new(start);

    if orbit.run(params) {
        Estimate {
            distance: orbit.escape_distance(),
            outside: true,
        }
    } else {
        Estimate {
            distance: (orbit.z - start).norm() / orbit.dz.norm(),
            outside: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::JuliaParamsBuilder;
    use approx::assert_relative_eq;
    use nalgebra::Quaternion;

    fn demo() -> JuliaParams {
        JuliaParamsBuilder::default()
            .set_c(Quaternion::new(-0.8, 0.2, 0., 0.))
            .build()
            .expect("valid")
    }

    #[test]
    fn test_exterior_escapes_immediately() {
        // with c = 0, the orbit of 2 is 4 after one step, which is past the escape radius.
        let params = JuliaParams::default();
        let d = exterior(&params, &Point3::new(2., 0., 0.));
        assert_relative_eq!(0.5 * Float::ln(4.), d);
    }

    #[test]
    fn test_exterior_is_negative_inside() {
        // the orbit of 0.5 under c = 0 converges, so |z| < 1 and the log is negative.
        let params = JuliaParamsBuilder::default()
            .set_max_iterations(3)
            .build()
            .expect("valid");
        assert!(exterior(&params, &Point3::new(0.5, 0., 0.)) < 0.);
    }

    #[test]
    fn test_exterior_shrinks_towards_the_set() {
        let params = demo();
        let far = exterior(&params, &Point3::new(0., 0., -2.9));
        let near = exterior(&params, &Point3::new(0., 0., -1.5));
        assert!(far > near, "far: {}, near: {}", far, near);
        assert!(far > 0.);
    }

    #[test]
    fn test_interior_bounded() {
        // z: 0.25, 0.0625, 0.00390625
        // dz: 1, 0.5, 0.0625
        let params = JuliaParamsBuilder::default()
            .set_max_iterations(3)
            .build()
            .expect("valid");
        let est = interior(&params, &Point3::new(0.5, 0., 0.));
        assert!(!est.outside);
        assert_relative_eq!((0.5 - 0.00390625) / 0.0625, est.distance);
    }

    #[test]
    fn test_interior_detects_escape() {
        let params = JuliaParams::default();
        let p = Point3::new(2., 0., 0.);
        let est = interior(&params, &p);
        assert!(est.outside);
        assert_relative_eq!(exterior(&params, &p), est.distance);
    }

    #[test]
    fn test_non_finite_orbit_is_an_escape() {
        // squaring 1e200 overflows on the first iteration.
        let params = JuliaParamsBuilder::default()
            .set_escape_radius(1e300)
            .build()
            .expect("valid");
        let p = Point3::new(1e200, 0., 0.);

        let d = exterior(&params, &p);
        assert!(!d.is_nan());
        assert!(d > 0.);

        let est = interior(&params, &p);
        assert!(est.outside);
        assert!(!est.distance.is_nan());
    }

    #[test]
    fn test_degenerate_orbit_touches_the_boundary() {
        // the orbit of the origin under c = 0 stays at zero, so the estimate is 0 * ln 0 / 0.
        let params = JuliaParams::default();
        assert_eq!(0., exterior(&params, &Point3::origin()));
    }

    #[test]
    fn test_critical_point_estimates() {
        // the origin is the critical point of the map, so dz is zero after the first step.
        let inside = JuliaParamsBuilder::default()
            .set_c(Quaternion::new(-0.5, 0., 0., 0.))
            .build()
            .expect("valid");
        assert_eq!(0., exterior(&inside, &Point3::origin()));

        // the orbit of the origin escapes under the demo c, with nothing to divide by.
        let outside = demo();
        assert_eq!(Float::INFINITY, exterior(&outside, &Point3::origin()));
        let est = interior(&outside, &Point3::origin());
        assert!(est.outside);
        assert_eq!(Float::INFINITY, est.distance);
    }
}
