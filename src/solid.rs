use log::warn;
use nalgebra::{Point3, Quaternion};

use crate::{
    float::Float,
    march::{self, Crossing, Crossings},
    normal,
    params::{JuliaParams, JuliaParamsBuilder, ParamError},
    quaternion::Quat,
    ray::Ray,
};

/// A solid that rays can be intersected with.
pub trait Solid {
    /// Find the crossings of `ray` with the solid's boundary, ordered along the ray.
    fn intersect(&self, ray: &Ray) -> Crossings;

    /// Fill in the information needed to shade a crossing, which is currently just its normal.
    fn complete_intersection(&self, crossing: &mut Crossing);

    /// The axis-aligned box that encloses the solid, as `(min, max)` corners.
    fn bounding_box(&self) -> (Point3<Float>, Point3<Float>);
}

impl<S: Solid + ?Sized> Solid for Box<S> {
    fn intersect(&self, ray: &Ray) -> Crossings {
        self.as_ref().intersect(ray)
    }

    fn complete_intersection(&self, crossing: &mut Crossing) {
        self.as_ref().complete_intersection(crossing)
    }

    fn bounding_box(&self) -> (Point3<Float>, Point3<Float>) {
        self.as_ref().bounding_box()
    }
}

/// A three dimensional slice through a quaternion Julia set.
#[derive(Debug, Clone, Default)]
pub struct JuliaSet {
    params: JuliaParams,
}

impl JuliaSet {
    pub fn new(params: JuliaParams) -> Self {
        Self { params }
    }

    /// The Julia set for `c = real + i·i + j·j + k·k`, with default parameters otherwise.
    pub fn from_components(real: Float, i: Float, j: Float, k: Float) -> Self {
        let mut set = Self::default();
        set.set_c(Quaternion::new(real, i, j, k));
        set
    }

    pub fn params(&self) -> &JuliaParams {
        &self.params
    }

    /// Replace all of the parameters at once.
    pub fn reconfigure(&mut self, params: JuliaParams) {
        self.params = params;
    }

    /// Apply a change to the parameters. If the change doesn't validate, the current parameters
    /// are kept and the error is returned.
    fn update<F>(&mut self, change: F) -> Result<(), ParamError>
    where
        F: FnOnce(JuliaParamsBuilder) -> JuliaParamsBuilder,
    {
        match change(self.params.to_builder()).build() {
            Ok(params) => {
                self.params = params;
                Ok(())
            }
            Err(err) => {
                warn!("rejected julia set parameter: {}", err);
                Err(err)
            }
        }
    }

    pub fn set_c(&mut self, c: Quat) {
        self.params = self.params.with_c(c);
    }

    pub fn set_bounding_sphere_radius(&mut self, radius: Float) -> Result<(), ParamError> {
        self.update(|b| b.set_bounding_sphere_radius(radius))
    }

    pub fn set_escape_radius(&mut self, radius: Float) -> Result<(), ParamError> {
        self.update(|b| b.set_escape_radius(radius))
    }

    pub fn set_max_iterations(&mut self, iterations: u32) -> Result<(), ParamError> {
        self.update(|b| b.set_max_iterations(iterations))
    }

    pub fn set_epsilon(&mut self, epsilon: Float) -> Result<(), ParamError> {
        self.update(|b| b.set_epsilon(epsilon))
    }

    pub fn set_epsilon_relative_to_distance(&mut self, relative: bool) {
        self.params = self.params.with_epsilon_relative_to_distance(relative);
    }

    pub fn set_delta(&mut self, delta: Float) -> Result<(), ParamError> {
        self.update(|b| b.set_delta(delta))
    }

    pub fn set_max_intersections(&mut self, intersections: usize) -> Result<(), ParamError> {
        self.update(|b| b.set_max_intersections(intersections))
    }
}

impl Solid for JuliaSet {
    fn intersect(&self, ray: &Ray) -> Crossings {
        march::intersect(&self.params, ray)
    }

    fn complete_intersection(&self, crossing: &mut Crossing) {
        crossing.normal = Some(normal::normal_at(
            &self.params,
            &crossing.point,
            &crossing.direction,
        ));
    }

    fn bounding_box(&self) -> (Point3<Float>, Point3<Float>) {
        self.params.bounding_sphere().bounding_box()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn demo() -> JuliaSet {
        let mut set = JuliaSet::from_components(-0.8, 0.2, 0., 0.);
        set.set_epsilon(0.001).expect("valid epsilon");
        set
    }

    /// Rays from a shell around the set, aimed at random points near its middle.
    fn sample_rays(seed: u64, count: usize) -> Vec<Ray> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut sample = |lo: Float, hi: Float| {
            Vector3::new(
                rng.gen_range(lo..hi),
                rng.gen_range(lo..hi),
                rng.gen_range(lo..hi),
            )
        };

        (0..count)
            .map(|_| {
                let origin = Point3::from(sample(-1., 1.).normalize() * 5.);
                let target = Point3::from(sample(-0.8, 0.8));
                Ray::towards(origin, target - origin)
            })
            .collect()
    }

    #[test]
    fn test_from_components() {
        let set = JuliaSet::from_components(-0.8, 0.2, 0.1, 0.05);
        let c = set.params().c();
        assert_eq!((-0.8, 0.2, 0.1, 0.05), (c.w, c.i, c.j, c.k));
        assert_eq!(20, set.params().max_iterations());
    }

    #[test]
    fn test_rejected_radius_keeps_previous() {
        let mut set = demo();
        set.set_bounding_sphere_radius(2.).expect("valid radius");

        assert!(set.set_bounding_sphere_radius(0.).is_err());
        assert!(set.set_bounding_sphere_radius(-1.).is_err());
        assert_eq!(2., set.params().bounding_sphere_radius());
        assert_eq!(4., set.params().bounding_sphere().radius_squared());
    }

    #[test]
    fn test_rejected_values_keep_previous() {
        let mut set = demo();
        let before = set.params().clone();

        assert!(set.set_escape_radius(0.).is_err());
        assert!(set.set_max_iterations(0).is_err());
        assert!(set.set_epsilon(-0.1).is_err());
        assert!(set.set_delta(0.).is_err());
        assert!(set.set_max_intersections(0).is_err());
        assert_eq!(&before, set.params());
    }

    #[test]
    fn test_reconfigure_takes_effect() {
        let mut set = demo();
        let ray = Ray::towards(Point3::new(1.2, 0., -5.), Vector3::new(0., 0., 1.));
        assert_eq!(2, set.intersect(&ray).len());

        // a bounding sphere of radius 1 never meets this ray.
        let params = set
            .params()
            .to_builder()
            .set_bounding_sphere_radius(1.)
            .build()
            .expect("valid");
        set.reconfigure(params);
        assert!(set.intersect(&ray).is_empty());
    }

    #[test]
    fn test_complete_intersection() {
        let set = demo();
        let ray = Ray::towards(Point3::new(3., 0.1, -3.), Vector3::new(-1., 0., 1.));
        let mut crossings = set.intersect(&ray);
        let first = &mut crossings[0];
        assert!(first.enter && first.front);

        set.complete_intersection(first);
        let normal = first.normal.expect("normal");
        assert_relative_eq!(1., normal.norm(), epsilon = 1e-12);

        // completing again gives the same answer
        set.complete_intersection(first);
        assert_eq!(Some(normal), first.normal);
    }

    #[test]
    fn test_normals_are_always_finite() {
        let set = demo();
        for ray in sample_rays(11, 32) {
            for mut crossing in set.intersect(&ray) {
                set.complete_intersection(&mut crossing);
                let normal = crossing.normal.expect("normal");
                assert!(normal.iter().all(|c| c.is_finite()));
            }
        }
    }

    #[test]
    fn test_sampled_rays_are_well_formed() {
        let set = demo();
        for ray in sample_rays(3, 64) {
            let crossings = set.intersect(&ray);
            for (ix, crossing) in crossings.iter().enumerate() {
                assert_eq!(ix % 2 == 0, crossing.enter);
                assert_eq!(ix == 0, crossing.front);
            }
            for pair in crossings.windows(2) {
                assert!(pair[0].t <= pair[1].t);
            }
            assert!(crossings.len() <= set.params().max_intersections() + 1);
        }
    }

    #[test]
    fn test_coarser_epsilon_finds_less_detail() {
        // individual rays can gain a crossing, but over many rays a coarser tolerance only
        // merges or misses detail.
        let fine = demo();
        let mut coarse = demo();
        coarse.set_epsilon(0.01).expect("valid epsilon");

        let rays = sample_rays(7, 48);
        let count = |set: &JuliaSet| -> usize {
            rays.iter().map(|ray| set.intersect(ray).len()).sum()
        };

        assert!(count(&coarse) <= count(&fine));
    }

    #[test]
    fn test_dynamic_dispatch() {
        let solid: Box<dyn Solid> = Box::new(demo());
        let ray = Ray::towards(Point3::new(1.2, 0., -5.), Vector3::new(0., 0., 1.));
        assert_eq!(2, solid.intersect(&ray).len());

        let (min, max) = solid.bounding_box();
        assert_eq!(Point3::new(-3., -3., -3.), min);
        assert_eq!(Point3::new(3., 3., 3.), max);
    }
}
