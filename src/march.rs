use log::{debug, trace};
use nalgebra::{Point3, Unit, Vector3};
use smallvec::SmallVec;

use crate::{
    estimate::{self, Estimate},
    float::Float,
    params::JuliaParams,
    ray::Ray,
};

/// A point where a ray crosses the boundary of the solid.
#[derive(Debug, Clone, PartialEq)]
pub struct Crossing {
    /// The ray parameter of the crossing.
    pub t: Float,

    /// The crossing point in object space.
    pub point: Point3<Float>,

    /// The direction of the ray that produced this crossing.
    pub direction: Unit<Vector3<Float>>,

    /// True when the ray is entering the solid, false when it is leaving.
    pub enter: bool,

    /// True only for the first surface the ray hits.
    pub front: bool,

    /// The surface normal, filled in on demand by `Solid::complete_intersection`.
    pub normal: Option<Unit<Vector3<Float>>>,
}

/// Crossings in the order they were found along the ray, which is increasing `t`.
pub type Crossings = SmallVec<[Crossing; 4]>;

/// Which side of the boundary the march currently believes it's on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Outside,
    Inside,
}

/// The state of a single ray's march through the bounding sphere.
#[derive(Debug)]
pub struct March<'a> {
    params: &'a JuliaParams,
    origin: &'a Ray,
    sample: Ray,
    regime: Regime,
    front: bool,
    crossings: Crossings,
}

impl<'a> March<'a> {
    /// Begin marching `ray` from the parameter `t`, which is normally where the ray enters the
    /// bounding sphere.
    pub fn new(params: &'a JuliaParams, ray: &'a Ray, t: Float) -> Self {
        March {
            params,
            origin: ray,
            sample: Ray::new(ray.at(t), ray.direction),
            regime: Regime::Outside,
            front: true,
            crossings: Crossings::new(),
        }
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn position(&self) -> &Point3<Float> {
        &self.sample.position
    }

    pub fn crossings(&self) -> &[Crossing] {
        &self.crossings
    }

    pub fn into_crossings(self) -> Crossings {
        self.crossings
    }

    /// The tolerance for being on the boundary at the current sample. In relative mode it grows
    /// with the distance from the ray origin, falling back to the absolute value at the origin
    /// itself so that every step makes progress.
    fn epsilon(&self) -> Float {
        let epsilon = self.params.epsilon();
        if self.params.epsilon_relative_to_distance() {
            let relative = (self.sample.position - self.origin.position).norm() * epsilon;
            if relative > 0. {
                return relative;
            }
        }
        epsilon
    }

    /// Record a crossing at the current sample. Returns `false` once the ray has recorded more
    /// crossings than it's allowed.
    fn record(&mut self, enter: bool) -> bool {
        let t = self.origin.parameter_of(&self.sample.position);
        let front = self.front;
        trace!("crossing at t = {} (enter: {}, front: {})", t, enter, front);

        self.crossings.push(Crossing {
            t,
            point: self.origin.at(t),
            direction: self.origin.direction,
            enter,
            front,
            normal: None,
        });
        self.front = false;

        if self.crossings.len() > self.params.max_intersections() {
            debug!(
                "stopping march after {} crossings",
                self.crossings.len()
            );
            return false;
        }

        true
    }

    /// Take one step. Returns `false` when marching is finished, either because the sample has
    /// left the bounding sphere or because the crossing limit was reached.
    pub fn step(&mut self) -> bool {
        match self.regime {
            Regime::Outside => {
                let distance = estimate::exterior(self.params, &self.sample.position);
                if !distance.is_finite() {
                    // no bound on the distance, so creep forward without claiming a crossing.
                    let epsilon = self.epsilon();
                    self.sample.step(epsilon);
                    return self.params.bounding_sphere().contains(&self.sample.position);
                }

                self.sample.step(distance);
                if distance < self.epsilon() {
                    self.regime = Regime::Inside;
                    if !self.record(true) {
                        return false;
                    }
                }
            }

            Regime::Inside => {
                let Estimate { distance, outside } =
                    estimate::interior(self.params, &self.sample.position);
                let epsilon = self.epsilon();

                if outside && distance >= epsilon {
                    self.regime = Regime::Outside;
                    if !self.record(false) {
                        return false;
                    }
                }

                // never take a step smaller than epsilon, or one we can't trust.
                let step = if distance.is_finite() {
                    distance.max(epsilon)
                } else {
                    epsilon
                };
                self.sample.step(step);
            }
        }

        self.params.bounding_sphere().contains(&self.sample.position)
    }
}

/// Find every point where `ray` crosses the boundary of the Julia set described by `params`.
/// Rays that miss the bounding sphere produce no crossings. When the ray starts inside the
/// solid, the exterior estimate is negative and the first crossing may have a negative `t`.
pub fn intersect(params: &JuliaParams, ray: &Ray) -> Crossings {
    let Some(t) = params.bounding_sphere().entry(ray) else {
        return Crossings::new();
    };

    let mut march = March::new(params, ray, t);
    while march.step() {}
    march.into_crossings()
}
