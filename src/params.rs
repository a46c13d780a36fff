use nalgebra::Quaternion;
use thiserror::Error;

use crate::{bounding_sphere::BoundingSphere, float::Float, quaternion::Quat};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("`{name}` must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: Float },

    #[error("`{name}` must be greater than zero")]
    ZeroCount { name: &'static str },
}

/// The parameters of a quaternion Julia set solid, along with the values derived from them.
/// A `JuliaParams` can only be obtained through [`JuliaParamsBuilder::build`] or `default`, so
/// every instance has been validated and its derived values agree with the parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct JuliaParams {
    c: Quat,
    bounding_sphere: BoundingSphere,
    escape_radius: Float,
    escape_radius_squared: Float,
    max_iterations: u32,
    epsilon: Float,
    epsilon_relative_to_distance: bool,
    delta: Float,
    max_intersections: usize,
}

impl Default for JuliaParams {
    fn default() -> Self {
        JuliaParams::derive(&JuliaParamsBuilder::default())
    }
}

impl JuliaParams {
    /// Compute the derived values. Callers are responsible for validating `builder` first.
    fn derive(builder: &JuliaParamsBuilder) -> Self {
        JuliaParams {
            c: builder.c,
            bounding_sphere: BoundingSphere::new(builder.bounding_sphere_radius),
            escape_radius: builder.escape_radius,
            escape_radius_squared: builder.escape_radius * builder.escape_radius,
            max_iterations: builder.max_iterations,
            epsilon: builder.epsilon,
            epsilon_relative_to_distance: builder.epsilon_relative_to_distance,
            delta: builder.delta,
            max_intersections: builder.max_intersections,
        }
    }

    /// Start a builder from these parameters, for modifying a copy of them.
    pub fn to_builder(&self) -> JuliaParamsBuilder {
        JuliaParamsBuilder {
            c: self.c,
            bounding_sphere_radius: self.bounding_sphere.radius(),
            escape_radius: self.escape_radius,
            max_iterations: self.max_iterations,
            epsilon: self.epsilon,
            epsilon_relative_to_distance: self.epsilon_relative_to_distance,
            delta: self.delta,
            max_intersections: self.max_intersections,
        }
    }

    /// A copy of these parameters with a different `c`, which needs no validation.
    pub fn with_c(&self, c: Quat) -> Self {
        JuliaParams { c, ..self.clone() }
    }

    pub fn with_epsilon_relative_to_distance(&self, relative: bool) -> Self {
        JuliaParams {
            epsilon_relative_to_distance: relative,
            ..self.clone()
        }
    }

    /// The quaternion offset that selects the Julia set.
    pub fn c(&self) -> &Quat {
        &self.c
    }

    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    pub fn bounding_sphere_radius(&self) -> Float {
        self.bounding_sphere.radius()
    }

    /// An orbit that leaves this radius is not part of the set.
    pub fn escape_radius(&self) -> Float {
        self.escape_radius
    }

    pub fn escape_radius_squared(&self) -> Float {
        self.escape_radius_squared
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn epsilon(&self) -> Float {
        self.epsilon
    }

    pub fn epsilon_relative_to_distance(&self) -> bool {
        self.epsilon_relative_to_distance
    }

    /// The step used for finite differences when estimating normals.
    pub fn delta(&self) -> Float {
        self.delta
    }

    /// The number of crossings a single ray may record before marching is cut off.
    pub fn max_intersections(&self) -> usize {
        self.max_intersections
    }
}

#[derive(Debug, Clone)]
pub struct JuliaParamsBuilder {
    c: Quat,
    bounding_sphere_radius: Float,
    escape_radius: Float,
    max_iterations: u32,
    epsilon: Float,
    epsilon_relative_to_distance: bool,
    delta: Float,
    max_intersections: usize,
}

impl Default for JuliaParamsBuilder {
    fn default() -> Self {
        JuliaParamsBuilder {
            c: Quaternion::new(0., 0., 0., 0.),
            bounding_sphere_radius: 3.,
            escape_radius: 3.5,
            max_iterations: 20,
            epsilon: 1e-4,
            epsilon_relative_to_distance: true,
            delta: 1e-7,
            max_intersections: 128,
        }
    }
}

fn positive(name: &'static str, value: Float) -> Result<(), ParamError> {
    if value > 0. && value.is_finite() {
        Ok(())
    } else {
        Err(ParamError::NonPositive { name, value })
    }
}

fn nonzero(name: &'static str, value: usize) -> Result<(), ParamError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ParamError::ZeroCount { name })
    }
}

impl JuliaParamsBuilder {
    pub fn set_c(mut self, c: Quat) -> Self {
        self.c = c;
        self
    }

    pub fn set_bounding_sphere_radius(mut self, radius: Float) -> Self {
        self.bounding_sphere_radius = radius;
        self
    }

    pub fn set_escape_radius(mut self, radius: Float) -> Self {
        self.escape_radius = radius;
        self
    }

    pub fn set_max_iterations(mut self, iterations: u32) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn set_epsilon(mut self, epsilon: Float) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn set_epsilon_relative_to_distance(mut self, relative: bool) -> Self {
        self.epsilon_relative_to_distance = relative;
        self
    }

    pub fn set_delta(mut self, delta: Float) -> Self {
        self.delta = delta;
        self
    }

    pub fn set_max_intersections(mut self, intersections: usize) -> Self {
        self.max_intersections = intersections;
        self
    }

    /// Validate the parameters and compute the values derived from them.
    pub fn build(self) -> Result<JuliaParams, ParamError> {
        positive("bounding_sphere_radius", self.bounding_sphere_radius)?;
        positive("escape_radius", self.escape_radius)?;
        nonzero("max_iterations", self.max_iterations as usize)?;
        positive("epsilon", self.epsilon)?;
        positive("delta", self.delta)?;
        nonzero("max_intersections", self.max_intersections)?;
        Ok(JuliaParams::derive(&self))
    }
}
