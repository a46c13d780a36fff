use nalgebra::{Point3, Unit, Vector3};

use crate::float::Float;

#[derive(Debug, Clone)]
pub struct Ray {
    pub position: Point3<Float>,
    pub direction: Unit<Vector3<Float>>,
}

impl Ray {
    /// Construct a new ray.
    pub fn new(position: Point3<Float>, direction: Unit<Vector3<Float>>) -> Ray {
        Ray {
            position,
            direction,
        }
    }

    /// Construct a ray from a direction that isn't normalized yet.
    pub fn towards(position: Point3<Float>, direction: Vector3<Float>) -> Ray {
        Ray::new(position, Unit::new_normalize(direction))
    }

    /// The point at parameter `t` along the ray.
    #[inline]
    pub fn at(&self, t: Float) -> Point3<Float> {
        self.position + self.direction.scale(t)
    }

    /// Move the position of the ray along `direction` by `amount`.
    #[inline]
    pub fn step(&mut self, amount: Float) {
        self.position += self.direction.scale(amount);
    }

    /// Recover the ray parameter of a point that lies on the ray. Only the axis where the
    /// direction is largest is used, so rays that are nearly perpendicular to any one axis are
    /// still handled.
    pub fn parameter_of(&self, p: &Point3<Float>) -> Float {
        let axis = self.direction.iamax();
        (p[axis] - self.position[axis]) / self.direction[axis]
    }
}
