use nalgebra::Point3;

use crate::{float::Float, ray::Ray};

/// A sphere centered at the origin of object space that encloses the whole solid. Marching
/// starts where a ray enters it and stops once the ray has left it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    radius: Float,
    radius_squared: Float,
}

impl BoundingSphere {
    pub fn new(radius: Float) -> Self {
        BoundingSphere {
            radius,
            radius_squared: radius * radius,
        }
    }

    pub fn radius(&self) -> Float {
        self.radius
    }

    pub fn radius_squared(&self) -> Float {
        self.radius_squared
    }

    /// The ray parameter where the ray first meets the sphere, or `None` when the ray misses
    /// it. A ray that starts inside the sphere enters it at `t = 0`, and a ray whose
    /// intersections lie entirely behind its origin misses.
    pub fn entry(&self, ray: &Ray) -> Option<Float> {
        let b = ray.direction.dot(&ray.position.coords);
        let c = ray.position.coords.norm_squared() - self.radius_squared;

        let discriminant = b * b - c;
        if discriminant < 0. {
            return None;
        }

        let root = discriminant.sqrt();
        let far = -b + root;
        if far < 0. {
            return None;
        }

        Some((-b - root).max(0.))
    }

    /// True while `p` is still within the sphere.
    #[inline]
    pub fn contains(&self, p: &Point3<Float>) -> bool {
        p.coords.norm_squared() <= self.radius_squared
    }

    /// The axis-aligned box that encloses the sphere, as `(min, max)` corners.
    pub fn bounding_box(&self) -> (Point3<Float>, Point3<Float>) {
        let r = self.radius;
        (Point3::new(-r, -r, -r), Point3::new(r, r, r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_entry_from_outside() {
        let sphere = BoundingSphere::new(3.);
        let ray = Ray::towards(Point3::new(0., 0., -5.), Vector3::new(0., 0., 1.));
        assert_relative_eq!(2., sphere.entry(&ray).expect("entry"));

        let ray = Ray::towards(Point3::new(3., 0.1, -3.), Vector3::new(-1., 0., 1.));
        let t = sphere.entry(&ray).expect("entry");
        assert_relative_eq!(9., ray.at(t).coords.norm_squared(), epsilon = 1e-9);
    }

    #[test]
    fn test_entry_from_inside() {
        let sphere = BoundingSphere::new(3.);
        let ray = Ray::towards(Point3::new(0., 1., 0.), Vector3::new(1., 0., 0.));
        assert_eq!(Some(0.), sphere.entry(&ray));
    }

    #[test]
    fn test_misses() {
        let sphere = BoundingSphere::new(3.);

        // passes the sphere at a distance of 5
        let ray = Ray::towards(Point3::new(0., 5., -10.), Vector3::new(0., 0., 1.));
        assert_eq!(None, sphere.entry(&ray));

        // points away from the sphere
        let ray = Ray::towards(Point3::new(5., 0., 0.), Vector3::new(1., 0., 0.));
        assert_eq!(None, sphere.entry(&ray));
    }

    #[test]
    fn test_contains() {
        let sphere = BoundingSphere::new(2.);
        assert!(sphere.contains(&Point3::new(1., 1., 1.)));
        assert!(!sphere.contains(&Point3::new(2., 1., 0.)));
        assert!(!sphere.contains(&Point3::new(Float::NAN, 0., 0.)));
    }

    #[test]
    fn test_bounding_box() {
        let (min, max) = BoundingSphere::new(2.5).bounding_box();
        assert_eq!(Point3::new(-2.5, -2.5, -2.5), min);
        assert_eq!(Point3::new(2.5, 2.5, 2.5), max);
    }
}
