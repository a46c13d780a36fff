use nalgebra::{Point2, Point3, Unit, Vector3};

use crate::{canvas::Canvas, float::Float, ray::Ray};

#[derive(Debug, Clone)]
pub struct CanvasInfo {
    /// The width in pixels of the canvas.
    pub width: u32,

    /// The height in pixels of the canvas.
    pub height: u32,
}

impl CanvasInfo {
    /// Create a new [`CanvasInfo`].
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Compute the aspect ratio.
    pub fn aspect_ratio(&self) -> Float {
        self.width as Float / self.height as Float
    }

    pub fn new_canvas(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }
}

#[derive(Debug, Clone)]
pub struct Sample {
    /// The point on the film where the ray originates, in pixels from the bottom-left corner.
    pub film: Point2<Float>,
}

impl Sample {
    pub fn new(fx: Float, fy: Float) -> Self {
        Self {
            film: Point2::new(fx, fy),
        }
    }
}

pub trait Camera {
    /// Given a [`Sample`], generate a ray.
    fn generate_ray(&self, sample: &Sample) -> Ray;
}

/// A perspective camera with all rays leaving from a single point.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    eye: Point3<Float>,
    forward: Unit<Vector3<Float>>,

    /// Scaled so that moving from the center of the film to its right edge covers half the field
    /// of view.
    right: Vector3<Float>,

    /// Scaled so that moving from the center of the film to its top edge keeps pixels square.
    up: Vector3<Float>,

    width: Float,
    height: Float,
}

impl PinholeCamera {
    /// A camera at `eye` looking along `direction`, with a horizontal field of view of
    /// `fov_degrees`. The film's vertical axis follows world `+y`, unless the camera looks straight
    /// along it, when `+z` is used instead.
    pub fn new(
        info: &CanvasInfo,
        eye: Point3<Float>,
        direction: Unit<Vector3<Float>>,
        fov_degrees: Float,
    ) -> Self {
        let world_up = if direction.cross(&Vector3::y()).norm() > 1e-6 {
            Vector3::y()
        } else {
            Vector3::z()
        };

        let right = direction.cross(&world_up).normalize();
        let up = right.cross(&direction);

        let half_width = (fov_degrees.to_radians() / 2.).tan();
        let half_height = half_width / info.aspect_ratio();

        Self {
            eye,
            forward: direction,
            right: right * half_width,
            up: up * half_height,
            width: info.width as Float,
            height: info.height as Float,
        }
    }

    pub fn eye(&self) -> &Point3<Float> {
        &self.eye
    }
}

impl Camera for PinholeCamera {
    fn generate_ray(&self, sample: &Sample) -> Ray {
        // film coordinates in [-1, 1], with the origin in the middle of the canvas
        let sx = 2. * sample.film.x / self.width - 1.;
        let sy = 2. * sample.film.y / self.height - 1.;

        Ray::towards(
            self.eye,
            self.forward.into_inner() + self.right * sx + self.up * sy,
        )
    }
}
