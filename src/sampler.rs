use nalgebra::Point2;

use crate::float::Float;

pub trait Sampler: Send {
    /// The number of samples produced for each pixel.
    fn samples_per_pixel(&self) -> usize;

    /// Append the film positions to sample for the pixel whose bottom-left corner is `pixel`.
    fn pixel_samples(&mut self, samples: &mut Vec<Point2<Float>>, pixel: &Point2<Float>);

    /// A fresh sampler for use on another thread.
    fn clone_sampler(&self) -> Self
    where
        Self: Sized;
}

/// Samples the centers of an `n x n` grid of sub-pixels.
#[derive(Debug, Clone)]
pub struct UniformSampler {
    per_side: u32,
    step: Float,
}

impl UniformSampler {
    /// Construct a sampler that takes `per_side * per_side` samples in each pixel. At least one
    /// sample is always taken.
    pub fn new(per_side: u32) -> Self {
        let per_side = per_side.max(1);
        Self {
            per_side,
            step: 1. / per_side as Float,
        }
    }
}

impl Sampler for UniformSampler {
    fn samples_per_pixel(&self) -> usize {
        (self.per_side * self.per_side) as usize
    }

    fn pixel_samples(&mut self, samples: &mut Vec<Point2<Float>>, pixel: &Point2<Float>) {
        let half = self.step / 2.;
        for row in 0..self.per_side {
            let y = pixel.y + half + row as Float * self.step;
            for col in 0..self.per_side {
                let x = pixel.x + half + col as Float * self.step;
                samples.push(Point2::new(x, y));
            }
        }
    }

    fn clone_sampler(&self) -> Self {
        self.clone()
    }
}

#[test]
fn test_uniform_sampler() {
    let mut samples = Vec::new();

    let mut sampler = UniformSampler::new(1);
    sampler.pixel_samples(&mut samples, &Point2::new(0., 0.));
    assert_eq!(1, sampler.samples_per_pixel());
    assert_eq!(vec![Point2::new(0.5, 0.5)], samples);

    samples.clear();
    let mut sampler = UniformSampler::new(2);
    sampler.pixel_samples(&mut samples, &Point2::new(3., 1.));
    assert_eq!(4, sampler.samples_per_pixel());
    assert_eq!(
        vec![
            Point2::new(3.25, 1.25),
            Point2::new(3.75, 1.25),
            Point2::new(3.25, 1.75),
            Point2::new(3.75, 1.75),
        ],
        samples
    );

    assert_eq!(1, UniformSampler::new(0).samples_per_pixel());
}
