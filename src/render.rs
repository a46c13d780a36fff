use crossbeam::{channel, thread};
use log::debug;
use nalgebra::Point2;

use crate::{
    camera::{Camera, CanvasInfo, Sample},
    canvas::{Canvas, Color},
    ray::Ray,
    sampler::Sampler,
    solid::Solid,
    texture::NormalTexture,
};

/// Width and height of the square tiles handed to workers.
const TILE_SIZE: u32 = 16;

/// An individual tile in the rendering target.
#[derive(Debug, PartialEq)]
struct Tile {
    offset_x: u32,
    offset_y: u32,
    width: u32,
    height: u32,
}

/// An iterator for tiles in a rendering target.
#[derive(Debug)]
struct Tiles {
    width: u32,
    height: u32,
    chunks_x: u32,
    chunks_y: u32,
    x: u32,
    y: u32,
}

impl Tiles {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            chunks_x: width.div_ceil(TILE_SIZE),
            chunks_y: height.div_ceil(TILE_SIZE),
            x: 0,
            y: 0,
        }
    }

    fn total(&self) -> u32 {
        self.chunks_x * self.chunks_y
    }
}

impl Iterator for Tiles {
    type Item = Tile;

    fn next(&mut self) -> Option<Self::Item> {
        if self.x >= self.chunks_x {
            self.x = 0;
            self.y += 1;
        }

        if self.chunks_x == 0 || self.y >= self.chunks_y {
            return None;
        }

        let offset_x = self.x * TILE_SIZE;
        let offset_y = self.y * TILE_SIZE;
        self.x += 1;

        Some(Tile {
            offset_x,
            offset_y,
            width: (self.width - offset_x).min(TILE_SIZE),
            height: (self.height - offset_y).min(TILE_SIZE),
        })
    }
}

/// The color seen along `ray`: the first surface it enters, colored by its normal, or black if
/// it never enters the solid.
pub fn shade<S: Solid + ?Sized>(solid: &S, ray: &Ray) -> Color {
    let crossings = solid.intersect(ray);
    let Some(mut hit) = crossings.into_iter().find(|crossing| crossing.enter) else {
        return Color::black();
    };

    solid.complete_intersection(&mut hit);
    match hit.normal {
        Some(normal) => NormalTexture::new().color(&normal),
        None => Color::black(),
    }
}

/// Render `solid` as seen through `camera`, splitting the image into tiles that are shaded on
/// `num_threads` worker threads.
pub fn render<S, C, P>(
    info: &CanvasInfo,
    solid: &S,
    camera: &C,
    sampler: P,
    num_threads: usize,
) -> Canvas
where
    S: Solid + Sync + ?Sized,
    C: Camera + Sync,
    P: Sampler,
{
    let mut canvas = info.new_canvas();

    let tiles = Tiles::new(info.width, info.height);
    debug!(
        "rendering {}x{} as {} tiles on {} threads",
        info.width,
        info.height,
        tiles.total(),
        num_threads
    );

    let (input, queue): (_, channel::Receiver<Tile>) = channel::unbounded();
    let (results, chunks) = channel::unbounded();

    thread::scope(|s| {
        for _ in 0..num_threads.max(1) {
            let mut sampler = sampler.clone_sampler();
            let results = results.clone();
            let queue = queue.clone();
            s.spawn(move |_| {
                let mut samples = Vec::with_capacity(sampler.samples_per_pixel());
                let inv_num_samples = 1. / (sampler.samples_per_pixel() as f32);
                for tile in queue {
                    let mut chunk = Canvas::new(tile.width, tile.height);

                    for ((col, row), pixel) in chunk.coords().zip(chunk.pixels_mut()) {
                        samples.clear();
                        sampler.pixel_samples(
                            &mut samples,
                            &Point2::new(
                                (col + tile.offset_x).into(),
                                (row + tile.offset_y).into(),
                            ),
                        );
                        for sample in &samples {
                            let ray = camera.generate_ray(&Sample::new(sample.x, sample.y));
                            *pixel += shade(solid, &ray);
                        }

                        *pixel *= inv_num_samples;
                    }

                    if results.send((tile.offset_x, tile.offset_y, chunk)).is_err() {
                        break;
                    }
                }
            });
        }

        // only the workers hold senders now, so `chunks` ends once they're all done.
        drop(results);

        s.spawn(move |_| {
            for tile in tiles {
                if input.send(tile).is_err() {
                    break;
                }
            }
        });

        for (offset_x, offset_y, chunk) in chunks {
            canvas.blit(offset_x, offset_y, &chunk)
        }
    })
    .unwrap_or_else(|err| std::panic::resume_unwind(err));

    canvas
}
