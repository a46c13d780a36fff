#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::new(0., 0., 0.)
    }

    pub fn white() -> Self {
        Self::new(1., 1., 1.)
    }

    pub fn to_u8(&self) -> [u8; 3] {
        let convert = |x: f32| (x * 255.0).clamp(0.0, 255.0) as u8;
        [convert(self.r), convert(self.g), convert(self.b)]
    }

    /// Convert the [`Color`] to grayscale.
    pub fn to_grayscale(&self) -> f32 {
        0.3 * self.r + 0.59 * self.g + 0.11 * self.b
    }
}

impl std::ops::AddAssign for Color {
    fn add_assign(&mut self, rhs: Color) {
        self.r += rhs.r;
        self.g += rhs.g;
        self.b += rhs.b;
    }
}

impl std::ops::MulAssign<f32> for Color {
    fn mul_assign(&mut self, rhs: f32) {
        self.r *= rhs;
        self.g *= rhs;
        self.b *= rhs;
    }
}

/// A buffer of color data, with the bottom-left being `(0,0)`.
#[derive(Debug, Clone)]
pub struct Canvas {
    width: u32,
    height: u32,
    buffer: Vec<Color>,
}

impl Canvas {
    /// Construct a new [`Canvas`] filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            buffer: vec![Color::black(); Self::pixel_count(width, height)],
        }
    }

    fn pixel_count(width: u32, height: u32) -> usize {
        width as usize * height as usize
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (self.width as usize) * (y as usize) + (x as usize)
    }

    pub fn get(&self, x: u32, y: u32) -> &Color {
        &self.buffer[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: u32, y: u32) -> &mut Color {
        let ix = self.index(x, y);
        &mut self.buffer[ix]
    }

    /// The `(x, y)` coordinates of every pixel, in the same order as `pixels_mut`.
    pub fn coords(&self) -> impl Iterator<Item = (u32, u32)> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| (x, y)))
    }

    pub fn pixels_mut(&mut self) -> impl Iterator<Item = &mut Color> {
        self.buffer.iter_mut()
    }

    /// Copy `other` into this canvas with its bottom-left corner at `(x, y)`.
    pub fn blit(&mut self, x: u32, y: u32, other: &Canvas) {
        for row in 0..other.height {
            let src = other.index(0, row);
            let dst = self.index(x, y + row);
            let len = other.width as usize;
            self.buffer[dst..dst + len].copy_from_slice(&other.buffer[src..src + len]);
        }
    }

    /// Rows of the image from the top down, which is the order image formats expect.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.buffer.chunks(self.width as usize).rev()
    }

    /// Return raw RGB8 data for the image.
    pub fn data(&self) -> Vec<u8> {
        self.rows()
            .flat_map(|row| row.iter().flat_map(|color| color.to_u8()))
            .collect()
    }

    /// Return an ascii version of the [`Canvas`].
    pub fn to_ascii(&self) -> String {
        let palette = r#" .'`^",:;Il!i><~+_-?][}{1)(|\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$"#;
        let bytes = palette.as_bytes();
        let bound = (palette.len() - 1) as f32;

        let mut buf = String::new();
        for row in self.rows() {
            for color in row {
                let index = (color.to_grayscale().clamp(0., 1.) * bound).round() as usize;
                buf.push(bytes[index] as char);
            }
            buf.push('\n');
        }

        buf
    }
}
