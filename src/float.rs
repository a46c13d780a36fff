/// The scalar used for all geometry and fractal iteration. Finite-difference normals need the
/// extra precision, so this is `f64` rather than the `f32` used for colors.
pub type Float = f64;
