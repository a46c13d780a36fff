pub mod bounding_sphere;
pub mod camera;
pub mod canvas;
pub mod estimate;
pub mod float;
pub mod march;
pub mod normal;
pub mod params;
pub mod quaternion;
pub mod ray;
pub mod render;
pub mod sampler;
pub mod solid;
pub mod texture;
