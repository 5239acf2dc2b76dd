pub mod batch;
pub mod normalize;
pub mod rasterize;
pub mod render;
