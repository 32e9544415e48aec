pub mod raster;
pub mod skeleton_compositor;
