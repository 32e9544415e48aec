pub mod frame_compositor;
pub mod overlay_style;
