//! The software rendering pipeline.

pub mod framebuffer;
pub mod raster;
pub mod renderer;

pub use framebuffer::{FrameBuffer, CLEAR_COLOR};
pub use renderer::Renderer;
