mod common;
mod native;
mod shared;

pub use common::{FrameUniforms, RenderOptions, TimeUniform};
pub use native::Renderer;
pub use shared::{vertex_layout, SHADER};
