use bytemuck::{Pod, Zeroable};

use crate::matrix::Matrix4;

/// Everything the backend uploads before a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameUniforms {
    pub model: Matrix4,
    pub view: Matrix4,
    pub projection: Matrix4,
    pub elapsed_seconds: f32,
}

impl FrameUniforms {
    pub fn time(&self) -> TimeUniform {
        TimeUniform {
            seconds: self.elapsed_seconds,
            _padding: [0.0; 3],
        }
    }
}

/// Elapsed seconds padded to a 16-byte uniform block.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct TimeUniform {
    pub seconds: f32,
    _padding: [f32; 3],
}

/// Backend switches chosen at startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    pub depth_buffer: bool,
    pub clear_color: [f64; 4],
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            depth_buffer: true,
            clear_color: [0.0, 0.5, 1.0, 1.0],
        }
    }
}
