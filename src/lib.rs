//! Minimal real-time cube viewer.
//!
//! The crate splits into pure building blocks (row-major matrices, mesh
//! construction and parsing, camera state) and a thin wgpu backend that
//! receives the resulting buffers and uniforms. Everything except
//! [`Renderer`] runs without a display so it can be driven from tests.

pub mod app;
pub mod input;
pub mod matrix;
pub mod mesh;
pub mod render;
pub mod scene;

pub use app::{describe_camera, FrameDriver};
pub use input::{PointerLook, MOUSE_SENSITIVITY};
pub use matrix::Matrix4;
pub use mesh::{Mesh, MeshError, Vertex};
pub use render::{FrameUniforms, RenderOptions, Renderer};
pub use scene::{Lens, Rotation, SceneState, Transform};
