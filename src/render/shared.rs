use crate::mesh::Vertex;

/// Matrices arrive as row-major bytes, which WGSL reads column-major. That
/// makes `v * m` apply the model and view matrices as `M · v`, while
/// `projection * x` applies the projection as `x · P`.
///
/// The projection is deliberately applied on the left rather than appended
/// as `(... * view) * projection`. The appended form would apply it as
/// `P · x`, which for this layout neither divides by `-z` nor lands the near
/// and far planes on depth 0 and 1.
pub const SHADER: &str = r#"
@group(0) @binding(0) var<uniform> model: mat4x4<f32>;
@group(0) @binding(1) var<uniform> view: mat4x4<f32>;
@group(0) @binding(2) var<uniform> projection: mat4x4<f32>;

@group(1) @binding(0) var<uniform> t: f32;

struct VertexOut {
    @builtin(position) position: vec4<f32>,
    @location(0) color: vec4<f32>,
}

@vertex
fn vs_main(@location(0) position: vec4<f32>, @location(1) color: vec4<f32>) -> VertexOut {
    var out: VertexOut;
    out.position = projection * ((position * model) * view);
    out.color = color;
    return out;
}

@fragment
fn fs_main(frag: VertexOut) -> @location(0) vec4<f32> {
    return frag.color;
}
"#;

pub(crate) const MATRIX_BYTES: u64 = 64;

static VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: Vertex::POSITION_OFFSET,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x4,
        offset: Vertex::COLOR_OFFSET,
        shader_location: 1,
    },
];

/// Interleaved position/color layout for [`Vertex`].
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: Vertex::STRIDE,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &VERTEX_ATTRIBUTES,
    }
}

pub(crate) fn uniform_entry(
    binding: u32,
    visibility: wgpu::ShaderStages,
    min_size: u64,
) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(min_size),
        },
        count: None,
    }
}
