//! Row-major 4x4 matrices for the model/view/projection uniforms.
//!
//! Translations and rotations are laid out for column-vector application
//! (`M · v`), so `translate(x, y, z)` carries the offset in the last column.
//! The perspective projection keeps the layout the shader was written
//! against, which is read as a row vector times the matrix (`v · P`).

use std::ops::Mul;

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Sixteen `f32` values, row `r` column `c` stored at index `r * 4 + c`.
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix4([f32; 16]);

impl Matrix4 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ]);

    /// Wraps sixteen row-major values.
    pub const fn from_rows_array(values: [f32; 16]) -> Self {
        Self(values)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[row * 4 + col]
    }

    pub fn row(&self, row: usize) -> [f32; 4] {
        let start = row * 4;
        [
            self.0[start],
            self.0[start + 1],
            self.0[start + 2],
            self.0[start + 3],
        ]
    }

    pub fn col(&self, col: usize) -> [f32; 4] {
        [self.0[col], self.0[4 + col], self.0[8 + col], self.0[12 + col]]
    }

    pub fn as_array(&self) -> &[f32; 16] {
        &self.0
    }

    /// Raw bytes in row-major order, ready for a 64-byte uniform buffer.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn transpose(&self) -> Self {
        let mut out = [0.0; 16];
        for r in 0..4 {
            for c in 0..4 {
                out[c * 4 + r] = self.0[r * 4 + c];
            }
        }
        Self(out)
    }

    /// Applies the matrix to a column vector (`M · v`).
    pub fn transform(&self, v: Vec4) -> Vec4 {
        let v = v.to_array();
        let dot = |row: [f32; 4]| row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
        Vec4::new(
            dot(self.row(0)),
            dot(self.row(1)),
            dot(self.row(2)),
            dot(self.row(3)),
        )
    }

    /// Element-wise comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Matrix4 {
        multiply(&self, &rhs)
    }
}

pub fn identity() -> Matrix4 {
    Matrix4::IDENTITY
}

/// Row-major product: `result[r][c] = Σ_k a[r][k] * b[k][c]`.
pub fn multiply(a: &Matrix4, b: &Matrix4) -> Matrix4 {
    let mut out = [0.0; 16];
    for r in 0..4 {
        for c in 0..4 {
            out[r * 4 + c] = (0..4).map(|k| a.get(r, k) * b.get(k, c)).sum();
        }
    }
    Matrix4(out)
}

pub fn translate(x: f32, y: f32, z: f32) -> Matrix4 {
    Matrix4([
        1.0, 0.0, 0.0, x, //
        0.0, 1.0, 0.0, y, //
        0.0, 0.0, 1.0, z, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Right-handed rotation about the X axis.
pub fn rotate_x(radians: f32) -> Matrix4 {
    let (s, c) = radians.sin_cos();
    Matrix4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, c, -s, 0.0, //
        0.0, s, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Right-handed rotation about the Y axis.
pub fn rotate_y(radians: f32) -> Matrix4 {
    let (s, c) = radians.sin_cos();
    Matrix4([
        c, 0.0, s, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        -s, 0.0, c, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

/// Perspective projection mapping view depth `-z_near..-z_far` onto clip
/// depth `0..1` when applied as `v · P`.
///
/// `z_near == z_far` divides by zero; callers are expected to pass distinct
/// planes.
pub fn perspective_projection(fov_y: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Matrix4 {
    let f = (std::f32::consts::FRAC_PI_2 - 0.5 * fov_y).tan();
    let range = z_near - z_far;
    Matrix4([
        f / aspect_ratio,
        0.0,
        0.0,
        0.0,
        0.0,
        f,
        0.0,
        0.0,
        0.0,
        0.0,
        z_far / range,
        -1.0,
        0.0,
        0.0,
        z_far * z_near / range,
        0.0,
    ])
}
