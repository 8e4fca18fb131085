//! Math utilities and types
//!
//! Layout works in 2D pixel space with +Y pointing up. Vertex positions are
//! carried as 3D vectors so they can be handed to a world matrix directly.

pub use nalgebra::{Rotation2, Vector2, Vector3, Vector4, Matrix4};
use serde::{Deserialize, Serialize};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type, also used for RGBA colours in 0..1
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Axis aligned rectangle with its origin at the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Bottom edge
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge
    pub fn x_max(&self) -> f32 {
        self.x + self.width
    }

    /// Top edge
    pub fn y_max(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.x_max() && point.y >= self.y && point.y <= self.y_max()
    }
}

/// Rotate a 2D vector counter-clockwise by `degrees`
pub fn rotate_degrees(v: Vec2, degrees: f32) -> Vec2 {
    Rotation2::new(degrees.to_radians()) * v
}

/// Round to two decimal places, the precision measured sizes are reported at
pub fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}
