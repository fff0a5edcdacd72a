//! Conversion between the scene's axes (Y forward, Z up) and the axes a
//! mesh file is written with.

use anyhow::Result;

use crate::{error::Error, Axis};

/// Rotation taking scene coordinates to file coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisConversion {
    right: [f32; 3],
    forward: [f32; 3],
    up: [f32; 3],
}

impl AxisConversion {
    /// Conversion to a file whose forward and up axes are given. The right
    /// axis is `forward x up`, so the result never mirrors the mesh.
    pub fn new(forward: Axis, up: Axis) -> Result<Self> {
        let (f, u) = (forward.vector(), up.vector());
        let right = cross(f, u);
        if right == [0.0; 3] {
            return Err(Error::InvalidAxes {
                forward: forward.to_string(),
                up: up.to_string(),
            }
            .into());
        }
        Ok(Self { right, forward: f, up: u })
    }

    /// Scene point to file point.
    pub fn apply(&self, [x, y, z]: [f32; 3]) -> [f32; 3] {
        let mut out = [0.0; 3];
        for (i, o) in out.iter_mut().enumerate() {
            *o = x * self.right[i] + y * self.forward[i] + z * self.up[i];
        }
        out
    }

    /// File point back to scene point.
    pub fn invert(&self, p: [f32; 3]) -> [f32; 3] {
        [dot(self.right, p), dot(self.forward, p), dot(self.up, p)]
    }

    /// Is this the identity?
    pub fn is_identity(&self) -> bool {
        self.right == [1.0, 0.0, 0.0] && self.forward == [0.0, 1.0, 0.0] && self.up == [0.0, 0.0, 1.0]
    }
}

pub(crate) fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// Unit normal of a triangle, zero for degenerate triangles.
pub(crate) fn face_normal(a: [f32; 3], b: [f32; 3], c: [f32; 3]) -> [f32; 3] {
    let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
    let n = cross(ab, ac);
    let len = dot(n, n).sqrt();
    if len == 0.0 {
        [0.0; 3]
    } else {
        [n[0] / len, n[1] / len, n[2] / len]
    }
}
