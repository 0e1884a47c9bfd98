//! Per-frame snapshot of renderer output.
//!
//! A [`FrameInfo`] bundles the noisy beauty image with the auxiliary
//! geometric channels (normal, depth, world position, object id) and the
//! frame's transform table. It is immutable once built; the denoiser keeps
//! its own clone of the previous frame's snapshot across frames.

use crate::buffer::Buffer2D;
use crate::util::{Error, Mat4, Result, Vec3};

/// Object id value marking background pixels (no surface hit).
pub const BACKGROUND_ID: f32 = -1.0;

/// All per-pixel channels and transforms of one rendered frame.
///
/// The transform table holds one object-to-world matrix per scene object,
/// indexed by object id, followed by the frame's world-to-camera and
/// world-to-screen matrices as the final two entries.
#[derive(Clone, Debug)]
pub struct FrameInfo {
    beauty: Buffer2D<Vec3>,
    normal: Buffer2D<Vec3>,
    depth: Buffer2D<f32>,
    position: Buffer2D<Vec3>,
    object_id: Buffer2D<f32>,
    matrices: Vec<Mat4>,
}

impl FrameInfo {
    /// Assemble a snapshot, validating that every channel shares one
    /// resolution and that the camera matrices are present.
    pub fn new(
        beauty: Buffer2D<Vec3>,
        normal: Buffer2D<Vec3>,
        depth: Buffer2D<f32>,
        position: Buffer2D<Vec3>,
        object_id: Buffer2D<f32>,
        matrices: Vec<Mat4>,
    ) -> Result<Self> {
        let expected = beauty.dimensions();
        let check = |name: &'static str, actual: (usize, usize)| -> Result<()> {
            if actual != expected {
                return Err(Error::DimensionMismatch {
                    buffer: name,
                    expected,
                    actual,
                });
            }
            Ok(())
        };
        check("normal", normal.dimensions())?;
        check("depth", depth.dimensions())?;
        check("position", position.dimensions())?;
        check("object_id", object_id.dimensions())?;

        if matrices.len() < 2 {
            return Err(Error::MissingMatrices {
                count: matrices.len(),
            });
        }

        Ok(Self {
            beauty,
            normal,
            depth,
            position,
            object_id,
            matrices,
        })
    }

    /// Frame width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.beauty.width()
    }

    /// Frame height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.beauty.height()
    }

    /// `(width, height)` pair.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        self.beauty.dimensions()
    }

    /// Noisy path-traced color.
    #[inline]
    pub fn beauty(&self) -> &Buffer2D<Vec3> {
        &self.beauty
    }

    /// World-space surface normals (unit length).
    #[inline]
    pub fn normal(&self) -> &Buffer2D<Vec3> {
        &self.normal
    }

    /// Camera-space depth.
    #[inline]
    pub fn depth(&self) -> &Buffer2D<f32> {
        &self.depth
    }

    /// World-space hit positions.
    #[inline]
    pub fn position(&self) -> &Buffer2D<Vec3> {
        &self.position
    }

    /// Per-pixel object id; [`BACKGROUND_ID`] where no surface was hit.
    #[inline]
    pub fn object_id(&self) -> &Buffer2D<f32> {
        &self.object_id
    }

    /// This frame's world-to-camera matrix.
    #[inline]
    pub fn world_to_camera(&self) -> &Mat4 {
        &self.matrices[self.matrices.len() - 2]
    }

    /// This frame's world-to-screen matrix (includes the camera transform).
    #[inline]
    pub fn world_to_screen(&self) -> &Mat4 {
        &self.matrices[self.matrices.len() - 1]
    }

    /// Object-to-world transform for an object id, or `None` when the id has
    /// no entry in this frame's table.
    #[inline]
    pub fn object_to_world(&self, id: usize) -> Option<&Mat4> {
        // The final two entries are camera matrices, not objects.
        self.matrices[..self.matrices.len() - 2].get(id)
    }

    /// Number of object transforms in the table.
    #[inline]
    pub fn object_count(&self) -> usize {
        self.matrices.len() - 2
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Frame with a single static object: uniform beauty color, +Z normals,
    /// world positions equal to pixel coordinates on the z = 1 plane, and
    /// identity transforms. With an identity world-to-screen matrix every
    /// pixel reprojects onto itself.
    pub(crate) fn uniform_frame(width: usize, height: usize, color: Vec3) -> FrameInfo {
        FrameInfo::new(
            Buffer2D::from_fn(width, height, |_, _| color),
            Buffer2D::from_fn(width, height, |_, _| Vec3::Z),
            Buffer2D::from_fn(width, height, |_, _| 1.0),
            Buffer2D::from_fn(width, height, |x, y| Vec3::new(x as f32, y as f32, 1.0)),
            Buffer2D::from_fn(width, height, |_, _| 0.0),
            vec![Mat4::IDENTITY; 3],
        )
        .expect("valid test frame")
    }
}
