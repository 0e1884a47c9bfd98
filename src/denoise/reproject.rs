//! Reprojection of the accumulated history into the current frame.
//!
//! No motion vectors are stored; correspondence is recovered per pixel from
//! the object transforms. The chain is
//!
//! ```text
//! current world → object local → previous world → previous screen
//! ```
//!
//! which answers "where was this surface point last frame". Disocclusions
//! show up as an object-id mismatch or an off-screen coordinate and are
//! marked invalid. History is fetched with a nearest-pixel (truncated)
//! lookup.

use rayon::prelude::*;

use crate::buffer::Buffer2D;
use crate::frame::FrameInfo;
use crate::util::Vec3;

/// For every pixel of `frame`, write its reprojection validity into `valid`
/// and, when valid, the previous accumulated color into `misc`.
///
/// The caller swaps `misc` into the accumulated color afterwards; writing
/// into the scratch buffer keeps the pass free of read-after-write hazards.
pub(crate) fn reproject(
    frame: &FrameInfo,
    prev: &FrameInfo,
    acc_color: &Buffer2D<Vec3>,
    misc: &mut Buffer2D<Vec3>,
    valid: &mut Buffer2D<bool>,
) {
    let _span = tracing::info_span!("reproject").entered();
    let width = frame.width();
    let pre_world_to_screen = *prev.world_to_screen();

    misc.par_rows_mut()
        .zip(valid.par_rows_mut())
        .enumerate()
        .for_each(|(y, (color_row, valid_row))| {
            for x in 0..width {
                valid_row[x] = false;
                color_row[x] = Vec3::ZERO;

                let id = frame.object_id().get(x, y);
                if id < 0.0 {
                    // Background pixel, nothing to reproject.
                    continue;
                }
                let index = id as usize;
                let (Some(cur_obj_to_world), Some(pre_obj_to_world)) =
                    (frame.object_to_world(index), prev.object_to_world(index))
                else {
                    // Id without a transform entry: no correspondence.
                    continue;
                };

                let pos = frame.position().get(x, y);
                let local = cur_obj_to_world.inverse().transform_point3(pos);
                let pre_world = pre_obj_to_world.transform_point3(local);
                let pre_screen = pre_world_to_screen.project_point3(pre_world);

                let px = pre_screen.x as i32;
                let py = pre_screen.y as i32;
                if !acc_color.contains(px, py) {
                    continue;
                }
                let (px, py) = (px as usize, py as usize);
                if prev.object_id().get(px, py) == id {
                    valid_row[x] = true;
                    color_row[x] = acc_color.get(px, py);
                }
            }
        });
}
