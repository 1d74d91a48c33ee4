//! Binary dilation and erosion with an ellipsoidal structuring element.
//!
//! Only voxels equal to the caller's foreground value participate; all
//! other values pass through unchanged. This matches segmentations that
//! carry several labels in one mask.

use crate::grid;
use crate::FilterResult;
use tracing::debug;
use vox_core::Element;

/// Dilates the foreground by a Euclidean ball of the given radius.
///
/// Radius zero is the identity. Voxels whose value equals `foreground`
/// stamp the ball around themselves; the stamped voxels take the
/// foreground value.
pub fn dilate<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    radius: usize,
    foreground: T,
) -> FilterResult<Vec<T>> {
    if radius == 0 {
        return Ok(input.to_vec());
    }
    debug!(?shape, radius, "binary dilate");
    let strides = grid::strides(shape);
    let ball = grid::ball_offsets::<D>(radius);
    let fg = foreground.to_f64();

    let mut out = input.to_vec();
    for i in 0..input.len() {
        if input[i].to_f64() != fg {
            continue;
        }
        let coords = grid::coords_of(i, strides);
        for &off in &ball {
            if let Some(c) = grid::shifted(coords, off, shape) {
                out[grid::index_of(c, strides)] = foreground;
            }
        }
    }
    Ok(out)
}

/// Erodes the foreground by a Euclidean ball of the given radius.
///
/// A foreground voxel survives only if every in-bounds ball neighbor is
/// foreground too; eroded voxels become the element type's zero value.
/// Out-of-bounds neighbors count as foreground, so objects touching the
/// border are not eaten from outside the image.
pub fn erode<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    radius: usize,
    foreground: T,
) -> FilterResult<Vec<T>> {
    if radius == 0 {
        return Ok(input.to_vec());
    }
    debug!(?shape, radius, "binary erode");
    let strides = grid::strides(shape);
    let ball = grid::ball_offsets::<D>(radius);
    let fg = foreground.to_f64();

    let mut out = input.to_vec();
    for i in 0..input.len() {
        if input[i].to_f64() != fg {
            continue;
        }
        let coords = grid::coords_of(i, strides);
        let survives = ball.iter().all(|&off| match grid::shifted(coords, off, shape) {
            Some(c) => input[grid::index_of(c, strides)].to_f64() == fg,
            None => true,
        });
        if !survives {
            out[i] = T::default();
        }
    }
    Ok(out)
}
