//! Box-neighborhood median filter.

use crate::grid;
use crate::FilterResult;
use tracing::debug;
use vox_core::Element;

/// Replaces each voxel by the median of the box neighborhood spanning
/// `radius[a]` voxels to each side along axis `a`.
///
/// Boundaries are clamped, so edge voxels see a neighborhood of the same
/// size with repeated border samples. A radius of zero along every axis
/// returns the input unchanged.
pub fn median<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    radius: [usize; D],
) -> FilterResult<Vec<T>> {
    if radius.iter().all(|&r| r == 0) {
        return Ok(input.to_vec());
    }
    debug!(?shape, ?radius, "median filter");
    let strides = grid::strides(shape);
    let offsets = grid::box_offsets(radius);
    let mid = offsets.len() / 2;

    Ok(grid::map_indices(input.len(), |i| {
        let coords = grid::coords_of(i, strides);
        let mut window: Vec<f64> = offsets
            .iter()
            .map(|&off| {
                let c = grid::shifted_clamped(coords, off, shape);
                input[grid::index_of(c, strides)].to_f64()
            })
            .collect();
        window.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        T::from_f64(window[mid])
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_radius_is_identity() {
        let input: Vec<u8> = (0..12).collect();
        let out = median(&input, [3, 4], [0, 0]).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_constant_stays_constant() {
        let input = vec![7i16; 4 * 4 * 4];
        let out = median(&input, [4, 4, 4], [1, 2, 1]).unwrap();
        assert!(out.iter().all(|&v| v == 7));
    }

    #[test]
    fn test_removes_salt_noise() {
        // A lone bright pixel in a flat field disappears under a 3x3 median.
        let mut input = vec![10u8; 5 * 5];
        input[2 * 5 + 2] = 255;
        let out = median(&input, [5, 5], [1, 1]).unwrap();
        assert!(out.iter().all(|&v| v == 10));
    }

    #[test]
    fn test_anisotropic_radius() {
        // Radius [0, 1]: median over each row triple only.
        let input = vec![
            1.0f32, 9.0, 1.0, //
            2.0, 2.0, 2.0, //
        ];
        let out = median(&input, [2, 3], [0, 1]).unwrap();
        assert_eq!(out[1], 1.0);
        assert_eq!(out[4], 2.0);
    }
}
