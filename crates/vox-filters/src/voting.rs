//! Iterative binary hole filling by majority voting.

use crate::grid;
use crate::FilterResult;
use tracing::debug;
use vox_core::Element;

/// Fills holes and cavities in a binary mask.
///
/// Each pass, a background voxel flips to foreground when the number of
/// foreground voxels in its box neighborhood exceeds half the neighborhood
/// plus `majority`. Passes repeat until nothing changes or
/// `max_iterations` is reached. Foreground voxels never flip back.
pub fn fill_holes<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    radius: [usize; D],
    max_iterations: usize,
    majority: usize,
    background: T,
    foreground: T,
) -> FilterResult<Vec<T>> {
    let strides = grid::strides(shape);
    let offsets: Vec<[i64; D]> = grid::box_offsets(radius)
        .into_iter()
        .filter(|off| off.iter().any(|&o| o != 0))
        .collect();
    // Birth rule: more than half the neighbors, plus the majority margin.
    let threshold = offsets.len() / 2 + majority;
    let bg = background.to_f64();
    let fg = foreground.to_f64();

    let mut current = input.to_vec();
    for pass in 0..max_iterations {
        let mut next = current.clone();
        let mut flipped = 0usize;
        for i in 0..current.len() {
            if current[i].to_f64() != bg {
                continue;
            }
            let coords = grid::coords_of(i, strides);
            let votes = offsets
                .iter()
                .filter(|&&off| match grid::shifted(coords, off, shape) {
                    Some(c) => current[grid::index_of(c, strides)].to_f64() == fg,
                    None => false,
                })
                .count();
            if votes >= threshold {
                next[i] = foreground;
                flipped += 1;
            }
        }
        current = next;
        debug!(pass, flipped, "hole-filling pass");
        if flipped == 0 {
            break;
        }
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fills_single_pixel_hole() {
        // 3x3 ring of foreground with a hole in the middle.
        let input = vec![
            1u8, 1, 1, //
            1, 0, 1, //
            1, 1, 1, //
        ];
        let out = fill_holes(&input, [3, 3], [1, 1], 1, 2, 0u8, 1u8).unwrap();
        assert_eq!(out[4], 1);
    }

    #[test]
    fn test_leaves_open_background_alone() {
        let mut input = vec![0u8; 7 * 7];
        input[3 * 7 + 3] = 1;
        let out = fill_holes(&input, [7, 7], [1, 1], 3, 2, 0u8, 1u8).unwrap();
        // One foreground voxel cannot out-vote the threshold anywhere.
        assert_eq!(out.iter().filter(|&&v| v == 1).count(), 1);
    }

    #[test]
    fn test_iterates_until_stable() {
        // A 3-wide slot closes from both ends, one voxel per pass.
        let mut input = vec![1u8; 5 * 7];
        input[2 * 7 + 2] = 0;
        input[2 * 7 + 3] = 0;
        input[2 * 7 + 4] = 0;
        let one_pass = fill_holes(&input, [5, 7], [1, 1], 1, 3, 0u8, 1u8).unwrap();
        assert_eq!(one_pass.iter().filter(|&&v| v == 0).count(), 1);
        let stable = fill_holes(&input, [5, 7], [1, 1], 10, 3, 0u8, 1u8).unwrap();
        assert!(stable.iter().all(|&v| v == 1));
    }
}
