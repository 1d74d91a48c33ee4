//! 3-D binary skeletonization by iterative border peeling.
//!
//! Foreground is 26-connected, background 6-connected. Each cycle peels
//! simple border points from the six face directions in turn; a point is
//! simple when removing it changes neither the local foreground
//! connectivity nor the local background connectivity, so the skeleton
//! keeps the topology of the input object. Line endpoints are preserved.

use crate::grid;
use crate::FilterResult;
use tracing::debug;
use vox_core::Element;

/// Skeletonizes a binary 3-D mask.
///
/// Voxels equal to zero are background; everything else is foreground.
/// Surviving voxels keep their original values.
pub fn skeletonize<T: Element>(input: &[T], shape: [usize; 3]) -> FilterResult<Vec<T>> {
    let strides = grid::strides(shape);
    let mut fg: Vec<bool> = input.iter().map(|v| v.to_f64() != 0.0).collect();

    let directions: [[i64; 3]; 6] = [
        [1, 0, 0],
        [-1, 0, 0],
        [0, 1, 0],
        [0, -1, 0],
        [0, 0, 1],
        [0, 0, -1],
    ];

    let mut cycle = 0usize;
    loop {
        let mut removed_in_cycle = 0usize;
        for dir in directions {
            // Border points open toward this direction.
            let candidates: Vec<usize> = (0..fg.len())
                .filter(|&i| {
                    if !fg[i] {
                        return false;
                    }
                    let c = grid::coords_of(i, strides);
                    match grid::shifted(c, dir, shape) {
                        Some(nc) => !fg[grid::index_of(nc, strides)],
                        None => true,
                    }
                })
                .collect();
            // Sequential re-checked deletion keeps the object connected
            // even when neighboring candidates interact.
            for i in candidates {
                let c = grid::coords_of(i, strides);
                let hood = neighborhood(&fg, c, shape, strides);
                if is_simple(&hood) {
                    fg[i] = false;
                    removed_in_cycle += 1;
                }
            }
        }
        cycle += 1;
        debug!(cycle, removed = removed_in_cycle, "thinning cycle");
        if removed_in_cycle == 0 {
            break;
        }
    }

    Ok(input
        .iter()
        .zip(&fg)
        .map(|(&v, &keep)| if keep { v } else { T::default() })
        .collect())
}

/// The 3x3x3 neighborhood as a flat 27-cell mask; out-of-bounds cells are
/// background. Cell order is `(d0+1)*9 + (d1+1)*3 + (d2+1)`.
fn neighborhood(
    fg: &[bool],
    center: [usize; 3],
    shape: [usize; 3],
    strides: [usize; 3],
) -> [bool; 27] {
    let mut hood = [false; 27];
    for d0 in -1i64..=1 {
        for d1 in -1i64..=1 {
            for d2 in -1i64..=1 {
                let slot = ((d0 + 1) * 9 + (d1 + 1) * 3 + (d2 + 1)) as usize;
                if let Some(c) = grid::shifted(center, [d0, d1, d2], shape) {
                    hood[slot] = fg[grid::index_of(c, strides)];
                }
            }
        }
    }
    hood
}

const CENTER: usize = 13;

fn cell_coords(slot: usize) -> [i64; 3] {
    [
        (slot / 9) as i64 - 1,
        ((slot / 3) % 3) as i64 - 1,
        (slot % 3) as i64 - 1,
    ]
}

fn adjacent(a: usize, b: usize, max_dist2: i64) -> bool {
    let ca = cell_coords(a);
    let cb = cell_coords(b);
    let mut d2 = 0;
    for k in 0..3 {
        let d = ca[k] - cb[k];
        if d.abs() > 1 {
            return false;
        }
        d2 += d * d;
    }
    d2 > 0 && d2 <= max_dist2
}

/// Counts connected components among the flagged cells, using neighbor
/// squared-distance `max_dist2` (3 = 26-connectivity, 1 = 6-connectivity).
fn component_count(cells: &[usize], max_dist2: i64) -> usize {
    let mut seen = vec![false; cells.len()];
    let mut components = 0;
    for start in 0..cells.len() {
        if seen[start] {
            continue;
        }
        components += 1;
        let mut stack = vec![start];
        seen[start] = true;
        while let Some(a) = stack.pop() {
            for b in 0..cells.len() {
                if !seen[b] && adjacent(cells[a], cells[b], max_dist2) {
                    seen[b] = true;
                    stack.push(b);
                }
            }
        }
    }
    components
}

/// Simple-point test on a 27-cell neighborhood.
///
/// The center is deletable when the foreground of the punctured
/// neighborhood forms exactly one 26-component, and the background
/// touching the center's faces forms exactly one 6-component within the
/// 18-neighborhood. Isolated points and line endpoints fail the test.
fn is_simple(hood: &[bool; 27]) -> bool {
    // Foreground cells around the center.
    let fg_cells: Vec<usize> = (0..27).filter(|&s| s != CENTER && hood[s]).collect();
    if fg_cells.len() <= 1 {
        // Isolated point or endpoint: never removed.
        return false;
    }
    if component_count(&fg_cells, 3) != 1 {
        return false;
    }

    // Background cells of the 18-neighborhood.
    let bg_cells: Vec<usize> = (0..27)
        .filter(|&s| {
            if s == CENTER || hood[s] {
                return false;
            }
            let c = cell_coords(s);
            c.iter().map(|&v| v * v).sum::<i64>() <= 2
        })
        .collect();
    // Keep only the 6-component(s) touching a face of the center.
    if bg_cells.is_empty() {
        // Interior point: removal would open a cavity.
        return false;
    }
    let touches_face = |slot: usize| -> bool {
        let c = cell_coords(slot);
        c.iter().map(|&v| v * v).sum::<i64>() == 1
    };
    if !bg_cells.iter().any(|&s| touches_face(s)) {
        return false;
    }
    // Count 6-components of the 18-neighborhood background that contain a
    // face cell.
    let mut seen = vec![false; bg_cells.len()];
    let mut face_components = 0;
    for start in 0..bg_cells.len() {
        if seen[start] {
            continue;
        }
        let mut stack = vec![start];
        seen[start] = true;
        let mut has_face = touches_face(bg_cells[start]);
        while let Some(a) = stack.pop() {
            for b in 0..bg_cells.len() {
                if !seen[b] && adjacent(bg_cells[a], bg_cells[b], 1) {
                    seen[b] = true;
                    has_face = has_face || touches_face(bg_cells[b]);
                    stack.push(b);
                }
            }
        }
        if has_face {
            face_components += 1;
        }
    }
    face_components == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_voxel_survives() {
        let mut input = vec![0u8; 5 * 5 * 5];
        input[2 * 25 + 2 * 5 + 2] = 1;
        let out = skeletonize(&input, [5, 5, 5]).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_thin_line_is_stable() {
        let shape = [7, 5, 5];
        let strides = grid::strides(shape);
        let mut input = vec![0u8; grid::volume(shape)];
        for x in 1..6 {
            input[grid::index_of([x, 2, 2], strides)] = 1;
        }
        let out = skeletonize(&input, shape).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn test_block_thins_to_curve() {
        let shape = [7, 7, 7];
        let strides = grid::strides(shape);
        let mut input = vec![0u8; grid::volume(shape)];
        for x in 1..6 {
            for y in 2..5 {
                for z in 2..5 {
                    input[grid::index_of([x, y, z], strides)] = 1;
                }
            }
        }
        let before = input.iter().filter(|&&v| v != 0).count();
        let out = skeletonize(&input, shape).unwrap();
        let after = out.iter().filter(|&&v| v != 0).count();
        assert!(after > 0);
        assert!(after < before);
        // Skeleton is a subset of the object.
        for i in 0..input.len() {
            assert!(input[i] != 0 || out[i] == 0);
        }
    }

    #[test]
    fn test_values_survive_untouched() {
        let mut input = vec![0i16; 5 * 5 * 5];
        input[2 * 25 + 2 * 5 + 2] = -7;
        let out = skeletonize(&input, [5, 5, 5]).unwrap();
        assert_eq!(out[2 * 25 + 2 * 5 + 2], -7);
    }
}
