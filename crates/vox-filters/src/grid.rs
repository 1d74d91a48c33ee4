//! Indexing helpers for flat row-major N-dimensional buffers.
//!
//! Shapes and coordinates are fixed-size arrays so the compiler can unroll
//! the per-axis loops in each monomorphized specialization.

/// Row-major strides for a shape; the last axis is fastest.
#[inline]
pub fn strides<const D: usize>(shape: [usize; D]) -> [usize; D] {
    let mut s = [1usize; D];
    let mut a = D - 1;
    while a > 0 {
        s[a - 1] = s[a] * shape[a];
        a -= 1;
    }
    s
}

/// Total number of voxels in a shape.
#[inline]
pub fn volume<const D: usize>(shape: [usize; D]) -> usize {
    shape.iter().product()
}

/// Coordinates of a linear index.
#[inline]
pub fn coords_of<const D: usize>(mut index: usize, strides: [usize; D]) -> [usize; D] {
    let mut c = [0usize; D];
    for a in 0..D {
        c[a] = index / strides[a];
        index %= strides[a];
    }
    c
}

/// Linear index of coordinates.
#[inline]
pub fn index_of<const D: usize>(coords: [usize; D], strides: [usize; D]) -> usize {
    let mut i = 0;
    for a in 0..D {
        i += coords[a] * strides[a];
    }
    i
}

/// Coordinates shifted by a signed offset, if still inside the shape.
#[inline]
pub fn shifted<const D: usize>(
    coords: [usize; D],
    offset: [i64; D],
    shape: [usize; D],
) -> Option<[usize; D]> {
    let mut out = [0usize; D];
    for a in 0..D {
        let v = coords[a] as i64 + offset[a];
        if v < 0 || v >= shape[a] as i64 {
            return None;
        }
        out[a] = v as usize;
    }
    Some(out)
}

/// Coordinates shifted by a signed offset, clamped to the shape.
#[inline]
pub fn shifted_clamped<const D: usize>(
    coords: [usize; D],
    offset: [i64; D],
    shape: [usize; D],
) -> [usize; D] {
    let mut out = [0usize; D];
    for a in 0..D {
        let v = coords[a] as i64 + offset[a];
        out[a] = v.clamp(0, shape[a] as i64 - 1) as usize;
    }
    out
}

/// Every offset in the box `[-radius[a], +radius[a]]` per axis, in
/// row-major order, center included.
pub fn box_offsets<const D: usize>(radius: [usize; D]) -> Vec<[i64; D]> {
    let mut side = [0usize; D];
    let mut count = 1usize;
    for a in 0..D {
        side[a] = 2 * radius[a] + 1;
        count *= side[a];
    }
    let mut out = Vec::with_capacity(count);
    let mut cursor = [0usize; D];
    loop {
        let mut off = [0i64; D];
        for a in 0..D {
            off[a] = cursor[a] as i64 - radius[a] as i64;
        }
        out.push(off);
        // Advance the odometer, last axis fastest.
        let mut a = D;
        loop {
            if a == 0 {
                return out;
            }
            a -= 1;
            cursor[a] += 1;
            if cursor[a] < side[a] {
                break;
            }
            cursor[a] = 0;
        }
    }
}

/// Offsets inside the Euclidean ball of the given radius, center included.
pub fn ball_offsets<const D: usize>(radius: usize) -> Vec<[i64; D]> {
    let r2 = (radius * radius) as i64;
    box_offsets([radius; D])
        .into_iter()
        .filter(|off| off.iter().map(|&o| o * o).sum::<i64>() <= r2)
        .collect()
}

#[cfg(feature = "parallel")]
pub(crate) fn map_indices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    use rayon::prelude::*;
    (0..n).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_indices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    (0..n).map(f).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strides_row_major() {
        assert_eq!(strides([4, 5, 6]), [30, 6, 1]);
        assert_eq!(strides([7, 3]), [3, 1]);
    }

    #[test]
    fn test_index_round_trip() {
        let shape = [3, 4, 5];
        let s = strides(shape);
        for i in 0..volume(shape) {
            assert_eq!(index_of(coords_of(i, s), s), i);
        }
    }

    #[test]
    fn test_shifted_bounds() {
        let shape = [3, 3];
        assert_eq!(shifted([0, 0], [-1, 0], shape), None);
        assert_eq!(shifted([2, 2], [1, 0], shape), None);
        assert_eq!(shifted([1, 1], [1, -1], shape), Some([2, 0]));
        assert_eq!(shifted_clamped([0, 2], [-3, 4], shape), [0, 2]);
    }

    #[test]
    fn test_box_offsets_count() {
        assert_eq!(box_offsets([1, 1]).len(), 9);
        assert_eq!(box_offsets([1, 1, 1]).len(), 27);
        assert_eq!(box_offsets([0, 2]).len(), 5);
        // Center is present exactly once.
        let n = box_offsets([1, 1, 1])
            .iter()
            .filter(|o| **o == [0, 0, 0])
            .count();
        assert_eq!(n, 1);
    }

    #[test]
    fn test_ball_excludes_corners() {
        let ball = ball_offsets::<2>(1);
        assert!(ball.contains(&[0, 0]));
        assert!(ball.contains(&[0, 1]));
        assert!(!ball.contains(&[1, 1]));
        assert_eq!(ball.len(), 5);
        // Radius 2 admits the unit diagonal.
        let ball2 = ball_offsets::<2>(2);
        assert!(ball2.contains(&[1, 1]));
        assert!(!ball2.contains(&[2, 2]));
    }
}
