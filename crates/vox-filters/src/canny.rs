//! N-dimensional Canny edge detection.
//!
//! Gaussian pre-smoothing, central-difference gradient, non-maximum
//! suppression along the gradient direction, then double-threshold
//! hysteresis tracking. The pre-threshold suppressed magnitude image is
//! returned alongside the binary edge map; it is the practical way to
//! choose thresholds for an unfamiliar image.

use crate::grid;
use crate::kernel;
use crate::{FilterError, FilterResult};
use tracing::debug;
use vox_core::Element;

/// Parameters of the edge detector.
#[derive(Debug, Clone)]
pub struct CannyParams<const D: usize> {
    /// Variance of the Gaussian pre-smoother, per axis. Zero disables
    /// smoothing along that axis.
    pub variance: [f64; D],
    /// Upper tracking threshold: gradient magnitudes at or above it seed
    /// edges.
    pub upper: f64,
    /// Lower tracking threshold: magnitudes at or above it may join a
    /// seeded edge.
    pub lower: f64,
    /// Kernel truncation error of the pre-smoother, per axis.
    pub max_error: [f64; D],
}

/// Result of the edge detector.
#[derive(Debug, Clone)]
pub struct CannyOutput<T> {
    /// Binary edge map: 1 on edges, 0 elsewhere.
    pub edges: Vec<T>,
    /// Gradient magnitude after non-maximum suppression, before
    /// thresholding.
    pub suppressed: Vec<T>,
}

/// Runs the edge detector on one volume.
pub fn canny<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    params: &CannyParams<D>,
) -> FilterResult<CannyOutput<T>> {
    if params.lower > params.upper {
        return Err(FilterError::InvalidParameter(format!(
            "lower threshold {} exceeds upper threshold {}",
            params.lower, params.upper
        )));
    }
    debug!(?shape, upper = params.upper, lower = params.lower, "canny");
    let strides = grid::strides(shape);
    let n = input.len();
    let data: Vec<f64> = input.iter().map(|v| v.to_f64()).collect();
    let smoothed = kernel::smooth(&data, shape, params.variance, params.max_error)?;

    // Gradient and magnitude.
    let grad: Vec<[f64; D]> = grid::map_indices(n, |i| {
        let c = grid::coords_of(i, strides);
        let mut g = [0.0f64; D];
        for a in 0..D {
            let mut e = [0i64; D];
            e[a] = 1;
            let mut w = [0i64; D];
            w[a] = -1;
            let hi = smoothed[grid::index_of(grid::shifted_clamped(c, e, shape), strides)];
            let lo = smoothed[grid::index_of(grid::shifted_clamped(c, w, shape), strides)];
            g[a] = (hi - lo) / 2.0;
        }
        g
    });
    let magnitude: Vec<f64> = grad
        .iter()
        .map(|g| g.iter().map(|&v| v * v).sum::<f64>().sqrt())
        .collect();

    // Non-maximum suppression along the quantized gradient direction.
    let suppressed: Vec<f64> = grid::map_indices(n, |i| {
        let m = magnitude[i];
        if m == 0.0 {
            return 0.0;
        }
        let mut dir = [0i64; D];
        for a in 0..D {
            dir[a] = (grad[i][a] / m).round() as i64;
        }
        let c = grid::coords_of(i, strides);
        let ahead = grid::shifted(c, dir, shape)
            .map(|nc| magnitude[grid::index_of(nc, strides)])
            .unwrap_or(0.0);
        let mut back = [0i64; D];
        for a in 0..D {
            back[a] = -dir[a];
        }
        let behind = grid::shifted(c, back, shape)
            .map(|nc| magnitude[grid::index_of(nc, strides)])
            .unwrap_or(0.0);
        if m >= ahead && m >= behind { m } else { 0.0 }
    });

    // Hysteresis: flood from strong voxels through weak ones.
    let neighbors: Vec<[i64; D]> = grid::box_offsets([1usize; D])
        .into_iter()
        .filter(|o| o.iter().any(|&v| v != 0))
        .collect();
    let mut edge = vec![false; n];
    let mut stack: Vec<usize> = Vec::new();
    for i in 0..n {
        if suppressed[i] >= params.upper && !edge[i] {
            edge[i] = true;
            stack.push(i);
            while let Some(j) = stack.pop() {
                let c = grid::coords_of(j, strides);
                for &off in &neighbors {
                    if let Some(nc) = grid::shifted(c, off, shape) {
                        let k = grid::index_of(nc, strides);
                        if !edge[k] && suppressed[k] >= params.lower {
                            edge[k] = true;
                            stack.push(k);
                        }
                    }
                }
            }
        }
    }

    Ok(CannyOutput {
        edges: edge
            .into_iter()
            .map(|e| T::from_f64(if e { 1.0 } else { 0.0 }))
            .collect(),
        suppressed: suppressed.into_iter().map(T::from_f64).collect(),
    })
}
