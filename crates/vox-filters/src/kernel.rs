//! Discrete Gaussian kernels and separable convolution.
//!
//! Pre-smoothing for the gradient-based filters. The kernel radius is
//! sized so that the discarded tail mass stays below the caller's maximum
//! error, matching the truncation contract of the edge-detection filter's
//! `max_error` parameter.

use crate::grid;
use crate::{FilterError, FilterResult};

/// Hard cap on the kernel radius, whatever the requested error.
const MAX_RADIUS: usize = 32;

/// Builds a normalized discrete Gaussian kernel for the given variance.
///
/// A non-positive variance yields the identity kernel `[1.0]`. The radius
/// grows until the mass outside the kernel drops below `max_error`.
pub fn gaussian_kernel(variance: f64, max_error: f64) -> FilterResult<Vec<f64>> {
    if !variance.is_finite() || !max_error.is_finite() {
        return Err(FilterError::InvalidParameter(
            "gaussian variance and max error must be finite".into(),
        ));
    }
    if variance <= 0.0 {
        return Ok(vec![1.0]);
    }
    let max_error = max_error.clamp(1e-12, 0.5);
    let sigma = variance.sqrt();

    let mut radius = 1usize;
    while radius < MAX_RADIUS {
        // Mass of the continuous tail beyond the kernel edge.
        let edge = (radius as f64 + 0.5) / (sigma * std::f64::consts::SQRT_2);
        if erfc(edge) < max_error {
            break;
        }
        radius += 1;
    }

    let mut taps = Vec::with_capacity(2 * radius + 1);
    let mut sum = 0.0;
    for t in -(radius as i64)..=(radius as i64) {
        let x = t as f64;
        let w = (-x * x / (2.0 * variance)).exp();
        taps.push(w);
        sum += w;
    }
    for w in &mut taps {
        *w /= sum;
    }
    Ok(taps)
}

/// Complementary error function, Abramowitz & Stegun 7.1.26.
fn erfc(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.3275911 * x.abs());
    let poly = t
        * (0.254829592
            + t * (-0.284496736 + t * (1.421413741 + t * (-1.453152027 + t * 1.061405429))));
    let e = poly * (-x * x).exp();
    if x >= 0.0 { e } else { 2.0 - e }
}

/// Convolves along one axis with clamped (zero-flux) boundaries.
pub fn convolve_axis<const D: usize>(
    data: &[f64],
    shape: [usize; D],
    axis: usize,
    taps: &[f64],
) -> Vec<f64> {
    if taps.len() == 1 {
        return data.to_vec();
    }
    let strides = grid::strides(shape);
    let radius = (taps.len() / 2) as i64;
    grid::map_indices(data.len(), |i| {
        let coords = grid::coords_of(i, strides);
        let mut acc = 0.0;
        for (k, &w) in taps.iter().enumerate() {
            let mut off = [0i64; D];
            off[axis] = k as i64 - radius;
            let c = grid::shifted_clamped(coords, off, shape);
            acc += w * data[grid::index_of(c, strides)];
        }
        acc
    })
}

/// Separable Gaussian smoothing with per-axis variance and error budget.
pub fn smooth<const D: usize>(
    data: &[f64],
    shape: [usize; D],
    variance: [f64; D],
    max_error: [f64; D],
) -> FilterResult<Vec<f64>> {
    let mut out = data.to_vec();
    for axis in 0..D {
        let taps = gaussian_kernel(variance[axis], max_error[axis])?;
        if taps.len() > 1 {
            out = convolve_axis(&out, shape, axis, &taps);
        }
    }
    Ok(out)
}

/// Isotropic Gaussian smoothing at standard deviation `sigma`.
pub fn smooth_isotropic<const D: usize>(
    data: &[f64],
    shape: [usize; D],
    sigma: f64,
) -> FilterResult<Vec<f64>> {
    smooth(data, shape, [sigma * sigma; D], [0.01; D])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_zero_variance_is_identity() {
        assert_eq!(gaussian_kernel(0.0, 0.01).unwrap(), vec![1.0]);
    }

    #[test]
    fn test_kernel_is_normalized_and_odd() {
        let k = gaussian_kernel(2.0, 0.01).unwrap();
        assert_eq!(k.len() % 2, 1);
        assert_relative_eq!(k.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        // Symmetric around the center tap.
        for i in 0..k.len() / 2 {
            assert_relative_eq!(k[i], k[k.len() - 1 - i], epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tighter_error_widens_kernel() {
        let loose = gaussian_kernel(1.0, 0.1).unwrap();
        let tight = gaussian_kernel(1.0, 1e-6).unwrap();
        assert!(tight.len() > loose.len());
    }

    #[test]
    fn test_smoothing_preserves_constants() {
        let data = vec![3.0; 5 * 4];
        let out = smooth(&data, [5, 4], [1.0, 1.0], [0.01, 0.01]).unwrap();
        for v in out {
            assert_relative_eq!(v, 3.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_smoothing_reduces_peak() {
        let mut data = vec![0.0; 9 * 9];
        data[4 * 9 + 4] = 1.0;
        let out = smooth(&data, [9, 9], [1.0, 1.0], [0.01, 0.01]).unwrap();
        assert!(out[4 * 9 + 4] < 1.0);
        assert!(out[4 * 9 + 3] > 0.0);
        // Mass is conserved away from boundaries.
        assert_relative_eq!(out.iter().sum::<f64>(), 1.0, epsilon = 1e-6);
    }
}
