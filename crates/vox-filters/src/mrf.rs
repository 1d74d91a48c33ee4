//! Markov-random-field relabeling by iterated conditional modes.
//!
//! Refines a rough segmentation: each voxel is assigned the class whose
//! centroid it resembles, penalized by disagreement with its weighted
//! neighborhood. The weight rescaling in [`rescale_weights`] is a
//! normalization contract: it equalizes the dynamic range of the spatial
//! smoothness term against the intensity fidelity term, which otherwise
//! differ by orders of magnitude depending on the input's value range.

use crate::grid;
use crate::{FilterError, FilterResult};
use tracing::debug;
use vox_core::Element;

/// Parameters of the relabeling process.
#[derive(Debug, Clone)]
pub struct MrfParams<'a, const D: usize> {
    /// Mean intensity per class; the class count is the vector length.
    pub centroids: &'a [f64],
    /// Neighborhood weights, row-major over the box, center included.
    pub weights: &'a [f64],
    /// Half-size of the neighborhood box per axis.
    pub half_size: [usize; D],
    /// Trade-off between fidelity and smoothness; multiplies the weights.
    pub smoothing: f64,
    /// Maximum number of relabeling sweeps.
    pub iterations: usize,
    /// Convergence threshold on the fraction of voxels that changed.
    pub tolerance: f64,
}

/// Rescales neighbor weights so the smoothness term is commensurate with
/// the centroid-distance fidelity term: `w * mean(centroids) / (2 * sum)`.
pub fn rescale_weights(weights: &[f64], centroids: &[f64]) -> FilterResult<Vec<f64>> {
    if centroids.is_empty() {
        return Err(FilterError::InvalidParameter(
            "at least one class centroid is required".into(),
        ));
    }
    let total: f64 = weights.iter().sum();
    if total == 0.0 {
        return Err(FilterError::InvalidParameter(
            "neighborhood weights sum to zero".into(),
        ));
    }
    let mean = centroids.iter().sum::<f64>() / centroids.len() as f64;
    Ok(weights.iter().map(|&w| w * mean / (2.0 * total)).collect())
}

/// Relabels an image against per-class centroids.
///
/// Labels are the 0-based indices into `centroids`. Sweeps run until the
/// changed-voxel fraction drops to `tolerance` or `iterations` is
/// exhausted.
pub fn relabel<T: Element, const D: usize>(
    input: &[T],
    shape: [usize; D],
    params: &MrfParams<'_, D>,
) -> FilterResult<Vec<u8>> {
    let classes = params.centroids.len();
    if classes == 0 || classes > u8::MAX as usize + 1 {
        return Err(FilterError::InvalidParameter(format!(
            "class count {classes} outside 1..=256"
        )));
    }
    let offsets = grid::box_offsets(params.half_size);
    if offsets.len() != params.weights.len() {
        return Err(FilterError::InvalidParameter(format!(
            "{} weights for a neighborhood of {} cells",
            params.weights.len(),
            offsets.len()
        )));
    }
    let weights = rescale_weights(params.weights, params.centroids)?;
    let strides = grid::strides(shape);
    let n = input.len();
    let x: Vec<f64> = input.iter().map(|v| v.to_f64()).collect();

    // Initial assignment: nearest centroid.
    let nearest = |v: f64| -> u8 {
        let mut best = 0usize;
        let mut best_d = f64::INFINITY;
        for (k, &mu) in params.centroids.iter().enumerate() {
            let d = (v - mu).abs();
            if d < best_d {
                best_d = d;
                best = k;
            }
        }
        best as u8
    };
    let mut labels: Vec<u8> = x.iter().map(|&v| nearest(v)).collect();

    for sweep in 0..params.iterations {
        let mut changed = 0usize;
        for i in 0..n {
            let coords = grid::coords_of(i, strides);
            let mut best = labels[i];
            let mut best_e = f64::INFINITY;
            for k in 0..classes {
                let fidelity = (x[i] - params.centroids[k]).abs();
                let mut disagreement = 0.0;
                for (m, &off) in offsets.iter().enumerate() {
                    if let Some(c) = grid::shifted(coords, off, shape) {
                        let j = grid::index_of(c, strides);
                        if labels[j] as usize != k {
                            disagreement += weights[m];
                        }
                    }
                }
                let e = fidelity + params.smoothing * disagreement;
                if e < best_e {
                    best_e = e;
                    best = k as u8;
                }
            }
            if best != labels[i] {
                labels[i] = best;
                changed += 1;
            }
        }
        let fraction = changed as f64 / n as f64;
        debug!(sweep, changed, fraction, "relabeling sweep");
        if fraction <= params.tolerance {
            break;
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rescale_normalization_contract() {
        // Eight unit weights around a zeroed center, centroids 10 and 50:
        // each weight becomes 30 / 16, the array sums to 15.
        let weights = [1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let scaled = rescale_weights(&weights, &[10.0, 50.0]).unwrap();
        assert_relative_eq!(scaled[0], 30.0 / 16.0, epsilon = 1e-12);
        assert_relative_eq!(scaled.iter().sum::<f64>(), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rescale_rejects_zero_weights() {
        assert!(rescale_weights(&[0.0; 9], &[1.0]).is_err());
    }

    fn two_region_image() -> Vec<f64> {
        let mut img = vec![0.0f64; 5 * 6];
        for r in 0..5 {
            for c in 0..6 {
                img[r * 6 + c] = if c < 3 { 10.0 } else { 50.0 };
            }
        }
        img
    }

    #[test]
    fn test_smoothing_conforms_outlier() {
        let mut img = two_region_image();
        // One left-region pixel measured like the right region.
        img[2 * 6 + 1] = 50.0;
        let weights = vec![1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let params = MrfParams {
            centroids: &[10.0, 50.0],
            weights: &weights,
            half_size: [1, 1],
            smoothing: 3.0,
            iterations: 10,
            tolerance: 0.0,
        };
        let labels = relabel(&img, [5, 6], &params).unwrap();
        assert_eq!(labels[2 * 6 + 1], 0);
        assert_eq!(labels[2 * 6 + 4], 1);
    }

    #[test]
    fn test_negligible_smoothing_keeps_outlier() {
        let mut img = two_region_image();
        img[2 * 6 + 1] = 50.0;
        let weights = vec![1.0, 1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        let params = MrfParams {
            centroids: &[10.0, 50.0],
            weights: &weights,
            half_size: [1, 1],
            smoothing: 1e-7,
            iterations: 10,
            tolerance: 0.0,
        };
        let labels = relabel(&img, [5, 6], &params).unwrap();
        assert_eq!(labels[2 * 6 + 1], 1);
    }

    #[test]
    fn test_class_indices_follow_centroid_order() {
        let img = vec![0.0f64, 100.0, 0.0, 100.0, 0.0, 100.0];
        let weights = vec![1.0, 0.0, 1.0];
        let params = MrfParams {
            centroids: &[100.0, 0.0],
            weights: &weights,
            half_size: [0, 1],
            smoothing: 1e-7,
            iterations: 5,
            tolerance: 0.0,
        };
        let labels = relabel(&img, [2, 3], &params).unwrap();
        assert_eq!(labels, vec![1, 0, 1, 0, 1, 0]);
    }
}
