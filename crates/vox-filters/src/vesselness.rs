//! Multiscale Hessian vesselness measure for 3-D volumes.
//!
//! Bright tubular structures produce one small and two large negative
//! Hessian eigenvalues at the scale matching the tube radius. The measure
//! combines the classic blob/plate/structure ratios over a sweep of
//! Gaussian scales and keeps the strongest response per voxel.

use crate::eigen::eigen_sym3;
use crate::grid;
use crate::kernel;
use crate::{FilterError, FilterResult};
use tracing::debug;
use vox_core::Element;

/// Scale sweep for the multiscale Hessian filters.
#[derive(Debug, Clone)]
pub struct ScaleSpace {
    /// Smallest standard deviation, roughly the smallest vessel diameter.
    pub sigma_min: f64,
    /// Largest standard deviation.
    pub sigma_max: f64,
    /// Number of scales analyzed between the two.
    pub steps: usize,
    /// Logarithmic (true) or linear (false) scale progression.
    pub logarithmic: bool,
}

impl ScaleSpace {
    /// The concrete scale values of the sweep.
    pub fn sigmas(&self) -> FilterResult<Vec<f64>> {
        if !(self.sigma_min > 0.0 && self.sigma_max >= self.sigma_min) {
            return Err(FilterError::InvalidParameter(format!(
                "scale range [{}, {}] is not usable",
                self.sigma_min, self.sigma_max
            )));
        }
        if self.steps == 0 {
            return Err(FilterError::InvalidParameter(
                "at least one scale step is required".into(),
            ));
        }
        if self.steps == 1 {
            return Ok(vec![self.sigma_min]);
        }
        let k = self.steps;
        let mut out = Vec::with_capacity(k);
        for i in 0..k {
            let t = i as f64 / (k - 1) as f64;
            let sigma = if self.logarithmic {
                self.sigma_min * (self.sigma_max / self.sigma_min).powf(t)
            } else {
                self.sigma_min + t * (self.sigma_max - self.sigma_min)
            };
            out.push(sigma);
        }
        Ok(out)
    }
}

/// Scale-normalized Hessian per voxel of an already smoothed volume.
///
/// Components in the order `[h00, h01, h02, h11, h12, h22]`, second
/// differences with clamped boundaries, multiplied by sigma^2.
pub(crate) fn hessian_field(smoothed: &[f64], shape: [usize; 3], sigma: f64) -> Vec<[f64; 6]> {
    let strides = grid::strides(shape);
    let norm = sigma * sigma;
    let sample = |coords: [usize; 3], off: [i64; 3]| -> f64 {
        let c = grid::shifted_clamped(coords, off, shape);
        smoothed[grid::index_of(c, strides)]
    };
    grid::map_indices(smoothed.len(), |i| {
        let c = grid::coords_of(i, strides);
        let center = smoothed[i];
        let mut h = [0.0f64; 6];
        let mut slot = 0usize;
        for a in 0..3 {
            for b in a..3 {
                let v = if a == b {
                    let mut e = [0i64; 3];
                    e[a] = 1;
                    let mut w = [0i64; 3];
                    w[a] = -1;
                    sample(c, e) - 2.0 * center + sample(c, w)
                } else {
                    let mut pp = [0i64; 3];
                    pp[a] = 1;
                    pp[b] = 1;
                    let mut pm = [0i64; 3];
                    pm[a] = 1;
                    pm[b] = -1;
                    let mut mp = [0i64; 3];
                    mp[a] = -1;
                    mp[b] = 1;
                    let mut mm = [0i64; 3];
                    mm[a] = -1;
                    mm[b] = -1;
                    (sample(c, pp) - sample(c, pm) - sample(c, mp) + sample(c, mm)) / 4.0
                };
                h[slot] = v * norm;
                slot += 1;
            }
        }
        h
    })
}

/// Rebuilds the symmetric matrix from its packed components.
#[inline]
pub(crate) fn unpack_sym3(h: [f64; 6]) -> [[f64; 3]; 3] {
    [
        [h[0], h[1], h[2]],
        [h[1], h[3], h[4]],
        [h[2], h[4], h[5]],
    ]
}

/// Eigenvalues reordered by ascending magnitude.
#[inline]
pub(crate) fn sort_by_magnitude(vals: [f64; 3]) -> [f64; 3] {
    let mut v = vals;
    v.sort_by(|a, b| {
        a.abs()
            .partial_cmp(&b.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    v
}

/// Tubular-structure response for magnitude-sorted eigenvalues.
///
/// Zero unless the two dominant curvatures are negative (a bright tube on
/// a dark background). `c` scales the structure-strength term.
pub(crate) fn tube_response(l: [f64; 3], c: f64) -> f64 {
    let (l1, l2, l3) = (l[0], l[1], l[2]);
    if l2 >= 0.0 || l3 >= 0.0 {
        return 0.0;
    }
    let ra = l2.abs() / l3.abs();
    let rb = l1.abs() / (l2.abs() * l3.abs()).sqrt();
    let s2 = l1 * l1 + l2 * l2 + l3 * l3;
    let alpha2 = 2.0 * 0.5 * 0.5;
    let beta2 = 2.0 * 0.5 * 0.5;
    let c2 = 2.0 * c * c;
    (1.0 - (-ra * ra / alpha2).exp()) * (-rb * rb / beta2).exp() * (1.0 - (-s2 / c2).exp())
}

/// Multiscale vesselness measure; the strongest response over the sweep.
pub fn vesselness<T: Element>(
    input: &[T],
    shape: [usize; 3],
    scales: &ScaleSpace,
) -> FilterResult<Vec<f64>> {
    let sigmas = scales.sigmas()?;
    debug!(?shape, scales = sigmas.len(), "multiscale vesselness");
    let data: Vec<f64> = input.iter().map(|v| v.to_f64()).collect();
    let mut best = vec![0.0f64; data.len()];

    for sigma in sigmas {
        let smoothed = kernel::smooth_isotropic(&data, shape, sigma)?;
        let hessians = hessian_field(&smoothed, shape, sigma);
        // Frangi's structure scale: half the strongest Hessian norm.
        let max_s = hessians
            .iter()
            .map(|h| {
                (h[0] * h[0]
                    + h[3] * h[3]
                    + h[5] * h[5]
                    + 2.0 * (h[1] * h[1] + h[2] * h[2] + h[4] * h[4]))
                    .sqrt()
            })
            .fold(0.0f64, f64::max);
        if max_s <= 0.0 {
            continue;
        }
        let c = 0.5 * max_s;
        for (i, &h) in hessians.iter().enumerate() {
            let (vals, _) = eigen_sym3(unpack_sym3(h));
            let l = sort_by_magnitude(vals);
            let r = tube_response(l, c);
            if r > best[i] {
                best[i] = r;
            }
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tube_volume(shape: [usize; 3]) -> Vec<f64> {
        // Bright line along axis 0 through the middle of the cross-section.
        let strides = grid::strides(shape);
        let mut v = vec![0.0f64; grid::volume(shape)];
        for x in 0..shape[0] {
            v[grid::index_of([x, shape[1] / 2, shape[2] / 2], strides)] = 100.0;
        }
        v
    }

    #[test]
    fn test_scale_progression() {
        let log = ScaleSpace {
            sigma_min: 1.0,
            sigma_max: 4.0,
            steps: 3,
            logarithmic: true,
        };
        let s = log.sigmas().unwrap();
        assert_eq!(s.len(), 3);
        assert!((s[1] - 2.0).abs() < 1e-12);

        let lin = ScaleSpace {
            sigma_min: 1.0,
            sigma_max: 4.0,
            steps: 3,
            logarithmic: false,
        };
        assert_eq!(lin.sigmas().unwrap()[1], 2.5);

        let bad = ScaleSpace {
            sigma_min: -1.0,
            sigma_max: 4.0,
            steps: 3,
            logarithmic: true,
        };
        assert!(bad.sigmas().is_err());
    }

    #[test]
    fn test_constant_volume_has_no_response() {
        let input = vec![5.0f32; 6 * 6 * 6];
        let scales = ScaleSpace {
            sigma_min: 0.5,
            sigma_max: 1.0,
            steps: 2,
            logarithmic: true,
        };
        let out = vesselness(&input, [6, 6, 6], &scales).unwrap();
        assert!(out.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_tube_beats_background() {
        let shape = [9, 9, 9];
        let data = tube_volume(shape);
        let scales = ScaleSpace {
            sigma_min: 0.8,
            sigma_max: 1.5,
            steps: 3,
            logarithmic: true,
        };
        let out = vesselness(&data, shape, &scales).unwrap();
        let strides = grid::strides(shape);
        let on_axis = out[grid::index_of([4, 4, 4], strides)];
        let corner = out[grid::index_of([4, 0, 0], strides)];
        assert!(on_axis > corner);
        assert!(on_axis > 0.0);
    }

    #[test]
    fn test_tube_response_rejects_bright_blobs() {
        // A dark blob: all eigenvalues positive.
        assert_eq!(tube_response([1.0, 2.0, 3.0], 1.0), 0.0);
        // A proper tube: one tiny, two strongly negative.
        assert!(tube_response([0.01, -2.0, -2.2], 1.0) > 0.0);
    }
}
