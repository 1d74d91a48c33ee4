//! Eigen-decomposition of symmetric 3x3 matrices.
//!
//! Cyclic Jacobi rotations; plenty for the per-voxel Hessians the vessel
//! filters produce, and free of the branch-heavy edge cases of the closed
//! form.

/// Eigenvalues and eigenvectors of a symmetric 3x3 matrix.
///
/// Returns `(values, vectors)` with eigenvalues in ascending order and
/// `vectors[k]` the unit eigenvector for `values[k]`.
pub fn eigen_sym3(m: [[f64; 3]; 3]) -> ([f64; 3], [[f64; 3]; 3]) {
    let mut a = m;
    // Accumulated rotations, starts as identity.
    let mut v = [[0.0; 3]; 3];
    for (i, row) in v.iter_mut().enumerate() {
        row[i] = 1.0;
    }

    for _sweep in 0..32 {
        let off = a[0][1] * a[0][1] + a[0][2] * a[0][2] + a[1][2] * a[1][2];
        if off < 1e-24 {
            break;
        }
        for (p, q) in [(0usize, 1usize), (0, 2), (1, 2)] {
            if a[p][q].abs() < 1e-300 {
                continue;
            }
            let theta = (a[q][q] - a[p][p]) / (2.0 * a[p][q]);
            let t = theta.signum() / (theta.abs() + (theta * theta + 1.0).sqrt());
            let c = 1.0 / (t * t + 1.0).sqrt();
            let s = t * c;

            // Rotate a in the (p, q) plane.
            let app = a[p][p];
            let aqq = a[q][q];
            let apq = a[p][q];
            a[p][p] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
            a[q][q] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
            a[p][q] = 0.0;
            a[q][p] = 0.0;
            for r in 0..3 {
                if r != p && r != q {
                    let arp = a[r][p];
                    let arq = a[r][q];
                    a[r][p] = c * arp - s * arq;
                    a[p][r] = a[r][p];
                    a[r][q] = s * arp + c * arq;
                    a[q][r] = a[r][q];
                }
            }
            // Accumulate the rotation into the eigenvector estimate.
            for r in 0..3 {
                let vrp = v[r][p];
                let vrq = v[r][q];
                v[r][p] = c * vrp - s * vrq;
                v[r][q] = s * vrp + c * vrq;
            }
        }
    }

    let mut order = [0usize, 1, 2];
    order.sort_by(|&i, &j| a[i][i].partial_cmp(&a[j][j]).unwrap_or(std::cmp::Ordering::Equal));
    let values = [a[order[0]][order[0]], a[order[1]][order[1]], a[order[2]][order[2]]];
    let mut vectors = [[0.0; 3]; 3];
    for (k, &col) in order.iter().enumerate() {
        for r in 0..3 {
            vectors[k][r] = v[r][col];
        }
    }
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_diagonal_matrix() {
        let (vals, _) = eigen_sym3([[3.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 2.0]]);
        assert_relative_eq!(vals[0], -1.0, epsilon = 1e-10);
        assert_relative_eq!(vals[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(vals[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_known_eigenpair() {
        // [[2,1,0],[1,2,0],[0,0,5]]: eigenvalues 1, 3, 5.
        let m = [[2.0, 1.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 5.0]];
        let (vals, vecs) = eigen_sym3(m);
        assert_relative_eq!(vals[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(vals[1], 3.0, epsilon = 1e-10);
        assert_relative_eq!(vals[2], 5.0, epsilon = 1e-10);
        // Eigenvector for 1 is (1, -1, 0)/sqrt(2) up to sign.
        let v = vecs[0];
        assert_relative_eq!(v[0].abs(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-8);
        assert_relative_eq!(v[1].abs(), std::f64::consts::FRAC_1_SQRT_2, epsilon = 1e-8);
        assert_relative_eq!(v[2].abs(), 0.0, epsilon = 1e-8);
        assert!(v[0] * v[1] < 0.0);
    }

    #[test]
    fn test_reconstruction() {
        let m = [[4.0, 1.5, -0.5], [1.5, 2.0, 0.7], [-0.5, 0.7, 1.0]];
        let (vals, vecs) = eigen_sym3(m);
        // Sum of lambda_k v_k v_k^T reproduces the input.
        for r in 0..3 {
            for c in 0..3 {
                let mut acc = 0.0;
                for k in 0..3 {
                    acc += vals[k] * vecs[k][r] * vecs[k][c];
                }
                assert_relative_eq!(acc, m[r][c], epsilon = 1e-8);
            }
        }
    }
}
