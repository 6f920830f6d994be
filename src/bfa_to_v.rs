//! Beamforming angle to steering matrix reconstruction.
//!
//! Rebuilds the unitary steering matrix V from a subcarrier's decoded
//! phi/psi angles by right-multiplying an identity with the standard's
//! sequence of phase (D) and Givens rotation (G) matrices. The angle
//! consumption order here mirrors the wire order of the representation
//! table, so the two must never be changed independently.
use ndarray::{s, Array2, Array3};
use num_complex::Complex64;

use crate::errors::FeedbackError;

/// Steering matrices for a whole report, shape
/// `[num_subcarriers, num_rows, num_cols]`.
pub type SteeringMatrix = Array3<Complex64>;

/// Number of angles one subcarrier must carry for this antenna
/// configuration: `num_rows - i` phis plus `num_rows - i` psis for each
/// Givens stage `i`.
pub fn required_angle_count(num_rows: usize, num_cols: usize) -> usize {
    let iternum = num_cols.min(num_rows - 1);
    (1..=iternum).map(|i| 2 * (num_rows - i)).sum()
}

/// Reconstruct the steering matrix of a single subcarrier.
///
/// The angle list length is validated against the configuration before any
/// matrix arithmetic; a mismatched list would otherwise still produce a
/// structurally valid but wrong matrix.
pub fn reconstruct_subcarrier(
    angles: &[f64],
    num_rows: usize,
    num_cols: usize,
) -> Result<Array2<Complex64>, FeedbackError> {
    let expected = required_angle_count(num_rows, num_cols);
    if angles.len() != expected {
        return Err(FeedbackError::MalformedAngleSequence {
            expected,
            actual: angles.len(),
        });
    }

    let iternum = num_cols.min(num_rows - 1);
    let mut v = Array2::<Complex64>::eye(num_rows);
    let mut offset = 0;
    for i in 1..=iternum {
        // D_i: phase rotations on columns i-1 ..= num_rows-2
        for (k, col) in ((i - 1)..(num_rows - 1)).enumerate() {
            apply_phase_inplace(&mut v, col, angles[offset + k]);
        }
        offset += num_rows - i;

        // G_li for l = i+1 ..= num_rows
        for l in (i + 1)..=num_rows {
            apply_givens_inplace(&mut v, i - 1, l - 1, angles[offset]);
            offset += 1;
        }
    }

    Ok(v.slice(s![.., ..num_cols]).to_owned())
}

/// Reconstruct steering matrices for all subcarriers of a report.
///
/// Every subcarrier's angle list is validated up front so a malformed
/// report fails before any reconstruction work is done. Subcarriers are
/// fully independent of each other.
pub fn reconstruct_steering_matrix(
    angles: &[Vec<f64>],
    num_rows: usize,
    num_cols: usize,
) -> Result<SteeringMatrix, FeedbackError> {
    let expected = required_angle_count(num_rows, num_cols);
    for subcarrier in angles {
        if subcarrier.len() != expected {
            return Err(FeedbackError::MalformedAngleSequence {
                expected,
                actual: subcarrier.len(),
            });
        }
    }

    let mut result = SteeringMatrix::zeros((angles.len(), num_rows, num_cols));
    for (sub_idx, subcarrier) in angles.iter().enumerate() {
        let v = reconstruct_subcarrier(subcarrier, num_rows, num_cols)?;
        result.slice_mut(s![sub_idx, .., ..]).assign(&v);
    }
    Ok(result)
}

/// In-place right-multiplication by a D matrix that is identity except for
/// `exp(i * phase)` on the diagonal at column `col`: scales that column.
fn apply_phase_inplace(v: &mut Array2<Complex64>, col: usize, phase: f64) {
    let scale = Complex64::cis(phase);
    for r in 0..v.nrows() {
        v[(r, col)] *= scale;
    }
}

/// In-place right-multiplication by the Givens rotation G with
/// `G[p,p] = G[q,q] = cos`, `G[q,p] = sin` and `G[p,q] = -sin`: mixes
/// columns `p` and `q`, leaving everything else untouched.
fn apply_givens_inplace(v: &mut Array2<Complex64>, p: usize, q: usize, phase: f64) {
    let cos_val = phase.cos();
    let sin_val = phase.sin();
    for r in 0..v.nrows() {
        let col_p = v[(r, p)];
        let col_q = v[(r, q)];
        v[(r, p)] = cos_val * col_p + sin_val * col_q;
        v[(r, q)] = -sin_val * col_p + cos_val * col_q;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq_complex(a: Complex64, b: Complex64, epsilon: f64) {
        assert!(
            (a.re - b.re).abs() < epsilon,
            "Real parts differ: {} vs {}",
            a.re,
            b.re
        );
        assert!(
            (a.im - b.im).abs() < epsilon,
            "Imaginary parts differ: {} vs {}",
            a.im,
            b.im
        );
    }

    #[test]
    fn test_apply_phase_inplace() {
        let n = 3;
        let col = 1;
        let phase = PI / 2.0; // exp(i*PI/2) = i
        let mut result = Array2::<Complex64>::eye(n);
        apply_phase_inplace(&mut result, col, phase);

        let mut expected = Array2::<Complex64>::eye(n);
        expected[(col, col)] = Complex64::cis(phase);

        for i in 0..n {
            for j in 0..n {
                approx_eq_complex(result[(i, j)], expected[(i, j)], 1e-12);
            }
        }
    }

    #[test]
    fn test_apply_givens_inplace() {
        let n = 4;
        let p = 1;
        let q = 2;
        let phase = PI / 6.0;
        let mut result = Array2::<Complex64>::eye(n);
        apply_givens_inplace(&mut result, p, q, phase);

        // On an identity, the rotation lands exactly at the four G entries.
        let mut expected = Array2::<Complex64>::eye(n);
        expected[(p, p)] = Complex64::new(phase.cos(), 0.0);
        expected[(q, q)] = Complex64::new(phase.cos(), 0.0);
        expected[(q, p)] = Complex64::new(phase.sin(), 0.0);
        expected[(p, q)] = Complex64::new(-phase.sin(), 0.0);

        for i in 0..n {
            for j in 0..n {
                approx_eq_complex(result[(i, j)], expected[(i, j)], 1e-12);
            }
        }
    }

    #[test]
    fn zero_angles_give_identity_columns() {
        // 2 rows, 2 columns, phi = psi = 0: V is the 2x2 identity
        let v = reconstruct_subcarrier(&[0.0, 0.0], 2, 2).unwrap();
        let eye = Array2::<Complex64>::eye(2);
        for i in 0..2 {
            for j in 0..2 {
                approx_eq_complex(v[(i, j)], eye[(i, j)], 1e-12);
            }
        }
    }

    #[test]
    fn two_by_two_closed_form() {
        let phi = PI / 3.0;
        let psi = PI / 6.0;
        let v = reconstruct_subcarrier(&[phi, psi], 2, 2).unwrap();

        // V = D(phi) * G(psi) worked out by hand
        approx_eq_complex(v[(0, 0)], Complex64::cis(phi) * psi.cos(), 1e-12);
        approx_eq_complex(v[(0, 1)], -Complex64::cis(phi) * psi.sin(), 1e-12);
        approx_eq_complex(v[(1, 0)], Complex64::new(psi.sin(), 0.0), 1e-12);
        approx_eq_complex(v[(1, 1)], Complex64::new(psi.cos(), 0.0), 1e-12);
    }

    /// V is a masked product of unitary matrices, so its columns must stay
    /// orthonormal: conj(V)^T * V == identity.
    fn assert_columns_orthonormal(v: &Array2<Complex64>, epsilon: f64) {
        let cols = v.ncols();
        for a in 0..cols {
            for b in 0..cols {
                let mut dot = Complex64::new(0.0, 0.0);
                for r in 0..v.nrows() {
                    dot += v[(r, a)].conj() * v[(r, b)];
                }
                let expected = if a == b { 1.0 } else { 0.0 };
                approx_eq_complex(dot, Complex64::new(expected, 0.0), epsilon);
            }
        }
    }

    #[test]
    fn three_by_three_is_unitary() {
        let angles = [1.1, 0.4, 0.3, 0.9, 2.0, 0.7];
        assert_eq!(required_angle_count(3, 3), angles.len());
        let v = reconstruct_subcarrier(&angles, 3, 3).unwrap();
        assert_eq!(v.dim(), (3, 3));
        assert_columns_orthonormal(&v, 1e-9);
    }

    #[test]
    fn four_by_two_columns_stay_orthonormal() {
        let angles = [0.2, 1.4, 2.8, 0.3, 0.8, 1.1, 0.5, 2.2, 0.9, 1.3];
        assert_eq!(required_angle_count(4, 2), angles.len());
        let v = reconstruct_subcarrier(&angles, 4, 2).unwrap();
        assert_eq!(v.dim(), (4, 2));
        assert_columns_orthonormal(&v, 1e-9);
    }

    #[test]
    fn short_angle_list_is_rejected() {
        let result = reconstruct_subcarrier(&[0.5], 2, 2);
        assert!(matches!(
            result,
            Err(FeedbackError::MalformedAngleSequence {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn report_reconstruction_validates_every_subcarrier() {
        // Second subcarrier is short: the whole report must fail
        let angles = vec![vec![0.5, 0.25], vec![0.5]];
        let result = reconstruct_steering_matrix(&angles, 2, 2);
        assert!(matches!(
            result,
            Err(FeedbackError::MalformedAngleSequence {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn report_reconstruction_stacks_subcarriers() {
        let angles = vec![vec![0.0, 0.0], vec![PI / 3.0, PI / 6.0], vec![1.0, 0.5]];
        let stack = reconstruct_steering_matrix(&angles, 2, 2).unwrap();
        assert_eq!(stack.dim(), (3, 2, 2));

        for (sub_idx, subcarrier) in angles.iter().enumerate() {
            let single = reconstruct_subcarrier(subcarrier, 2, 2).unwrap();
            for i in 0..2 {
                for j in 0..2 {
                    approx_eq_complex(stack[(sub_idx, i, j)], single[(i, j)], 1e-12);
                }
            }
        }
    }
}
