use crate::WorkError;

/// Pivots smaller than this are treated as zero.
const PIVOT_EPSILON: f64 = 1e-12;

/// The per-task work function: solve `a · x = b` for `x`.
pub trait Solver: Send + Sync {
    fn solve(&self, a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, WorkError>;
}

/// Dense Gaussian elimination with partial pivoting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianSolver;

impl Solver for GaussianSolver {
    fn solve(&self, a: &[Vec<f64>], b: &[f64]) -> Result<Vec<f64>, WorkError> {
        let n = b.len();
        if a.len() != n {
            return Err(WorkError::Shape {
                expected: n,
                actual: a.len(),
            });
        }
        if let Some(row) = a.iter().find(|row| row.len() != n) {
            return Err(WorkError::Shape {
                expected: n,
                actual: row.len(),
            });
        }

        // Work on an augmented copy so the task input stays untouched.
        let mut m: Vec<Vec<f64>> = a
            .iter()
            .zip(b)
            .map(|(row, &rhs)| {
                let mut r = Vec::with_capacity(n + 1);
                r.extend_from_slice(row);
                r.push(rhs);
                r
            })
            .collect();

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&i, &j| m[i][col].abs().total_cmp(&m[j][col].abs()))
                .unwrap_or(col);
            let pivot = m[pivot_row][col];
            if pivot.abs() < PIVOT_EPSILON {
                return Err(WorkError::Singular { column: col, pivot });
            }
            m.swap(col, pivot_row);

            let (upper, lower) = m.split_at_mut(col + 1);
            let pivot_values = &upper[col];
            for row in lower.iter_mut() {
                let factor = row[col] / pivot;
                if factor == 0.0 {
                    continue;
                }
                for k in col..=n {
                    row[k] -= factor * pivot_values[k];
                }
            }
        }

        let mut x = vec![0.0; n];
        for i in (0..n).rev() {
            let tail: f64 = ((i + 1)..n).map(|k| m[i][k] * x[k]).sum();
            x[i] = (m[i][n] - tail) / m[i][i];
        }

        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solves_small_system() {
        // 2x + y = 5, x + 3y = 10  =>  x = 1, y = 3
        let a = vec![vec![2.0, 1.0], vec![1.0, 3.0]];
        let b = vec![5.0, 10.0];

        let x = GaussianSolver.solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_needs_pivoting() {
        // Zero on the diagonal forces a row swap.
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let b = vec![4.0, 7.0];

        let x = GaussianSolver.solve(&a, &b).unwrap();
        assert!((x[0] - 7.0).abs() < 1e-12);
        assert!((x[1] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_singular_matrix() {
        let a = vec![vec![1.0, 2.0], vec![2.0, 4.0]];
        let b = vec![1.0, 2.0];

        let err = GaussianSolver.solve(&a, &b).unwrap_err();
        assert!(matches!(err, WorkError::Singular { column: 1, .. }));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = vec![vec![1.0, 0.0], vec![0.0]];
        let b = vec![1.0, 2.0];

        assert_eq!(
            GaussianSolver.solve(&a, &b).unwrap_err(),
            WorkError::Shape { expected: 2, actual: 1 }
        );
    }
}
