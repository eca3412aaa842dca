#![allow(non_snake_case)]

use crate::algebra::{CsrMatrix, FloatT};
use std::iter::zip;

impl<T> CsrMatrix<T>
where
    T: FloatT,
{
    /// Matrix-vector product `y = A*x`.
    ///
    /// For a symmetric matrix the stored upper triangle is mirrored, so
    /// the product is with the full matrix.
    ///
    /// # Panics
    /// Panics if `x` or `y` do not have length `n`.
    pub fn mul_vec(&self, y: &mut [T], x: &[T]) {
        assert_eq!(x.len(), self.n);
        assert_eq!(y.len(), self.n);

        y.fill(T::zero());

        for row in 0..self.n {
            let cols = self.row_colval(row);
            let vals = self.row_nzval(row);
            for (&col, &v) in zip(cols, vals) {
                y[row] += v * x[col];
                if self.symmetric && col != row {
                    y[col] += v * x[row];
                }
            }
        }
    }

    /// Infinity norm of the residual `A*x - b`
    pub fn residual_norm_inf(&self, x: &[T], b: &[T]) -> T {
        let mut r = vec![T::zero(); self.n];
        self.mul_vec(&mut r, x);
        zip(&r, b).fold(T::zero(), |acc, (&ri, &bi)| T::max(acc, T::abs(ri - bi)))
    }
}

#[test]
fn test_mul_vec_general() {
    // A =
    //[ 1.0    ⋅   2.0]
    //[  ⋅     ⋅     ⋅ ]
    //[ 3.0   4.0  5.0]
    let A = CsrMatrix::new(
        3,
        vec![0, 2, 2, 5],
        vec![0, 2, 0, 1, 2],
        vec![1., 2., 3., 4., 5.],
        false,
    );
    let x = [1., 2., 3.];
    let mut y = [0.; 3];
    A.mul_vec(&mut y, &x);
    assert_eq!(y, [7., 0., 26.]);
    assert_eq!(A.residual_norm_inf(&x, &[7., 1., 26.]), 1.);
}

#[test]
fn test_mul_vec_symmetric() {
    // upper triangle of
    //[ 4.0  1.0    ⋅ ]
    //[ 1.0  3.0  -2.0]
    //[  ⋅  -2.0   5.0]
    let A = CsrMatrix::new(
        3,
        vec![0, 2, 4, 5],
        vec![0, 1, 1, 2, 2],
        vec![4., 1., 3., -2., 5.],
        true,
    );
    let x = [1., 1., 1.];
    let mut y = [0.; 3];
    A.mul_vec(&mut y, &x);
    assert_eq!(y, [5., 2., 3.]);
}
