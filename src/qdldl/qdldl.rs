#![allow(non_snake_case)]
use crate::algebra::utils::{amd_ordering, invperm, ipermute, permute};
use crate::algebra::*;
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`QDLDLFactorisation`](QDLDLFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QDLDLError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix is not upper triangular")]
    NotUpperTriangular,
    #[error("Matrix has no diagonal entry in column {column}")]
    MissingDiagonal { column: usize },
    #[error("Matrix factorization produced a zero pivot in column {column}")]
    ZeroPivot { column: usize },
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
    #[error("Expected {expected} matrix values, found {found}")]
    IncompatibleValues { expected: usize, found: usize },
}

/// Required settings for [`QDLDLFactorisation`](QDLDLFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct QDLDLSettings<T: FloatT> {
    #[builder(default = "1.0")]
    pub(crate) amd_dense_scale: f64,
    /// symmetric fill reducing ordering.  AMD if none
    #[builder(default = "None", setter(strip_option))]
    pub(crate) perm: Option<Vec<usize>>,
    #[builder(default = "false")]
    pub(crate) logical: bool,
    #[builder(default = "false")]
    pub(crate) regularize_enable: bool,
    #[builder(default = "(1e-12).as_T()")]
    pub(crate) regularize_eps: T,
    #[builder(default = "(1e-7).as_T()")]
    pub(crate) regularize_delta: T,
}

impl<T> Default for QDLDLSettings<T>
where
    T: FloatT,
{
    fn default() -> QDLDLSettings<T> {
        QDLDLSettings {
            amd_dense_scale: 1.0,
            perm: None,
            logical: false,
            regularize_enable: false,
            regularize_eps: (1e-12).as_T(),
            regularize_delta: (1e-7).as_T(),
        }
    }
}

/// Performs $PAP^T = LDL^T$ factorization of a symmetric matrix
///
/// The input is the upper triangle of the matrix in compressed column
/// form, with every diagonal entry present.  Rows of `L` are computed
/// one at a time from a sparse triangular solve with the rows above
/// them, guided by the elimination tree.  There is no pivoting, so the
/// ordering `P` is fixed before any values are seen.
///
/// A factorisation created with the `logical` setting holds the
/// elimination tree and the column counts of `L` only.  Values are
/// supplied with [`update_values`](QDLDLFactorisation::update_values)
/// and factored with [`refactor`](QDLDLFactorisation::refactor), which
/// can be repeated on the same pattern.

#[derive(Debug)]
pub struct QDLDLFactorisation<T = f64> {
    /// fill reducing ordering.  Pivot step `k` eliminates column `perm[k]`
    pub perm: Vec<usize>,
    /// strictly lower triangular factor, with an implied unit diagonal
    pub L: CscMatrix<T>,
    /// diagonal factor
    pub D: Vec<T>,
    // upper triangle of the permuted matrix
    PAPt: CscMatrix<T>,
    // position in PAPt.nzval of each input entry
    AtoPAPt: Vec<usize>,
    // parent of each node in the elimination tree
    etree: Vec<usize>,
    workspace: LDLWorkspace<T>,
    regularizer: Option<Regularizer<T>>,
    regularize_count: usize,
    is_logical: bool,
}

// Dynamic regularization: pivots smaller than eps in magnitude are
// replaced by delta with the same sign, zero taken as positive
#[derive(Debug, Clone, Copy)]
struct Regularizer<T> {
    eps: T,
    delta: T,
}

impl<T> Regularizer<T>
where
    T: FloatT,
{
    fn apply(&self, d: &mut T) -> bool {
        if T::abs(*d) >= self.eps {
            return false;
        }
        *d = if *d < T::zero() { -self.delta } else { self.delta };
        true
    }
}

#[derive(Debug)]
struct LDLWorkspace<T> {
    // dense accumulator, zero between uses
    y: Vec<T>,
    // pattern of the current row of L in pattern[top..n]
    pattern: Vec<usize>,
    // flag[i] == k once node i is on the pattern of row k
    flag: Vec<usize>,
    // entries of each column of L computed so far
    filled: Vec<usize>,
}

impl<T> LDLWorkspace<T>
where
    T: FloatT,
{
    fn new(n: usize) -> Self {
        Self {
            y: vec![T::zero(); n],
            pattern: vec![0; n],
            flag: vec![0; n],
            filled: vec![0; n],
        }
    }
}

const LDL_ROOT: usize = usize::MAX;

impl<T> QDLDLFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<QDLDLSettings<T>>,
    ) -> Result<QDLDLFactorisation<T>, QDLDLError> {
        check_structure(Ain)?;

        let n = Ain.n;
        let opts = opts.unwrap_or_default();

        let (perm, iperm) = match opts.perm {
            Some(perm) => {
                if perm.len() != n {
                    return Err(QDLDLError::InvalidPermutation);
                }
                let iperm = invperm(&perm).ok_or(QDLDLError::InvalidPermutation)?;
                (perm, iperm)
            }
            None => amd_ordering(n, &Ain.colptr, &Ain.rowval, opts.amd_dense_scale)
                .map_err(|_| QDLDLError::OrderingFailed)?,
        };

        let (PAPt, AtoPAPt) = _permute_triu(Ain, &iperm);
        let (etree, Lp) = _symbolic(&PAPt);
        let nnzL = Lp[n];

        let regularizer = opts.regularize_enable.then_some(Regularizer {
            eps: opts.regularize_eps,
            delta: opts.regularize_delta,
        });

        let mut factors = QDLDLFactorisation {
            perm,
            L: CscMatrix::new(n, n, Lp, vec![0; nnzL], vec![T::zero(); nnzL]),
            D: vec![T::zero(); n],
            PAPt,
            AtoPAPt,
            etree,
            workspace: LDLWorkspace::new(n),
            regularizer,
            regularize_count: 0,
            is_logical: true,
        };

        if !opts.logical {
            factors.refactor()?;
        }
        Ok(factors)
    }

    /// number of pivots replaced by dynamic regularization
    pub fn regularize_count(&self) -> usize {
        self.regularize_count
    }

    /// number of nonzeros in the strictly lower triangular factor L
    pub fn nnz_L(&self) -> usize {
        self.L.nnz()
    }

    /// true if no numeric factorisation has been computed yet
    pub fn is_logical(&self) -> bool {
        self.is_logical
    }

    /// Replace every value of the input matrix.  `values` is ordered
    /// as the `nzval` field of the matrix the factorisation was
    /// created from.  Call [`refactor`](QDLDLFactorisation::refactor)
    /// afterwards.
    pub fn update_values(&mut self, values: &[T]) -> Result<(), QDLDLError> {
        if values.len() != self.AtoPAPt.len() {
            return Err(QDLDLError::IncompatibleValues {
                expected: self.AtoPAPt.len(),
                found: values.len(),
            });
        }
        for (&dest, &v) in zip(&self.AtoPAPt, values) {
            self.PAPt.nzval[dest] = v;
        }
        Ok(())
    }

    pub fn refactor(&mut self) -> Result<(), QDLDLError> {
        // the factors are only usable once a numeric pass completes
        self.is_logical = true;
        self.regularize_count = _numeric(
            &self.PAPt,
            &self.etree,
            &mut self.L,
            &mut self.D,
            &mut self.workspace,
            self.regularizer.as_ref(),
        )
        .map_err(|k| QDLDLError::ZeroPivot {
            column: self.perm[k],
        })?;
        self.is_logical = false;
        Ok(())
    }

    // Solves Ax = b using LDL factors for A.
    // Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        assert!(!self.is_logical);
        assert_eq!(b.len(), self.D.len());

        let x = &mut self.workspace.y;
        permute(x, b, &self.perm);

        _lsolve(&self.L, x);
        zip(x.iter_mut(), &self.D).for_each(|(x, d)| *x /= *d);
        _ltsolve(&self.L, x);

        ipermute(b, x, &self.perm);
        x.fill(T::zero());
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), QDLDLError> {
    if !A.is_square() || A.check_format().is_err() {
        return Err(QDLDLError::IncompatibleDimension);
    }
    if !A.is_triu() {
        return Err(QDLDLError::NotUpperTriangular);
    }
    // rows are sorted, so the diagonal closes each column
    for col in 0..A.n {
        if A.col_rowval(col).last() != Some(&col) {
            return Err(QDLDLError::MissingDiagonal { column: col });
        }
    }
    Ok(())
}

// Symmetric permutation of an upper triangle.  Entry (r, c) moves to
// (iperm[r], iperm[c]), reflected into the upper triangle.  Rows within
// a column of the result are unordered.  Also returns the position of
// each input entry in the result.
fn _permute_triu<T: FloatT>(A: &CscMatrix<T>, iperm: &[usize]) -> (CscMatrix<T>, Vec<usize>) {
    let n = A.n;
    let nnz = A.nnz();
    let target = |r: usize, c: usize| {
        let (r, c) = (iperm[r], iperm[c]);
        (r.min(c), r.max(c))
    };

    let mut colptr = vec![0; n + 1];
    for col in 0..n {
        for &row in A.col_rowval(col) {
            colptr[target(row, col).1 + 1] += 1;
        }
    }
    for col in 0..n {
        colptr[col + 1] += colptr[col];
    }

    let mut next = colptr[..n].to_vec();
    let mut rowval = vec![0; nnz];
    let mut nzval = vec![T::zero(); nnz];
    let mut AtoPAPt = vec![0; nnz];

    for col in 0..n {
        for p in A.colptr[col]..A.colptr[col + 1] {
            let (prow, pcol) = target(A.rowval[p], col);
            let dest = next[pcol];
            rowval[dest] = prow;
            nzval[dest] = A.nzval[p];
            AtoPAPt[p] = dest;
            next[pcol] += 1;
        }
    }

    (CscMatrix::new(n, n, colptr, rowval, nzval), AtoPAPt)
}

// Elimination tree and column offsets of L for an upper triangle,
// following Timothy Davis - Algorithm 849: LDL (ldl_symbolic)
fn _symbolic<T: FloatT>(A: &CscMatrix<T>) -> (Vec<usize>, Vec<usize>) {
    let n = A.n;
    let mut etree = vec![LDL_ROOT; n];
    let mut flag = vec![0; n];
    let mut Lp = vec![0; n + 1];

    for k in 0..n {
        flag[k] = k;
        for &row in A.col_rowval(k) {
            if row == k {
                continue;
            }
            // climb from row towards the root, stopping at the
            // first node already on the pattern of row k
            let mut i = row;
            while flag[i] != k {
                if etree[i] == LDL_ROOT {
                    etree[i] = k;
                }
                Lp[i + 1] += 1;
                flag[i] = k;
                i = etree[i];
            }
        }
    }

    for k in 0..n {
        Lp[k + 1] += Lp[k];
    }
    (etree, Lp)
}

// Up looking numeric factorisation (ldl_numeric).  Row k of L solves
// L[0..k,0..k] D y = A[0..k,k] over the pattern of row k.  Returns the
// number of regularized pivots, or the step at which a pivot was zero.
fn _numeric<T: FloatT>(
    A: &CscMatrix<T>,
    etree: &[usize],
    L: &mut CscMatrix<T>,
    D: &mut [T],
    workspace: &mut LDLWorkspace<T>,
    regularizer: Option<&Regularizer<T>>,
) -> Result<usize, usize> {
    let n = A.n;
    let LDLWorkspace {
        y,
        pattern,
        flag,
        filled,
    } = workspace;
    let mut regularize_count = 0;
    filled.fill(0);

    for k in 0..n {
        let mut top = n;
        flag[k] = k;

        // scatter A[:,k] into y and collect the etree paths
        // from its entries, in topological order
        for p in A.colptr[k]..A.colptr[k + 1] {
            let mut i = A.rowval[p];
            y[i] += A.nzval[p];
            let mut len = 0;
            while flag[i] != k {
                pattern[len] = i;
                len += 1;
                flag[i] = k;
                i = etree[i];
            }
            while len > 0 {
                len -= 1;
                top -= 1;
                pattern[top] = pattern[len];
            }
        }

        D[k] = y[k];
        y[k] = T::zero();

        for &i in &pattern[top..n] {
            let yi = y[i];
            y[i] = T::zero();

            let (f, l) = (L.colptr[i], L.colptr[i] + filled[i]);
            for (&row, &Lx) in zip(&L.rowval[f..l], &L.nzval[f..l]) {
                y[row] -= Lx * yi;
            }

            let Lki = yi / D[i];
            D[k] -= Lki * yi;
            L.rowval[l] = k;
            L.nzval[l] = Lki;
            filled[i] += 1;
        }

        if let Some(reg) = regularizer {
            if reg.apply(&mut D[k]) {
                regularize_count += 1;
            }
        }
        if D[k] == T::zero() {
            return Err(k);
        }
    }

    Ok(regularize_count)
}

// Solves (L+I)x = b, with x replacing b
fn _lsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in 0..x.len() {
        let xj = x[j];
        let (f, l) = (L.colptr[j], L.colptr[j + 1]);
        for (&row, &Lx) in zip(&L.rowval[f..l], &L.nzval[f..l]) {
            x[row] -= Lx * xj;
        }
    }
}

// Solves (L+I)'x = b, with x replacing b
fn _ltsolve<T: FloatT>(L: &CscMatrix<T>, x: &mut [T]) {
    for j in (0..x.len()).rev() {
        let (f, l) = (L.colptr[j], L.colptr[j + 1]);
        let s = zip(&L.rowval[f..l], &L.nzval[f..l])
            .fold(T::zero(), |acc, (&row, &Lx)| acc + Lx * x[row]);
        x[j] -= s;
    }
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
