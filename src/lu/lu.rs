#![allow(non_snake_case)]
use crate::algebra::utils::{amd_ordering, invperm, ipermute};
use crate::algebra::*;
use derive_builder::Builder;
use std::iter::zip;
use thiserror::Error;

/// Error codes returnable from [`LUFactorisation`](LUFactorisation) factor operations

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LUError {
    #[error("Matrix dimension fields are incompatible")]
    IncompatibleDimension,
    #[error("Matrix is singular: no acceptable pivot in column {column}")]
    ZeroPivot { column: usize },
    #[error("Invalid permutation vector")]
    InvalidPermutation,
    #[error("AMD ordering failed")]
    OrderingFailed,
    #[error("Expected {expected} matrix values, found {found}")]
    IncompatibleValues { expected: usize, found: usize },
}

/// Required settings for [`LUFactorisation`](LUFactorisation)

#[derive(Builder, Debug, Clone)]
pub struct LUSettings<T: FloatT> {
    #[builder(default = "1.0")]
    pub(crate) amd_dense_scale: f64,
    /// fill reducing column ordering.  AMD on the pattern of A + A^T if none
    #[builder(default = "None", setter(strip_option))]
    pub(crate) perm: Option<Vec<usize>>,
    #[builder(default = "false")]
    pub(crate) logical: bool,
    /// the diagonal entry is kept as pivot if it is at least this
    /// fraction of the largest candidate in its column
    #[builder(default = "(0.1).as_T()")]
    pub(crate) pivot_threshold: T,
    /// pivots no larger than this in magnitude are treated as zero
    #[builder(default = "(1e-14).as_T()")]
    pub(crate) pivot_tolerance: T,
}

impl<T> Default for LUSettings<T>
where
    T: FloatT,
{
    fn default() -> LUSettings<T> {
        LUSettings {
            amd_dense_scale: 1.0,
            perm: None,
            logical: false,
            pivot_threshold: (0.1).as_T(),
            pivot_tolerance: (1e-14).as_T(),
        }
    }
}

/// Performs $PAQ = LU$ factorization of a general square sparse matrix
///
/// Columns are taken in a fixed fill reducing order `Q`, and rows are
/// chosen during the factorisation by threshold partial pivoting, with
/// a preference for the diagonal entry.  The factorisation is left
/// looking: each column of L and U comes from a sparse triangular solve
/// with the columns computed so far.
///
/// As for [`QDLDLFactorisation`](crate::qdldl::QDLDLFactorisation), a
/// factorisation created with the `logical` setting holds the structure
/// only until [`refactor`](LUFactorisation::refactor) is called.

#[derive(Debug)]
pub struct LUFactorisation<T = f64> {
    // column permutation
    pub perm: Vec<usize>,
    // row permutation.  pinv[i] is the pivot step of row i
    pub pinv: Vec<usize>,
    // unit lower triangular factor, diagonal stored first in each column
    pub L: CscMatrix<T>,
    // upper triangular factor, diagonal stored last in each column
    pub U: CscMatrix<T>,
    // the matrix being factored
    A: CscMatrix<T>,
    // pivoting parameters
    pivot_threshold: T,
    pivot_tolerance: T,
    // workspace data
    workspace: LUWorkspace<T>,
    // number of pivots taken off the diagonal
    swap_count: usize,
    // is it logical factorisation only?
    is_logical: bool,
}

#[derive(Debug)]
struct LUWorkspace<T> {
    // dense column accumulator, zero between uses
    x: Vec<T>,
    // nonzero pattern of x in xi[top..n].  xi[n..] is the dfs stack
    xi: Vec<usize>,
    // dfs resume positions
    pstack: Vec<usize>,
    // dfs visited markers, false between uses
    marked: Vec<bool>,
}

impl<T> LUWorkspace<T>
where
    T: FloatT,
{
    fn new(n: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            xi: vec![0; 2 * n],
            pstack: vec![0; n],
            marked: vec![false; n],
        }
    }
}

const LU_UNKNOWN: usize = usize::MAX;

impl<T> LUFactorisation<T>
where
    T: FloatT,
{
    pub fn new(
        Ain: &CscMatrix<T>,
        opts: Option<LUSettings<T>>,
    ) -> Result<LUFactorisation<T>, LUError> {
        //sanity check on structure
        check_structure(Ain)?;
        _lu_new(Ain, opts)
    }

    /// number of pivots chosen away from the diagonal
    pub fn swap_count(&self) -> usize {
        self.swap_count
    }

    /// number of nonzeros in L and U, counting both diagonals
    pub fn nnz_LU(&self) -> usize {
        self.L.nnz() + self.U.nnz()
    }

    /// true if no numeric factorisation has been computed yet
    pub fn is_logical(&self) -> bool {
        self.is_logical
    }

    // Solves Ax = b using LU factors for A.
    // Solves in place (x replaces b)
    pub fn solve(&mut self, b: &mut [T]) {
        // bomb if logical factorisation only
        assert!(!self.is_logical);

        // bomb if b is the wrong size
        assert_eq!(b.len(), self.A.n);

        // row permutation, tmp[pinv[i]] = b[i]
        let tmp = &mut self.workspace.x;
        ipermute(tmp, b, &self.pinv);

        _lsolve(&self.L.colptr, &self.L.rowval, &self.L.nzval, tmp);
        _usolve(&self.U.colptr, &self.U.rowval, &self.U.nzval, tmp);

        // column permutation back to the original ordering
        ipermute(b, tmp, &self.perm);

        // the workspace is expected to be zero between uses
        tmp.fill(T::zero());
    }

    /// Replace every value of the input matrix.  `values` is ordered
    /// as the `nzval` field of the matrix the factorisation was
    /// created from.  Call [`refactor`](LUFactorisation::refactor)
    /// afterwards.
    pub fn update_values(&mut self, values: &[T]) -> Result<(), LUError> {
        if values.len() != self.A.nnz() {
            return Err(LUError::IncompatibleValues {
                expected: self.A.nnz(),
                found: values.len(),
            });
        }
        self.A.nzval.copy_from_slice(values);
        Ok(())
    }

    pub fn refactor(&mut self) -> Result<(), LUError> {
        // the row ordering depends on the values, so
        // the factors are rebuilt from scratch
        self.is_logical = true;
        self.swap_count = _factor(
            &self.A,
            &self.perm,
            &mut self.pinv,
            &mut self.L,
            &mut self.U,
            &mut self.workspace,
            self.pivot_threshold,
            self.pivot_tolerance,
        )?;
        self.is_logical = false;
        Ok(())
    }
}

fn check_structure<T: FloatT>(A: &CscMatrix<T>) -> Result<(), LUError> {
    if !A.is_square() {
        return Err(LUError::IncompatibleDimension);
    }
    A.check_format()
        .map_err(|_| LUError::IncompatibleDimension)?;
    Ok(())
}

fn _lu_new<T: FloatT>(
    Ain: &CscMatrix<T>,
    opts: Option<LUSettings<T>>,
) -> Result<LUFactorisation<T>, LUError> {
    let n = Ain.nrows();

    //get default values if no options passed at all
    let opts = opts.unwrap_or_default();

    //Use AMD ordering if a user-provided ordering
    //is not supplied.
    let perm = match opts.perm {
        Some(perm) => {
            if perm.len() != n || invperm(&perm).is_none() {
                return Err(LUError::InvalidPermutation);
            }
            perm
        }
        None => {
            let (perm, _iperm) = amd_ordering(n, &Ain.colptr, &Ain.rowval, opts.amd_dense_scale)
                .map_err(|_| LUError::OrderingFailed)?;
            perm
        }
    };

    let mut factors = LUFactorisation {
        perm,
        pinv: vec![LU_UNKNOWN; n],
        L: CscMatrix::spalloc((n, n), 0),
        U: CscMatrix::spalloc((n, n), 0),
        A: Ain.clone(),
        pivot_threshold: opts.pivot_threshold,
        pivot_tolerance: opts.pivot_tolerance,
        workspace: LUWorkspace::new(n),
        swap_count: 0,
        is_logical: true,
    };

    if !opts.logical {
        factors.refactor()?;
    }

    Ok(factors)
}

// Left looking LU with threshold partial pivoting, following
// Timothy Davis - Direct Methods for Sparse Linear Systems (cs_lu).
// Returns the number of off-diagonal pivots.

#[allow(clippy::too_many_arguments)]
fn _factor<T: FloatT>(
    A: &CscMatrix<T>,
    q: &[usize],
    pinv: &mut [usize],
    L: &mut CscMatrix<T>,
    U: &mut CscMatrix<T>,
    workspace: &mut LUWorkspace<T>,
    pivot_threshold: T,
    pivot_tolerance: T,
) -> Result<usize, LUError> {
    let n = A.n;
    let mut swap_count = 0;

    pinv.fill(LU_UNKNOWN);

    // fill in is unknown ahead of time, so the
    // factors grow as the columns are computed
    L.colptr.fill(0);
    L.rowval.clear();
    L.nzval.clear();
    U.colptr.fill(0);
    U.rowval.clear();
    U.nzval.clear();

    for k in 0..n {
        L.colptr[k] = L.rowval.len();
        U.colptr[k] = U.rowval.len();

        // x = L \ A[:,col]
        let col = q[k];
        let top = _spsolve(L, A, col, pinv, workspace);
        let x = &mut workspace.x;
        let xi = &workspace.xi;

        // find the largest candidate pivot.  Entries in
        // rows that are already pivotal belong to U
        let mut ipiv = LU_UNKNOWN;
        let mut a = T::zero();
        for &i in &xi[top..n] {
            if pinv[i] == LU_UNKNOWN {
                let t = T::abs(x[i]);
                if t > a || ipiv == LU_UNKNOWN {
                    a = t;
                    ipiv = i;
                }
            } else {
                U.rowval.push(pinv[i]);
                U.nzval.push(x[i]);
            }
        }

        if ipiv == LU_UNKNOWN || a <= pivot_tolerance {
            // leave the workspace clean for a later refactor
            for &i in &xi[top..n] {
                x[i] = T::zero();
            }
            return Err(LUError::ZeroPivot { column: k });
        }

        // prefer the diagonal if it is large enough
        let d = T::abs(x[col]);
        if pinv[col] == LU_UNKNOWN && d > pivot_tolerance && d >= a * pivot_threshold {
            ipiv = col;
        }
        if ipiv != col {
            swap_count += 1;
        }

        // diagonal of U is the last entry in the column
        let pivot = x[ipiv];
        U.rowval.push(k);
        U.nzval.push(pivot);
        pinv[ipiv] = k;

        // diagonal of L is the first entry in the column
        L.rowval.push(ipiv);
        L.nzval.push(T::one());
        for &i in &xi[top..n] {
            if pinv[i] == LU_UNKNOWN {
                L.rowval.push(i);
                L.nzval.push(x[i] / pivot);
            }
            x[i] = T::zero();
        }
    }

    L.colptr[n] = L.rowval.len();
    U.colptr[n] = U.rowval.len();

    // L was built in original row numbering
    for i in L.rowval.iter_mut() {
        *i = pinv[*i];
    }

    Ok(swap_count)
}

// Sparse triangular solve x = L \ A[:,col] with the partial factor L,
// whose columns are identified with rows through pinv.  The nonzero
// pattern of x is returned in xi[top..n]
fn _spsolve<T: FloatT>(
    L: &CscMatrix<T>,
    A: &CscMatrix<T>,
    col: usize,
    pinv: &[usize],
    workspace: &mut LUWorkspace<T>,
) -> usize {
    let top = _reach(L, A, col, pinv, workspace);
    let x = &mut workspace.x;
    let xi = &workspace.xi;
    let n = A.n;

    // scatter A[:,col] into x
    for p in A.colptr[col]..A.colptr[col + 1] {
        x[A.rowval[p]] = A.nzval[p];
    }

    for &j in &xi[top..n] {
        let J = pinv[j];
        if J == LU_UNKNOWN {
            // column J of L is not computed yet
            continue;
        }
        // L has a unit diagonal stored first
        let xj = x[j];
        let (f, l) = (L.colptr[J] + 1, L.colptr[J + 1]);
        for (&Lij, &Lxj) in zip(&L.rowval[f..l], &L.nzval[f..l]) {
            x[Lij] -= Lxj * xj;
        }
    }
    top
}

// Nonzero pattern of L \ A[:,col], in topological order in xi[top..n]
fn _reach<T: FloatT>(
    L: &CscMatrix<T>,
    A: &CscMatrix<T>,
    col: usize,
    pinv: &[usize],
    workspace: &mut LUWorkspace<T>,
) -> usize {
    let n = A.n;
    let mut top = n;

    for p in A.colptr[col]..A.colptr[col + 1] {
        let i = A.rowval[p];
        if !workspace.marked[i] {
            top = _dfs(i, L, top, pinv, workspace);
        }
    }

    // clear the markers for the next column
    for &i in &workspace.xi[top..n] {
        workspace.marked[i] = false;
    }
    top
}

// Depth first search in the graph of L from node j, without recursion.
// Finished nodes are pushed on to xi[top..n]
fn _dfs<T: FloatT>(
    j: usize,
    L: &CscMatrix<T>,
    mut top: usize,
    pinv: &[usize],
    workspace: &mut LUWorkspace<T>,
) -> usize {
    let n = workspace.marked.len();
    let (xi, stack) = workspace.xi.split_at_mut(n);
    let pstack = &mut workspace.pstack;
    let marked = &mut workspace.marked;

    let mut head = 0;
    stack[0] = j;

    loop {
        let j = stack[head];
        let jnew = pinv[j];
        let (start, end) = if jnew == LU_UNKNOWN {
            (0, 0)
        } else {
            (L.colptr[jnew], L.colptr[jnew + 1])
        };

        if !marked[j] {
            marked[j] = true;
            pstack[head] = start;
        }

        // look for an unvisited neighbour
        let mut next = None;
        for p in pstack[head]..end {
            let i = L.rowval[p];
            if !marked[i] {
                pstack[head] = p;
                next = Some(i);
                break;
            }
        }

        match next {
            Some(i) => {
                // pause dfs of node j and start at node i
                head += 1;
                stack[head] = i;
            }
            None => {
                // node j is done
                top -= 1;
                xi[top] = j;
                if head == 0 {
                    break;
                }
                head -= 1;
            }
        }
    }
    top
}

// Solves Lx = b with unit diagonal L stored first in each column,
// with x replacing b
fn _lsolve<T: FloatT>(Lp: &[usize], Li: &[usize], Lx: &[T], x: &mut [T]) {
    for j in 0..x.len() {
        let xj = x[j];
        let (f, l) = (Lp[j] + 1, Lp[j + 1]);
        for (&Lij, &Lxj) in zip(&Li[f..l], &Lx[f..l]) {
            x[Lij] -= Lxj * xj;
        }
    }
}

// Solves Ux = b with diagonal of U stored last in each column,
// with x replacing b
fn _usolve<T: FloatT>(Up: &[usize], Ui: &[usize], Ux: &[T], x: &mut [T]) {
    for j in (0..x.len()).rev() {
        let (f, l) = (Up[j], Up[j + 1] - 1);
        x[j] /= Ux[l];
        let xj = x[j];
        for (&Uij, &Uxj) in zip(&Ui[f..l], &Ux[f..l]) {
            x[Uij] -= Uxj * xj;
        }
    }
}

//configure tests of internals
#[path = "test.rs"]
#[cfg(test)]
mod test;
