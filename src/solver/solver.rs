#![allow(non_snake_case)]

use super::engines::{DirectFactorSolver, DirectSolveMethod, FactorEngine};
use super::structure::{check_pattern, has_full_diagonal, EnginePattern};
use super::*;
use crate::algebra::utils::amd_ordering;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::qdldl::QDLDLError;
use crate::timers::*;
use std::io::Write;

/// Progress of a [`DirectSolver`] through its phases.
///
/// Phases are ordered, and each phase requires that the previous one
/// has completed.  Calling an earlier phase again moves the solver
/// back to that point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SolverPhase {
    Created,
    StructureDefined,
    Reordered,
    Factored,
}

impl std::fmt::Display for SolverPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SolverPhase::Created => "created",
            SolverPhase::StructureDefined => "structure defined",
            SolverPhase::Reordered => "reordered",
            SolverPhase::Factored => "factored",
        };
        write!(f, "{s}")
    }
}

// everything that depends on the matrix structure
#[derive(Debug)]
struct SolverData<T: FloatT> {
    method: DirectSolveMethod,
    // method chosen by "auto", free to switch from LDL to LU
    auto: bool,
    // number of CSR values expected by factor
    nnz: usize,
    pattern: EnginePattern<T>,
    perm: Vec<usize>,
    engine: Option<FactorEngine<T>>,
}

impl<T> SolverData<T>
where
    T: FloatT,
{
    fn refactor(&mut self, nzval: &[T]) -> Result<(), SolverError> {
        self.pattern.gather_values(nzval);
        if let Some(engine) = self.engine.as_mut() {
            engine.update_values(&self.pattern.A.nzval)?;
            engine.refactor()?;
        }
        Ok(())
    }

    // LU of the full matrix in place of LDL, keeping the ordering.
    // The switch holds until the structure is defined again.
    fn switch_to_lu(&mut self, settings: &SolverSettings<T>) -> Result<(), SolverError> {
        self.pattern = self.pattern.mirrored();
        self.method = DirectSolveMethod::LU;
        self.auto = false;
        self.engine = None;
        self.engine = Some(FactorEngine::new(
            self.method,
            &self.pattern.A,
            self.perm.clone(),
            settings,
        )?);
        Ok(())
    }
}

/// Sparse direct solver for square linear systems
///
/// The solver is driven through four phases, called in sequence:
///
/// 1. [`define_structure`](DirectSolver::define_structure) takes the CSR
///    pattern of the matrix and chooses a factorization method,
/// 2. [`reorder`](DirectSolver::reorder) computes a fill reducing ordering
///    and the symbolic factorization,
/// 3. [`factor`](DirectSolver::factor) takes the CSR values and computes
///    the numeric factorization,
/// 4. [`solve`](DirectSolver::solve) solves for one right hand side.
///
/// `factor` can be repeated with new values for the same structure, and
/// `solve` with new right hand sides.
///
/// With the "auto" method a symmetric matrix is factored as LDLᵀ when
/// every diagonal entry is stored.  If that factorization meets a zero
/// pivot, the solver moves to LU of the full matrix and tries again.  Every factorization buffer is owned
/// by the solver and released when it is dropped.
///
/// ```
/// use mmsolve::solver::*;
///
/// // upper triangle of [4 1; 1 3]
/// let rowptr = [0, 2, 3];
/// let colval = [0, 1, 1];
/// let nzval = [4.0f64, 1.0, 3.0];
///
/// let mut solver = DirectSolver::new(SolverSettings::default()).unwrap();
/// solver.define_structure(2, &rowptr, &colval, true).unwrap();
/// solver.reorder().unwrap();
/// solver.factor(&nzval).unwrap();
///
/// let mut x = [0.0; 2];
/// solver.solve(&[5.0, 4.0], &mut x).unwrap();
/// assert!((x[0] - 1.0).abs() < 1e-12 && (x[1] - 1.0).abs() < 1e-12);
/// ```
pub struct DirectSolver<T: FloatT = f64> {
    settings: SolverSettings<T>,
    phase: SolverPhase,
    data: Option<SolverData<T>>,
    /// statistics of the last run of each phase
    pub info: SolveInfo,
    timers: Timers,
    stream: PrintTarget,
}

impl<T> DirectSolver<T>
where
    T: FloatT,
{
    pub fn new(settings: SolverSettings<T>) -> Result<Self, SolverError> {
        settings.validate()?;

        Ok(Self {
            settings,
            phase: SolverPhase::Created,
            data: None,
            info: SolveInfo::new(),
            timers: Timers::default(),
            stream: PrintTarget::default(),
        })
    }

    pub fn settings(&self) -> &SolverSettings<T> {
        &self.settings
    }

    pub fn phase(&self) -> SolverPhase {
        self.phase
    }

    /// Declare the sparsity pattern of an `n`×`n` matrix in CSR form.
    ///
    /// A symmetric matrix must supply its upper triangle only.  Any
    /// previous structure, ordering and factors are discarded.
    pub fn define_structure(
        &mut self,
        n: usize,
        rowptr: &[usize],
        colval: &[usize],
        symmetric: bool,
    ) -> Result<(), SolverError> {
        self.phase = SolverPhase::Created;
        self.data = None;
        self.info = SolveInfo::new();

        self.timed("define_structure", |s| s._define_structure(n, rowptr, colval, symmetric))?;
        self.info.define_structure_time = self.timers.elapsed("define_structure").as_secs_f64();
        self.phase = SolverPhase::StructureDefined;

        self.info.print_structure(&self.settings, &mut self.stream)?;
        Ok(())
    }

    /// Compute the fill reducing ordering and symbolic factorization.
    pub fn reorder(&mut self) -> Result<(), SolverError> {
        self.check_phase("reorder", SolverPhase::StructureDefined)?;
        // any previous factors are invalid from here on
        self.phase = SolverPhase::StructureDefined;

        self.timed("reorder", |s| s._reorder())?;
        self.info.reorder_time = self.timers.elapsed("reorder").as_secs_f64();
        self.phase = SolverPhase::Reordered;

        self.info.print_ordering(&self.settings, &mut self.stream)?;
        Ok(())
    }

    /// Numeric factorization with the values `nzval`, ordered as the
    /// column indices passed to [`define_structure`](DirectSolver::define_structure).
    pub fn factor(&mut self, nzval: &[T]) -> Result<(), SolverError> {
        self.check_phase("factor", SolverPhase::Reordered)?;
        self.phase = SolverPhase::Reordered;

        self.timed("factor", |s| s._factor(nzval))?;
        self.info.factor_time = self.timers.elapsed("factor").as_secs_f64();
        self.phase = SolverPhase::Factored;

        self.info.print_factor(&self.settings, &mut self.stream)?;
        Ok(())
    }

    /// Solve `Ax = b` with the current factors.
    pub fn solve(&mut self, b: &[T], x: &mut [T]) -> Result<(), SolverError> {
        self.check_phase("solve", SolverPhase::Factored)?;

        self.timed("solve", |s| s._solve(b, x))?;
        self.info.solve_time = self.timers.elapsed("solve").as_secs_f64();

        self.info
            .print_footer(&self.settings, &self.timers, &mut self.stream)?;
        Ok(())
    }

    // ---------------------------------
    // internal implementation of the phases
    // ---------------------------------

    fn check_phase(&self, called: &'static str, required: SolverPhase) -> Result<(), SolverError> {
        if self.phase < required {
            return Err(SolverError::PhaseOrder {
                called,
                phase: self.phase,
            });
        }
        Ok(())
    }

    // run one phase under a freshly reset top level timer
    fn timed<R>(&mut self, key: &'static str, f: impl FnOnce(&mut Self) -> R) -> R {
        let mut timers = std::mem::take(&mut self.timers);
        timers.reset_timer(key);

        let result;
        timeit! {timers => key; {
            result = f(self);
        }}

        self.timers = timers;
        result
    }

    fn _define_structure(
        &mut self,
        n: usize,
        rowptr: &[usize],
        colval: &[usize],
        symmetric: bool,
    ) -> Result<(), SolverError> {
        check_pattern(n, rowptr, colval, symmetric)?;

        let full_diagonal = symmetric && has_full_diagonal(n, rowptr, colval);
        let method =
            DirectSolveMethod::select(&self.settings.direct_solve_method, symmetric, full_diagonal)?;

        let mut pattern = EnginePattern::new(n, rowptr, colval);
        if method.needs_full_matrix(symmetric) {
            pattern = pattern.mirrored();
        }

        self.info.n = n;
        self.info.nnz = colval.len();
        self.info.symmetric = symmetric;
        self.info.method = Some(method);

        self.data = Some(SolverData {
            method,
            auto: self.settings.direct_solve_method == "auto",
            nnz: colval.len(),
            pattern,
            perm: Vec::new(),
            engine: None,
        });
        Ok(())
    }

    fn _reorder(&mut self) -> Result<(), SolverError> {
        let phase = self.phase;
        let settings = &self.settings;
        let Some(data) = self.data.as_mut() else {
            return Err(SolverError::PhaseOrder {
                called: "reorder",
                phase,
            });
        };
        let A = &data.pattern.A;
        let n = A.n;

        let perm = if settings.reorder_enable {
            let (perm, _iperm) = amd_ordering(n, &A.colptr, &A.rowval, settings.amd_dense_scale)
                .map_err(|_| SolverError::OrderingFailed)?;
            perm
        } else {
            (0..n).collect()
        };

        data.engine = None;
        data.engine = Some(FactorEngine::new(data.method, A, perm.clone(), settings)?);
        data.perm = perm;
        self.info.reordered = settings.reorder_enable;
        Ok(())
    }

    fn _factor(&mut self, nzval: &[T]) -> Result<(), SolverError> {
        let phase = self.phase;
        let settings = &self.settings;
        let Some(data) = self.data.as_mut().filter(|data| data.engine.is_some()) else {
            return Err(SolverError::PhaseOrder {
                called: "factor",
                phase,
            });
        };

        if nzval.len() != data.nnz {
            return Err(SolverError::IncompatibleValues {
                expected: data.nnz,
                found: nzval.len(),
            });
        }

        match data.refactor(nzval) {
            Err(SolverError::LDLFactor(QDLDLError::ZeroPivot { .. })) if data.auto => {
                data.switch_to_lu(settings)?;
                self.info.method = Some(data.method);
                data.refactor(nzval)?;
            }
            result => result?,
        }

        if let Some(engine) = data.engine.as_ref() {
            self.info.nnz_factor = engine.nnz_factor();
            self.info.modified_pivots = engine.modified_pivots();
        }
        Ok(())
    }

    fn _solve(&mut self, b: &[T], x: &mut [T]) -> Result<(), SolverError> {
        let phase = self.phase;
        let Some(SolverData {
            pattern,
            engine: Some(engine),
            ..
        }) = self.data.as_mut()
        else {
            return Err(SolverError::PhaseOrder {
                called: "solve",
                phase,
            });
        };

        let n = pattern.A.n;
        for len in [b.len(), x.len()] {
            if len != n {
                return Err(SolverError::IncompatibleVector {
                    expected: n,
                    found: len,
                });
            }
        }

        x.copy_from_slice(b);
        engine.solve(x);
        Ok(())
    }
}

impl<T> ConfigurablePrintTarget for DirectSolver<T>
where
    T: FloatT,
{
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

/// Solve `Ax = b`, running every [`DirectSolver`] phase in turn.
///
/// Returns the solution together with the statistics of the solve.
pub fn solve<T>(
    A: &CsrMatrix<T>,
    b: &[T],
    settings: SolverSettings<T>,
) -> Result<(Vec<T>, SolveInfo), SolverError>
where
    T: FloatT,
{
    let mut solver = DirectSolver::new(settings)?;
    solver.define_structure(A.n, &A.rowptr, &A.colval, A.symmetric)?;
    solver.reorder()?;
    solver.factor(&A.nzval)?;

    let mut x = vec![T::zero(); A.n];
    solver.solve(b, &mut x)?;
    Ok((x, solver.info))
}
