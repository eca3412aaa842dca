use super::{DirectSolveMethod, SolverSettings};
use crate::algebra::*;
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

/// Statistics of the most recent run of each [`DirectSolver`](crate::solver::DirectSolver) phase

#[derive(Default, Debug, Clone)]
pub struct SolveInfo {
    /// matrix dimension
    pub n: usize,
    /// number of stored matrix entries
    pub nnz: usize,
    /// true if only the upper triangle is stored
    pub symmetric: bool,
    /// factorization method, once the structure is defined
    pub method: Option<DirectSolveMethod>,
    /// true if a fill reducing ordering was computed
    pub reordered: bool,
    /// number of nonzeros in the factors, counting diagonals
    pub nnz_factor: usize,
    /// regularized pivots (LDL) or off-diagonal pivots (LU)
    pub modified_pivots: usize,
    pub define_structure_time: f64,
    pub reorder_time: f64,
    pub factor_time: f64,
    pub solve_time: f64,
}

impl SolveInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// total time of the last run of every phase
    pub fn total_time(&self) -> f64 {
        self.define_structure_time + self.reorder_time + self.factor_time + self.solve_time
    }

    pub(crate) fn print_structure<T: FloatT>(
        &self,
        settings: &SolverSettings<T>,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        writeln!(out, "-------------------------------------------------------------")?;
        writeln!(
            out,
            "           mmsolve v{}  -  sparse direct solve",
            crate::VERSION
        )?;
        writeln!(out, "-------------------------------------------------------------")?;

        writeln!(out, "\nstructure:")?;
        writeln!(out, "  dimension  = {}", self.n)?;
        writeln!(out, "  nnz(A)     = {}", self.nnz)?;
        let storage = match self.symmetric {
            true => "symmetric (upper triangle)",
            false => "general",
        };
        writeln!(out, "  storage    = {storage}")?;
        if let Some(method) = self.method {
            writeln!(
                out,
                "  method     = {method}, precision: {} bit",
                _get_precision_string::<T>()
            )?;
        }
        std::io::Result::Ok(())
    }

    pub(crate) fn print_ordering<T: FloatT>(
        &self,
        settings: &SolverSettings<T>,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        writeln!(out, "\nordering:")?;
        if self.reordered {
            writeln!(out, "  amd, dense scale = {:.1}", settings.amd_dense_scale)?;
        } else {
            writeln!(out, "  natural")?;
        }
        std::io::Result::Ok(())
    }

    pub(crate) fn print_factor<T: FloatT>(
        &self,
        settings: &SolverSettings<T>,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        writeln!(out, "\nfactor:")?;
        writeln!(out, "  nnz(factor) = {}", self.nnz_factor)?;
        match self.method {
            Some(DirectSolveMethod::QDLDL) => {
                writeln!(
                    out,
                    "  dynamic reg: {}, ϵ = {:.1e}, δ = {:.1e}",
                    _bool_on_off(settings.regularize_enable),
                    settings.regularize_eps,
                    settings.regularize_delta
                )?;
                writeln!(out, "  regularized pivots = {}", self.modified_pivots)?;
            }
            Some(DirectSolveMethod::LU) => {
                writeln!(
                    out,
                    "  pivot threshold = {:.2}, tolerance = {:.1e}",
                    settings.pivot_threshold, settings.pivot_tolerance
                )?;
                writeln!(out, "  off-diagonal pivots = {}", self.modified_pivots)?;
            }
            None => (),
        }
        std::io::Result::Ok(())
    }

    pub(crate) fn print_footer<T: FloatT>(
        &self,
        settings: &SolverSettings<T>,
        timers: &Timers,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        writeln!(out, "\ntimings:")?;
        timers.print(out)?;
        writeln!(
            out,
            "total time = {:?}",
            Duration::from_secs_f64(self.total_time())
        )?;
        out.flush()?;
        std::io::Result::Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}
