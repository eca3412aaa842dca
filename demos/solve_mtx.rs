#![allow(non_snake_case)]
use mmsolve::algebra::*;
use mmsolve::io::read_matrix_market;
use mmsolve::solver::*;
use std::env;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filename = "lap2d_4x4.mtx";
    // let filename = "convdiff_8.mtx";

    // Get the path to the crate root using the CARGO_MANIFEST_DIR environment variable
    let cargo_dir = env::var("CARGO_MANIFEST_DIR")?;
    let data_path = PathBuf::from(cargo_dir).join("demos").join("data");
    let filename = data_path.join(filename);

    let coo: CooMatrix<f64> = read_matrix_market(&filename)?;
    let A = CsrMatrix::try_from(coo)?;

    let b = vec![1.0; A.n];

    let settings = SolverSettingsBuilder::default()
        .verbose(true)
        .build()?;

    let (x, info) = solve(&A, &b, settings)?;

    println!();
    println!("nnz(factor)  = {}", info.nnz_factor);
    println!("‖Ax - b‖∞    = {:e}", A.residual_norm_inf(&x, &b));

    Ok(())
}
