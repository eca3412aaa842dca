#![allow(non_snake_case)]

use mmsolve::{io::ConfigurablePrintTarget, solver::*};

fn test_print_solver() -> DirectSolver<f64> {
    let settings = SolverSettingsBuilder::default()
        .verbose(true)
        .build()
        .unwrap();
    DirectSolver::new(settings).unwrap()
}

// upper triangle of [2 1; 1 2]
fn run_phases(solver: &mut DirectSolver<f64>) {
    solver.define_structure(2, &[0, 2, 3], &[0, 1, 1], true).unwrap();
    solver.reorder().unwrap();
    solver.factor(&[2.0, 1.0, 2.0]).unwrap();
    let mut x = [0.0; 2];
    solver.solve(&[3.0, 3.0], &mut x).unwrap();
}

fn read_back(mut file: std::fs::File) -> String {
    use std::io::{Read, Seek};

    file.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file.read_to_string(&mut result).unwrap();
    result
}

#[test]
fn test_print_to_stdout() {
    let mut solver = test_print_solver();
    solver.print_to_stdout();
    run_phases(&mut solver);
}

#[test]
fn test_print_to_buffer() {
    let mut solver = test_print_solver();
    solver.print_to_buffer();
    run_phases(&mut solver);
    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("mmsolve v"));
    assert!(result.contains("total time = "));
}

#[test]
fn test_print_to_file() {
    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    run_phases(&mut solver);

    assert!(read_back(file2).contains("mmsolve v"));
}

#[test]
fn test_print_to_stream() {
    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    solver.print_to_stream(stream);
    run_phases(&mut solver);

    assert!(read_back(file2).contains("mmsolve v"));
}

#[test]
fn test_print_to_sink() {
    let mut solver = test_print_solver();
    solver.print_to_sink();
    run_phases(&mut solver);
    // no output
}
