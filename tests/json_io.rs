#![allow(non_snake_case)]

#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use mmsolve::{algebra::*, io::MatrixJSONReadWrite, solver::*};
    use std::io::{Seek, SeekFrom};

    // [4 1 0]
    // [2 5 1]
    // [0 3 6]
    let mut coo = CooMatrix::new(3, 7);
    for (i, j, v) in [
        (0, 0, 4.0),
        (0, 1, 1.0),
        (1, 0, 2.0),
        (1, 1, 5.0),
        (1, 2, 1.0),
        (2, 1, 3.0),
        (2, 2, 6.0),
    ] {
        coo.put(i, j, v).unwrap();
    }
    let A = CsrMatrix::try_from(coo).unwrap();
    let b = [6.0, 15.0, 24.0];

    // write the matrix to a file
    let mut file = tempfile::tempfile().unwrap();
    A.write_to_file(&mut file).unwrap();

    // read the matrix from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let A2 = CsrMatrix::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(A, A2);

    let (x, _) = solve(&A, &b, SolverSettings::default()).unwrap();
    let (x2, _) = solve(&A2, &b, SolverSettings::default()).unwrap();
    assert_eq!(x, x2);
    assert!(A2.residual_norm_inf(&x2, &b) < 1e-12);
}

#[cfg(feature = "serde")]
#[test]
fn test_settings_json() {
    use mmsolve::solver::*;

    let settings = SolverSettingsBuilder::<f64>::default()
        .direct_solve_method("lu".to_string())
        .pivot_threshold(0.5)
        .build()
        .unwrap();

    let json = serde_json::to_string(&settings).unwrap();
    let settings2: SolverSettings<f64> = serde_json::from_str(&json).unwrap();
    assert_eq!(settings2.direct_solve_method, "lu");
    assert_eq!(settings2.pivot_threshold, 0.5);

    // missing fields take their defaults
    let settings3: SolverSettings<f64> = serde_json::from_str(r#"{"verbose":true}"#).unwrap();
    assert!(settings3.verbose);
    assert_eq!(settings3.direct_solve_method, "auto");
    assert!(settings3.validate().is_ok());
}
