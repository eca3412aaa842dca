//! Property-based tests for Matrix Market reading and CSR assembly

use mmsolve::algebra::*;
use mmsolve::io::read_matrix_market_from;
use proptest::prelude::*;
use std::collections::BTreeMap;

// Type alias for the triplet strategy return type
type TripletData = (usize, Vec<(usize, usize, f64)>);

/// Generate a dimension and triplets within it, duplicates allowed
fn triplet_strategy(max_n: usize, max_nnz: usize) -> impl Strategy<Value = TripletData> {
    (1..=max_n).prop_flat_map(move |n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, -100.0..100.0f64), 0..=max_nnz),
        )
    })
}

fn coo_from(n: usize, triplets: &[(usize, usize, f64)]) -> CooMatrix<f64> {
    let mut coo = CooMatrix::new(n, triplets.len());
    for &(i, j, v) in triplets {
        coo.put(i, j, v).unwrap();
    }
    coo
}

proptest! {
    /// Property: one CSR entry per distinct (row, col), holding the sum of its duplicates
    #[test]
    fn prop_csr_merges_duplicates((n, triplets) in triplet_strategy(12, 40)) {
        let mut expected: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        for &(i, j, v) in &triplets {
            *expected.entry((i, j)).or_insert(0.0) += v;
        }

        let A = CsrMatrix::try_from(coo_from(n, &triplets)).unwrap();

        prop_assert!(A.check_format().is_ok());
        prop_assert_eq!(A.rowptr[n], expected.len());
        prop_assert_eq!(A.nnz(), expected.len());
        for row in 0..n {
            let cols = A.row_colval(row);
            prop_assert!(cols.windows(2).all(|c| c[0] < c[1]));
        }
        for (&(i, j), &v) in &expected {
            let stored = A.get_entry((i, j));
            prop_assert!(stored.is_some());
            prop_assert!((stored.unwrap() - v).abs() <= 1e-9);
        }
    }

    /// Property: put succeeds exactly `capacity` times
    #[test]
    fn prop_put_respects_capacity(capacity in 0usize..20) {
        let mut coo = CooMatrix::<f64>::new(4, capacity);
        for k in 0..capacity {
            prop_assert!(coo.put(k % 4, (k / 4) % 4, 1.0).is_ok());
            prop_assert_eq!(coo.nnz(), k + 1);
        }
        let err = coo.put(0, 0, 1.0).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::Capacity);
        prop_assert_eq!(coo.nnz(), capacity);
    }

    /// Property: symmetric files store the lower triangle transposed
    #[test]
    fn prop_symmetric_read_transposes((n, triplets) in triplet_strategy(10, 30)) {
        // keep the lower triangle only, as symmetric files do
        let lower: Vec<_> = triplets
            .into_iter()
            .map(|(i, j, v)| if i >= j { (i, j, v) } else { (j, i, v) })
            .collect();

        let mut text = String::from("%%MatrixMarket matrix coordinate real symmetric\n");
        text.push_str(&format!("{} {} {}\n", n, n, lower.len()));
        for &(i, j, v) in &lower {
            text.push_str(&format!("{} {} {:e}\n", i + 1, j + 1, v));
        }

        let coo: CooMatrix<f64> = read_matrix_market_from(text.as_bytes()).unwrap();
        prop_assert!(coo.symmetric);
        prop_assert_eq!(coo.nnz(), lower.len());
        for ((row, col, x), &(i, j, v)) in coo.triplets().zip(&lower) {
            prop_assert_eq!((row, col), (j, i));
            prop_assert_eq!(x, v);
        }

        let A = CsrMatrix::try_from(coo).unwrap();
        prop_assert!(A.is_triu());
    }
}
