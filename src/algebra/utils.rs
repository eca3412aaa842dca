// permutation and ordering helpers shared by the factorization
// backends.  permute / ipermute do not allocate.

use std::iter::zip;

// x = b[p]
pub(crate) fn permute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, x).for_each(|(p, x)| *x = b[*p]);
}

// x[p] = b
pub(crate) fn ipermute<T: Copy>(x: &mut [T], b: &[T], p: &[usize]) {
    zip(p, b).for_each(|(p, b)| x[*p] = *b);
}

// Construct an inverse permutation from a permutation.
// Returns None if p is not a permutation of 0..p.len()
pub(crate) fn invperm(p: &[usize]) -> Option<Vec<usize>> {
    let mut b = vec![usize::MAX; p.len()];
    for (i, &j) in p.iter().enumerate() {
        if j >= p.len() || b[j] != usize::MAX {
            return None;
        }
        b[j] = i;
    }
    Some(b)
}

// Approximate minimum degree ordering of the pattern of A + A^T, for a
// square matrix given in compressed column form.  Returns (perm, iperm).
// The dense row threshold of AMD is scaled by `dense_scale`.
pub(crate) fn amd_ordering(
    n: usize,
    colptr: &[usize],
    rowval: &[usize],
    dense_scale: f64,
) -> Result<(Vec<usize>, Vec<usize>), amd::Status> {
    // amd needs nnz >= n.  Sparser patterns keep the natural order
    if colptr[n] < n {
        let identity: Vec<usize> = (0..n).collect();
        return Ok((identity.clone(), identity));
    }

    let mut control = amd::Control::default();
    control.dense *= dense_scale;
    let (perm, iperm, _info) = amd::order(n, colptr, rowval, &control)?;
    Ok((perm, iperm))
}

// -------------
// testing

#[test]
fn test_permute() {
    let mut x = vec![0; 5];
    let b = [6, 7, 8, 9, 10];
    let p = [2, 4, 1, 3, 0];

    permute(&mut x, &b, &p);

    assert_eq!(x, [8, 10, 7, 9, 6]);
}

#[test]
fn test_ipermute() {
    let mut x = vec![0; 5];
    let b = [8, 10, 7, 9, 6];
    let p = [2, 4, 1, 3, 0];

    ipermute(&mut x, &b, &p);

    assert_eq!(x, [6, 7, 8, 9, 10]);
}

#[test]
fn test_invperm() {
    assert_eq!(invperm(&[3, 0, 2, 1]), Some(vec![1, 3, 2, 0]));
    assert_eq!(invperm(&[3, 0, 2, 0]), None); //repeated index
    assert_eq!(invperm(&[4, 0, 2, 1]), None); //index too big
}

#[test]
fn test_amd_ordering_is_permutation() {
    // arrow matrix, dense in the first row and column
    let n = 5;
    let mut colptr = vec![0];
    let mut rowval = vec![];
    for col in 0..n {
        if col == 0 {
            rowval.extend(0..n);
        } else {
            rowval.extend([0, col]);
        }
        colptr.push(rowval.len());
    }

    let (perm, iperm) = amd_ordering(n, &colptr, &rowval, 1.0).unwrap();
    assert_eq!(invperm(&perm), Some(iperm));

    // a leaf is eliminated before the hub
    assert_ne!(perm[0], 0);
}

#[test]
fn test_amd_ordering_sparse_pattern() {
    // upper triangle of [0 1; 1 0] has one entry for two columns
    let (perm, iperm) = amd_ordering(2, &[0, 0, 1], &[0], 1.0).unwrap();
    assert_eq!(perm, vec![0, 1]);
    assert_eq!(iperm, vec![0, 1]);

    // no entries at all
    let (perm, _) = amd_ordering(3, &[0, 0, 0, 0], &[], 1.0).unwrap();
    assert_eq!(perm, vec![0, 1, 2]);
}
