#![allow(non_snake_case)]

use crate::algebra::*;

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

/// Reading and writing of assembled matrices as JSON.
///
/// Only available with the `serde` feature.
pub trait MatrixJSONReadWrite: Sized {
    /// write the matrix to a file in JSON format
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error>;
    /// read a matrix from a JSON file
    fn read_from_file(file: &mut File) -> Result<Self, io::Error>;
}

impl<T> MatrixJSONReadWrite for CsrMatrix<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let json = serde_json::to_string(&self)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let A: CsrMatrix<T> = serde_json::from_str(&buffer)?;

        // the file may have been edited by hand
        A.check_format()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(A)
    }
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let A = CsrMatrix::new(
        3,
        vec![0, 2, 3, 4],
        vec![0, 2, 1, 2],
        vec![4.0, 1.0, 3.0, 0.1 + 0.2],
        true,
    );

    // write the matrix to a file
    let mut file = tempfile::tempfile().unwrap();
    A.write_to_file(&mut file).unwrap();

    // read the matrix from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let B = CsrMatrix::<f64>::read_from_file(&mut file).unwrap();
    assert_eq!(A, B);
}

#[test]
fn test_json_rejects_bad_structure() {
    use std::io::{Seek, SeekFrom};

    // columns out of order in row 0
    let json = r#"{"n":2,"rowptr":[0,2,2],"colval":[1,0],"nzval":[1.0,2.0],"symmetric":false}"#;

    let mut file = tempfile::tempfile().unwrap();
    file.write_all(json.as_bytes()).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();

    let err = CsrMatrix::<f64>::read_from_file(&mut file).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}
