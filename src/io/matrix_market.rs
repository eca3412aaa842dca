#![allow(non_snake_case)]

use crate::algebra::{CooMatrix, ErrorKind, FloatT, SparseFormatError};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

// Reader for the coordinate / real / {general,symmetric} subset of the
// Matrix Market exchange format:
//
//   %%MatrixMarket matrix coordinate real <general|symmetric>
//   % optional comment lines
//   <rows> <columns> <nnz>
//   <row> <col> <value>     (nnz lines, 1-based indices)
//
// Symmetric files list the lower triangle.  Those entries are stored
// transposed so that the resulting matrix holds the upper triangle.

const BANNER: &str = "%%MatrixMarket";

/// Symmetry token of a Matrix Market header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixSymmetry {
    /// all entries are listed
    General,
    /// only the lower triangle is listed
    Symmetric,
}

/// Parsed Matrix Market header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixMarketHeader {
    pub symmetry: MatrixSymmetry,
}

/// Reasons a line of Matrix Market text fails to parse
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatProblem {
    #[error("header must have exactly 5 tokens, found {found}")]
    HeaderTokenCount { found: usize },
    #[error("header must start with %%MatrixMarket, found \"{0}\"")]
    Banner(String),
    #[error("object must be \"matrix\", found \"{0}\"")]
    Object(String),
    #[error("format must be \"coordinate\", found \"{0}\"")]
    Format(String),
    #[error("number kind must be \"real\", found \"{0}\"")]
    Field(String),
    #[error("symmetry must be \"general\" or \"symmetric\", found \"{0}\"")]
    Symmetry(String),
    #[error("input ends before the dimension line")]
    MissingDimensionLine,
    #[error("cannot parse the dimensions (rows, columns, nnz)")]
    DimensionLine,
    #[error("matrix must be square, found {rows} x {cols}")]
    NonSquare { rows: usize, cols: usize },
    #[error("cannot parse the entry (row, col, value)")]
    DataLine,
    #[error("header declares {declared} entries, found {found}")]
    EntryCountMismatch { declared: usize, found: usize },
}

/// Error type returned by the Matrix Market reader.
///
/// Every variant that relates to a position in the input carries the
/// 1-based line number at which the problem was detected.
#[derive(Error, Debug)]
pub enum MatrixMarketError {
    #[error("cannot open file \"{}\": {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: read failure: {source}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read any line from the input")]
    Empty,
    #[error("line {line}: {problem}")]
    Format { line: usize, problem: FormatProblem },
    #[error("line {line}: index 0 in 1-based data")]
    ZeroIndex { line: usize },
    #[error("line {line}: {source}")]
    Entry {
        line: usize,
        #[source]
        source: SparseFormatError,
    },
}

impl MatrixMarketError {
    /// The error classification of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MatrixMarketError::Open { .. }
            | MatrixMarketError::Read { .. }
            | MatrixMarketError::Empty => ErrorKind::Io,
            MatrixMarketError::Format { .. } => ErrorKind::Format,
            MatrixMarketError::ZeroIndex { .. } => ErrorKind::Range,
            MatrixMarketError::Entry { source, .. } => source.kind(),
        }
    }

    /// The 1-based input line the error refers to, if any
    pub fn line(&self) -> Option<usize> {
        match self {
            MatrixMarketError::Read { line, .. }
            | MatrixMarketError::Format { line, .. }
            | MatrixMarketError::ZeroIndex { line }
            | MatrixMarketError::Entry { line, .. } => Some(*line),
            _ => None,
        }
    }
}

impl MatrixMarketHeader {
    /// Parse and check the five header tokens.
    pub fn parse(line: &str) -> Result<Self, FormatProblem> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [banner, object, format, field, symmetry] = tokens[..] else {
            return Err(FormatProblem::HeaderTokenCount {
                found: tokens.len(),
            });
        };

        if banner != BANNER {
            return Err(FormatProblem::Banner(banner.to_string()));
        }
        if object != "matrix" {
            return Err(FormatProblem::Object(object.to_string()));
        }
        if format != "coordinate" {
            return Err(FormatProblem::Format(format.to_string()));
        }
        if field != "real" {
            return Err(FormatProblem::Field(field.to_string()));
        }
        let symmetry = match symmetry {
            "general" => MatrixSymmetry::General,
            "symmetric" => MatrixSymmetry::Symmetric,
            _ => return Err(FormatProblem::Symmetry(symmetry.to_string())),
        };

        Ok(MatrixMarketHeader { symmetry })
    }
}

/// Read a Matrix Market file into a [`CooMatrix`].
///
/// The file is closed before returning, whether or not reading succeeded.
/// See [`read_matrix_market_from`] for the accepted format.
pub fn read_matrix_market<T, P>(path: P) -> Result<CooMatrix<T>, MatrixMarketError>
where
    T: FloatT,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| MatrixMarketError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_matrix_market_from(BufReader::new(file))
}

/// Read Matrix Market text from a buffered stream into a [`CooMatrix`].
///
/// The returned matrix has exactly as many entries as the dimension line
/// declares.  For `symmetric` files each entry `(i, j, x)` is stored at
/// `(j-1, i-1)`, otherwise at `(i-1, j-1)`.
///
/// ```
/// use mmsolve::algebra::CooMatrix;
/// use mmsolve::io::read_matrix_market_from;
///
/// let text = "%%MatrixMarket matrix coordinate real symmetric\n\
///             3 3 2\n\
///             2 1 5.0\n\
///             3 3 9.0\n";
///
/// let A: CooMatrix = read_matrix_market_from(text.as_bytes()).unwrap();
/// assert!(A.symmetric);
/// assert_eq!(A.rowval, vec![0, 2]);
/// assert_eq!(A.colval, vec![1, 2]);
/// ```
pub fn read_matrix_market_from<T, R>(reader: R) -> Result<CooMatrix<T>, MatrixMarketError>
where
    T: FloatT,
    R: BufRead,
{
    let mut lines = reader.lines().enumerate().map(|(k, text)| (k + 1, text));

    let header = match lines.next() {
        None => return Err(MatrixMarketError::Empty),
        Some((line, text)) => text.map_err(|source| MatrixMarketError::Read { line, source })?,
    };
    let header = MatrixMarketHeader::parse(&header)
        .map_err(|problem| MatrixMarketError::Format { line: 1, problem })?;

    let mut coo: Option<CooMatrix<T>> = None;
    let mut last_line = 1;

    for (line, text) in lines {
        let text = text.map_err(|source| MatrixMarketError::Read { line, source })?;
        last_line = line;

        let text = text.trim();
        if text.is_empty() {
            continue;
        }

        match coo {
            None => {
                if text.starts_with('%') {
                    continue;
                }
                let (n, nnz) = parse_dimension_line(text)
                    .map_err(|problem| MatrixMarketError::Format { line, problem })?;
                let mut A = CooMatrix::new(n, nnz);
                A.symmetric = header.symmetry == MatrixSymmetry::Symmetric;
                coo = Some(A);
            }
            Some(ref mut A) => {
                let (i, j, x) = parse_data_line::<T>(text)
                    .map_err(|problem| MatrixMarketError::Format { line, problem })?;
                if i == 0 || j == 0 {
                    return Err(MatrixMarketError::ZeroIndex { line });
                }
                let (row, col) = match header.symmetry {
                    MatrixSymmetry::Symmetric => (j - 1, i - 1),
                    MatrixSymmetry::General => (i - 1, j - 1),
                };
                A.put(row, col, x)
                    .map_err(|source| MatrixMarketError::Entry { line, source })?;
            }
        }
    }

    let A = coo.ok_or(MatrixMarketError::Format {
        line: last_line,
        problem: FormatProblem::MissingDimensionLine,
    })?;

    if !A.is_full() {
        return Err(MatrixMarketError::Format {
            line: last_line,
            problem: FormatProblem::EntryCountMismatch {
                declared: A.capacity,
                found: A.nnz(),
            },
        });
    }

    Ok(A)
}

// rows, cols, nnz.  Returns (dimension, nnz).
fn parse_dimension_line(text: &str) -> Result<(usize, usize), FormatProblem> {
    let fields: Vec<usize> = text
        .split_whitespace()
        .map(|tok| tok.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|_| FormatProblem::DimensionLine)?;

    let [rows, cols, nnz] = fields[..] else {
        return Err(FormatProblem::DimensionLine);
    };
    if rows != cols {
        return Err(FormatProblem::NonSquare { rows, cols });
    }
    Ok((rows, nnz))
}

// row, col, value with 1-based indices
fn parse_data_line<T: FloatT>(text: &str) -> Result<(usize, usize, T), FormatProblem> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let [i, j, x] = tokens[..] else {
        return Err(FormatProblem::DataLine);
    };
    let i = i.parse::<usize>().map_err(|_| FormatProblem::DataLine)?;
    let j = j.parse::<usize>().map_err(|_| FormatProblem::DataLine)?;
    let x = x.parse::<T>().map_err(|_| FormatProblem::DataLine)?;
    Ok((i, j, x))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<CooMatrix<f64>, MatrixMarketError> {
        read_matrix_market_from(text.as_bytes())
    }

    fn format_problem(text: &str) -> (usize, FormatProblem) {
        match read(text) {
            Err(MatrixMarketError::Format { line, problem }) => (line, problem),
            other => panic!("expected a format error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_symmetric_transposes() {
        let A = read(
            "%%MatrixMarket matrix coordinate real symmetric\n\
             3 3 2\n\
             2 1 5.0\n\
             3 3 9.0\n",
        )
        .unwrap();

        assert_eq!(A.dimension, 3);
        assert!(A.symmetric);
        let triplets: Vec<_> = A.triplets().collect();
        assert_eq!(triplets, vec![(0, 1, 5.0), (2, 2, 9.0)]);
    }

    #[test]
    fn test_read_general_keeps_order() {
        let A = read(
            "%%MatrixMarket matrix coordinate real general\n\
             % a comment\n\
             %another\n\
             2 2 2\n\
             1 2 3.0\n\
             2 1 4.0\n",
        )
        .unwrap();

        assert!(!A.symmetric);
        let triplets: Vec<_> = A.triplets().collect();
        assert_eq!(triplets, vec![(0, 1, 3.0), (1, 0, 4.0)]);
    }

    #[test]
    fn test_read_zero_entries() {
        let A = read("%%MatrixMarket matrix coordinate real general\n4 4 0\n").unwrap();
        assert_eq!(A.dimension, 4);
        assert_eq!(A.nnz(), 0);
        assert_eq!(A.capacity, 0);
    }

    #[test]
    fn test_read_blank_lines_and_exponents() {
        let A = read(
            "%%MatrixMarket   matrix coordinate real general\r\n\
             \n\
             2 2 1\r\n\
             \n\
             \t2  2   -1.5e-3\r\n",
        )
        .unwrap();
        assert_eq!(A.triplets().collect::<Vec<_>>(), vec![(1, 1, -1.5e-3)]);
    }

    #[test]
    fn test_read_empty_input() {
        let err = read("").unwrap_err();
        assert!(matches!(err, MatrixMarketError::Empty));
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(err.line(), None);
    }

    #[test]
    fn test_read_header_errors() {
        let cases = [
            (
                "%%MatrixMarket matrix coordinate real\n",
                FormatProblem::HeaderTokenCount { found: 4 },
            ),
            (
                "%%MatrixMarket matrix coordinate real general extra\n",
                FormatProblem::HeaderTokenCount { found: 6 },
            ),
            (
                "%MatrixMarket matrix coordinate real general\n",
                FormatProblem::Banner("%MatrixMarket".to_string()),
            ),
            (
                "%%MatrixMarket vector coordinate real general\n",
                FormatProblem::Object("vector".to_string()),
            ),
            (
                "%%MatrixMarket matrix array real general\n",
                FormatProblem::Format("array".to_string()),
            ),
            (
                "%%MatrixMarket matrix coordinate complex general\n",
                FormatProblem::Field("complex".to_string()),
            ),
            (
                "%%MatrixMarket matrix coordinate real hermitian\n",
                FormatProblem::Symmetry("hermitian".to_string()),
            ),
        ];

        for (text, expected) in cases {
            assert_eq!(format_problem(text), (1, expected));
        }
    }

    #[test]
    fn test_read_header_checked_before_dimensions() {
        // the dimension line is malformed too, but the header fails first
        let (line, problem) = format_problem("%%MatrixMarket matrix array real general\nx y z\n");
        assert_eq!(line, 1);
        assert_eq!(problem, FormatProblem::Format("array".to_string()));
    }

    #[test]
    fn test_read_dimension_errors() {
        let header = "%%MatrixMarket matrix coordinate real general\n";

        let (line, problem) = format_problem(&format!("{header}% c\n3 3\n"));
        assert_eq!((line, problem), (3, FormatProblem::DimensionLine));

        let (line, problem) = format_problem(&format!("{header}3 -3 1\n"));
        assert_eq!((line, problem), (2, FormatProblem::DimensionLine));

        let (line, problem) = format_problem(&format!("{header}3 3 1 1\n"));
        assert_eq!((line, problem), (2, FormatProblem::DimensionLine));

        let (_, problem) = format_problem(&format!("{header}3 4 1\n"));
        assert_eq!(problem, FormatProblem::NonSquare { rows: 3, cols: 4 });

        let (_, problem) = format_problem(&format!("{header}% only comments\n"));
        assert_eq!(problem, FormatProblem::MissingDimensionLine);
    }

    #[test]
    fn test_read_data_line_errors() {
        let prefix = "%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n";

        for bad in ["1 x 1.0", "1 2", "1 2 3.0 4.0", "1 2 abc", "% late comment"] {
            let (line, problem) = format_problem(&format!("{prefix}{bad}\n"));
            assert_eq!((line, problem), (4, FormatProblem::DataLine), "{bad}");
        }
    }

    #[test]
    fn test_read_range_errors() {
        let err = read("%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Range);
        assert_eq!(err.line(), Some(3));
        assert!(matches!(
            err,
            MatrixMarketError::Entry {
                source: SparseFormatError::RowOutOfRange { row: 2, dimension: 2 },
                ..
            }
        ));

        let err = read("%%MatrixMarket matrix coordinate real general\n2 2 1\n1 0 1.0\n").unwrap_err();
        assert!(matches!(err, MatrixMarketError::ZeroIndex { line: 3 }));
        assert_eq!(err.kind(), ErrorKind::Range);
    }

    #[test]
    fn test_read_count_mismatch() {
        // too many entries
        let err = read(
            "%%MatrixMarket matrix coordinate real general\n2 2 1\n1 1 1.0\n2 2 1.0\n",
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(err.line(), Some(4));

        // too few entries
        let (line, problem) = format_problem(
            "%%MatrixMarket matrix coordinate real general\n3 3 3\n1 1 1.0\n2 2 1.0\n",
        );
        assert_eq!(line, 4);
        assert_eq!(
            problem,
            FormatProblem::EntryCountMismatch {
                declared: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.mtx");
        let err = read_matrix_market::<f64, _>(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("missing.mtx"));
    }

    #[test]
    fn test_error_messages() {
        let err = read("%%MatrixMarket matrix coordinate real general\n2 2 3\n1 1 1.0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "line 3: header declares 3 entries, found 1"
        );
    }
}
