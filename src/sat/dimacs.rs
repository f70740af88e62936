#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
//! A parser for the DIMACS CNF file format.
//!
//! The format accepted here:
//! - Comment lines starting with `c`.
//! - One problem line `p cnf <num_variables> <num_clauses>` before any clause.
//!   The variable count bounds every literal; the clause count is only a hint.
//! - Clauses as whitespace separated integers, each terminated by `0`. A clause
//!   may span several lines and a line may hold several clauses.
//! - An optional `%` line marking the end of the data (as in the SATLIB
//!   benchmark files). Anything after it is ignored.

use crate::sat::cnf::{Cnf, CnfError};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// Reasons a DIMACS document is rejected.
#[derive(Debug, Error)]
pub enum DimacsError {
    /// Reading the input failed.
    #[error("failed to read input: {0}")]
    Io(#[from] io::Error),

    /// A clause appeared before the problem line.
    #[error("line {line}: clause data before the `p cnf` header")]
    MissingHeader {
        /// 1-based line number.
        line: usize,
    },

    /// The problem line is not `p cnf <vars> <clauses>`.
    #[error("line {line}: malformed problem line `{text}`")]
    MalformedHeader {
        /// 1-based line number.
        line: usize,
        /// The line as read.
        text: String,
    },

    /// A token in clause data is not an integer.
    #[error("line {line}: `{token}` is not a literal")]
    InvalidLiteral {
        /// 1-based line number.
        line: usize,
        /// The offending token.
        token: String,
    },

    /// The input ended in the middle of a clause.
    #[error("the last clause is not terminated by 0")]
    UnterminatedClause,

    /// The clauses parsed but do not form a valid formula.
    #[error(transparent)]
    Cnf(#[from] CnfError),
}

/// Parses DIMACS formatted data from `reader`.
///
/// # Errors
///
/// I/O failures, syntax errors, and clause lists that [`Cnf::new`] rejects
/// (a literal beyond the declared variable count, an empty clause, no clauses).
pub fn parse_dimacs<R: BufRead>(reader: R) -> Result<Cnf, DimacsError> {
    let mut num_vars = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut current: Vec<i32> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();

        if trimmed.starts_with('%') {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with('c') {
            continue;
        }
        if trimmed.starts_with('p') {
            num_vars = Some(parse_header(trimmed).ok_or_else(|| {
                DimacsError::MalformedHeader {
                    line: line_no,
                    text: trimmed.to_string(),
                }
            })?);
            continue;
        }
        if num_vars.is_none() {
            return Err(DimacsError::MissingHeader { line: line_no });
        }

        for token in trimmed.split_whitespace() {
            let value: i32 = token.parse().map_err(|_| DimacsError::InvalidLiteral {
                line: line_no,
                token: token.to_string(),
            })?;

            if value == 0 {
                clauses.push(std::mem::take(&mut current));
            } else {
                current.push(value);
            }
        }
    }

    if !current.is_empty() {
        return Err(DimacsError::UnterminatedClause);
    }

    let cnf = Cnf::new(num_vars.unwrap_or(0), clauses)?;
    log::debug!(
        "parsed {} clauses over {} variables",
        cnf.len(),
        cnf.num_vars()
    );
    Ok(cnf)
}

/// `p cnf <vars> <clauses>`, returning the variable count.
fn parse_header(line: &str) -> Option<usize> {
    let mut parts = line.split_whitespace();
    if parts.next() != Some("p") || parts.next() != Some("cnf") {
        return None;
    }
    let num_vars = parts.next()?.parse().ok()?;
    let _num_clauses: usize = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(num_vars)
}

/// Opens `path` and parses it with [`parse_dimacs`].
///
/// # Errors
///
/// See [`parse_dimacs`]; failing to open the file is [`DimacsError::Io`].
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Cnf, DimacsError> {
    let file = File::open(path)?;
    parse_dimacs(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sat::literal::Literal;
    use itertools::Itertools;
    use std::io::Cursor;

    fn parse(text: &str) -> Result<Cnf, DimacsError> {
        parse_dimacs(Cursor::new(text))
    }

    fn dimacs(cnf: &Cnf) -> Vec<Vec<i32>> {
        cnf.iter()
            .map(|c| c.iter().copied().map(Literal::to_i32).collect_vec())
            .collect_vec()
    }

    #[test]
    fn test_parse_simple_dimacs() {
        let cnf = parse(
            "c This is a comment\n\
             p cnf 3 2\n\
             1 -2 0\n\
             2 3 0\n",
        )
        .unwrap();

        assert_eq!(cnf.num_vars(), 3);
        assert_eq!(dimacs(&cnf), vec![vec![1, -2], vec![2, 3]]);
    }

    #[test]
    fn test_clauses_span_lines_and_end_marker() {
        let cnf = parse(
            "p cnf 4 3\n\
             \n\
             1 2\n\
             -3 0 4 0 -1\n\
             0\n\
             %\n\
             0\n\
             c ignored",
        )
        .unwrap();

        assert_eq!(dimacs(&cnf), vec![vec![1, 2, -3], vec![4], vec![-1]]);
    }

    #[test]
    fn test_header_bounds_variables() {
        let cnf = parse("p cnf 5 1\n1 0\n").unwrap();
        assert_eq!(cnf.num_vars(), 5);

        assert!(matches!(
            parse("p cnf 2 1\n1 3 0\n"),
            Err(DimacsError::Cnf(CnfError::VariableOutOfRange {
                literal: 3,
                num_vars: 2
            }))
        ));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            parse("1 2 0\n"),
            Err(DimacsError::MissingHeader { line: 1 })
        ));
        assert!(matches!(
            parse("p cnf x 2\n"),
            Err(DimacsError::MalformedHeader { line: 1, .. })
        ));
        assert!(matches!(
            parse("p cnf 2 1\n1 abc 0\n"),
            Err(DimacsError::InvalidLiteral { line: 2, .. })
        ));
        assert!(matches!(
            parse("p cnf 2 1\n1 2\n"),
            Err(DimacsError::UnterminatedClause)
        ));
        assert!(matches!(
            parse("p cnf 1 1\n0\n"),
            Err(DimacsError::Cnf(CnfError::EmptyClause { index: 0 }))
        ));
        assert!(matches!(
            parse("p cnf 0 0\n"),
            Err(DimacsError::Cnf(CnfError::NoClauses))
        ));
    }

    #[test]
    fn test_parse_file_missing() {
        assert!(matches!(
            parse_file("/definitely/not/here.cnf"),
            Err(DimacsError::Io(_))
        ));
    }
}
