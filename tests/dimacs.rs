use satlp::sat::cdcl::Cdcl;
use satlp::sat::dimacs::{DimacsError, parse_dimacs};
use satlp::sat::cnf::CnfError;
use satlp::sat::solver::{DefaultConfig, Options, SolveResult, Solver};
use std::io::Cursor;

const UF8: &str = "c a small satisfiable instance
c with a clause spread over two lines
p cnf 8 10
 1 -5 4 0
-1 5 3 4 0
-3 -4 0
 2
 6 -7 0
-2 -6 0
 7 8 -1 0
-8 3 0
 5 -2 0
-5 -6 0
 1 2 6 0
%
0
";

#[test]
fn parsed_instance_solves_and_verifies() {
    let cnf = parse_dimacs(Cursor::new(UF8)).unwrap();
    assert_eq!(cnf.num_vars(), 8);
    assert_eq!(cnf.len(), 10);

    let result = Cdcl::<DefaultConfig>::new(cnf.clone(), Options::default()).solve();
    let model = result.model().expect("satisfiable");
    assert!(cnf.verify(model));
    assert_eq!(model.to_linear().len(), 8);
}

#[test]
fn unsatisfiable_instance() {
    let text = "p cnf 2 4\n1 2 0\n1 -2 0\n-1 2 0\n-1 -2 0\n";
    let cnf = parse_dimacs(Cursor::new(text)).unwrap();
    assert_eq!(
        Cdcl::<DefaultConfig>::new(cnf, Options::default()).solve(),
        SolveResult::Unsat
    );
}

#[test]
fn header_bounds_the_variables() {
    let text = "p cnf 2 1\n1 3 0\n";
    assert!(matches!(
        parse_dimacs(Cursor::new(text)),
        Err(DimacsError::Cnf(CnfError::VariableOutOfRange {
            literal: 3,
            num_vars: 2
        }))
    ));
}
