mod common;

use common::{entails, random_cnf, random_literals};
use satlp::sat::cdcl::Cdcl;
use satlp::sat::cnf::Cnf;
use satlp::sat::configs::{OrderNever, VsidsLuby};
use satlp::sat::formula::{Formula, Propagation};
use satlp::sat::literal::Literal;
use satlp::sat::solver::{DefaultConfig, Options, Solver};
use satlp::sat::trail::ImplicationGraph;

#[test]
fn learned_clauses_are_entailed() {
    let mut rng = fastrand::Rng::with_seed(21);
    for _ in 0..120 {
        let num_vars = rng.usize(4..=11);
        let num_clauses = num_vars * rng.usize(3..=6);
        let formula = random_cnf(&mut rng, num_vars, num_clauses, 3);

        for options in [
            Options::default(),
            Options {
                max_resolution_steps: Some(1),
                ..Options::default()
            },
        ] {
            let mut solver = Cdcl::<VsidsLuby>::new(formula.clone(), options);
            solver.solve();
            for clause in solver.learned_clauses() {
                assert!(!clause.is_empty());
                assert!(entails(&formula, clause), "{clause:?} is not entailed by {formula}");
            }
        }
    }
}

#[test]
fn backtracking_forgets_deeper_levels() {
    let mut rng = fastrand::Rng::with_seed(22);
    for _ in 0..200 {
        let num_vars = rng.usize(4..=12);
        let cnf = random_cnf(&mut rng, num_vars, num_vars * 3, 3);
        let mut formula = Formula::new(cnf.iter().map(|c| c.iter().copied()));
        let mut graph = ImplicationGraph::new(num_vars);

        if !matches!(formula.unit_propagate(0, &mut graph), Propagation::Undecided) {
            continue;
        }

        let mut level = 0;
        for var in 1..=num_vars as u32 {
            let decision = Literal::new(var, rng.bool());
            if graph.is_assigned(decision) {
                continue;
            }
            level += 1;
            graph.add_node(decision, None, level);
            let mut propagation = formula.bcp(decision, level, &graph);
            if propagation == Propagation::Undecided {
                propagation = formula.unit_propagate(level, &mut graph);
            }
            if propagation != Propagation::Undecided {
                break;
            }
        }
        if level == 0 {
            continue;
        }

        let target = rng.u32(0..level);
        graph.backtrack(target);
        formula.backtrack(target, &graph);

        assert!(graph.iter().all(|node| node.level <= target));
        assert!(graph.max_level().is_none_or(|l| l <= target));
        assert!(formula.is_below(target));
        for clause in formula.iter() {
            assert!(clause.levels().iter().flatten().all(|&l| l <= target));
        }

        // Propagation resumes from the cut without tripping any assertion.
        let _ = formula.unit_propagate(target, &mut graph);
    }
}

/// The input clauses followed by the learned ones, as a fresh formula.
fn database(solver: &Cdcl<DefaultConfig>) -> Cnf {
    let clauses = solver
        .cnf()
        .iter()
        .chain(solver.learned_clauses().iter().map(Vec::as_slice))
        .map(|c| c.iter().map(|l| l.to_i32()).collect::<Vec<_>>())
        .collect::<Vec<_>>();
    Cnf::new(solver.cnf().num_vars(), clauses).unwrap()
}

#[test]
fn restart_matches_a_fresh_solver() {
    let mut rng = fastrand::Rng::with_seed(23);
    for _ in 0..120 {
        let num_vars = rng.usize(4..=10);
        let num_clauses = num_vars * rng.usize(2..=5);
        let formula = random_cnf(&mut rng, num_vars, num_clauses, 3);
        let hypotheses = random_literals(&mut rng, num_vars, 2);

        let mut solver = Cdcl::<DefaultConfig>::new(formula, Options::default());
        let refuted = solver.solve().is_unsat();
        solver.restart();

        let mut fresh = Cdcl::<DefaultConfig>::new(database(&solver), Options::default());
        assert_eq!(solver.formula(), fresh.formula());
        assert_eq!(solver.graph(), fresh.graph());
        if refuted {
            continue;
        }

        let ours = solver.assign_hypotheses(&hypotheses).unwrap();
        let theirs = fresh.assign_hypotheses(&hypotheses).unwrap();
        assert_eq!(ours, theirs);
        assert_eq!(solver.trail(), fresh.trail());

        if ours.is_consistent() {
            solver.restart();
            assert_eq!(solver.assign_hypotheses(&hypotheses).unwrap(), ours);
        }
    }
}

#[test]
fn restart_twice_is_restart_once() {
    let mut rng = fastrand::Rng::with_seed(24);
    for _ in 0..60 {
        let num_vars = rng.usize(4..=10);
        let formula = random_cnf(&mut rng, num_vars, num_vars * 4, 3);
        let mut solver = Cdcl::<OrderNever>::new(formula, Options::default());
        solver.solve();

        solver.restart();
        let (formula, graph) = (solver.formula().clone(), solver.graph().clone());
        solver.restart();
        assert_eq!(solver.formula(), &formula);
        assert_eq!(solver.graph(), &graph);
        assert_eq!(solver.decision_level(), 0);
    }
}
