#![allow(dead_code)]
//! Random formulas and a truth-table oracle shared by the integration tests.

use satlp::sat::cnf::Cnf;
use satlp::sat::literal::Literal;

pub fn lit(value: i32) -> Literal {
    Literal::from_i32(value).unwrap()
}

pub fn lits(values: &[i32]) -> Vec<Literal> {
    values.iter().map(|&v| lit(v)).collect()
}

pub fn cnf(num_vars: usize, clauses: &[&[i32]]) -> Cnf {
    Cnf::new(num_vars, clauses.iter().map(|c| c.iter().copied())).unwrap()
}

/// `num_clauses` clauses of `width` distinct variables each.
pub fn random_cnf(rng: &mut fastrand::Rng, num_vars: usize, num_clauses: usize, width: usize) -> Cnf {
    let width = width.min(num_vars);
    let clauses = (0..num_clauses)
        .map(|_| {
            let mut vars: Vec<i32> = Vec::with_capacity(width);
            while vars.len() < width {
                let var = rng.i32(1..=num_vars as i32);
                if !vars.contains(&var) {
                    vars.push(var);
                }
            }
            vars.into_iter()
                .map(|v| if rng.bool() { v } else { -v })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Cnf::new(num_vars, clauses).unwrap()
}

/// `count` literals over distinct variables.
pub fn random_literals(rng: &mut fastrand::Rng, num_vars: usize, count: usize) -> Vec<Literal> {
    let mut vars: Vec<u32> = Vec::new();
    while vars.len() < count.min(num_vars) {
        let var = rng.u32(1..=num_vars as u32);
        if !vars.contains(&var) {
            vars.push(var);
        }
    }
    vars.into_iter().map(|v| Literal::new(v, rng.bool())).collect()
}

fn holds(values: &[bool], literal: Literal) -> bool {
    values[literal.variable() as usize - 1] == literal.polarity()
}

/// A model of `cnf` in which every literal of `fixed` holds, by exhaustive
/// enumeration.
pub fn brute_force(cnf: &Cnf, fixed: &[Literal]) -> Option<Vec<bool>> {
    let n = cnf.num_vars();
    assert!(n <= 20, "brute force over {n} variables");

    (0_u32..1 << n).find_map(|bits| {
        let values = (0..n).map(|i| (bits >> i) & 1 == 1).collect::<Vec<_>>();
        let ok = fixed.iter().all(|&l| holds(&values, l))
            && cnf.iter().all(|c| c.iter().any(|&l| holds(&values, l)));
        ok.then_some(values)
    })
}

/// Whether every model of `cnf` satisfies `clause`.
pub fn entails(cnf: &Cnf, clause: &[Literal]) -> bool {
    let negated = clause.iter().map(|&l| -l).collect::<Vec<_>>();
    brute_force(cnf, &negated).is_none()
}
