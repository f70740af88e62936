use criterion::{Criterion, criterion_group, criterion_main};
use satlp::sat::cdcl::Cdcl;
use satlp::sat::cnf::Cnf;
use satlp::sat::configs::{CountFixed, CountLuby, CountNever, OrderFixed, RandomFixed, VsidsFixed};
use satlp::sat::literal::Literal;
use satlp::sat::solver::{Options, Solver, SolverConfig};
use std::hint::black_box;
use std::time::Duration;

/// Uniform random 3-SAT at the clause/variable ratio of the phase transition.
fn random_3sat(rng: &mut fastrand::Rng, num_vars: usize) -> Cnf {
    let num_clauses = num_vars * 426 / 100;
    let clauses = (0..num_clauses).map(|_| {
        let mut vars: Vec<u32> = Vec::with_capacity(3);
        while vars.len() < 3 {
            let var = rng.u32(1..=num_vars as u32);
            if !vars.contains(&var) {
                vars.push(var);
            }
        }
        vars.into_iter()
            .map(|v| Literal::new(v, rng.bool()).to_i32())
            .collect::<Vec<_>>()
    });
    Cnf::new(num_vars, clauses.collect::<Vec<_>>()).unwrap()
}

/// `holes + 1` pigeons into `holes` holes.
fn pigeonhole(holes: i32) -> Cnf {
    let pigeons = holes + 1;
    let p = |i: i32, h: i32| i * holes + h + 1;

    let mut clauses: Vec<Vec<i32>> = (0..pigeons)
        .map(|i| (0..holes).map(|h| p(i, h)).collect())
        .collect();
    for h in 0..holes {
        for i in 0..pigeons {
            for j in i + 1..pigeons {
                clauses.push(vec![-p(i, h), -p(j, h)]);
            }
        }
    }

    Cnf::new((pigeons * holes) as usize, clauses).unwrap()
}

fn solve_all<Config: SolverConfig>(cnfs: &[Cnf]) {
    for cnf in cnfs {
        let mut state: Cdcl<Config> = Solver::new(cnf.clone(), Options::default());
        black_box(state.solve());
    }
}

fn bench_3sat(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0x5eed);
    let cnfs = (0..20).map(|_| random_3sat(&mut rng, 20)).collect::<Vec<_>>();

    let mut group = c.benchmark_group("3sat - heuristic");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("LiteralCount", |b| b.iter(|| solve_all::<CountFixed>(&cnfs)));
    group.bench_function("FixedOrder", |b| b.iter(|| solve_all::<OrderFixed>(&cnfs)));
    group.bench_function("RandomOrder", |b| b.iter(|| solve_all::<RandomFixed>(&cnfs)));
    group.bench_function("Vsids", |b| b.iter(|| solve_all::<VsidsFixed>(&cnfs)));
    group.finish();

    let mut group = c.benchmark_group("3sat - restarter");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(20));

    group.bench_function("Fixed", |b| b.iter(|| solve_all::<CountFixed>(&cnfs)));
    group.bench_function("Luby", |b| b.iter(|| solve_all::<CountLuby>(&cnfs)));
    group.bench_function("Never", |b| b.iter(|| solve_all::<CountNever>(&cnfs)));
    group.finish();
}

fn bench_pigeonhole(c: &mut Criterion) {
    let cnfs = [pigeonhole(4)];

    let mut group = c.benchmark_group("pigeonhole");
    group.sample_size(10);

    group.bench_function("5 into 4", |b| b.iter(|| solve_all::<CountFixed>(&cnfs)));
    group.finish();
}

fn bench_probe(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(0xbeef);
    let cnf = random_3sat(&mut rng, 30);

    c.bench_function("probe every literal", |b| {
        b.iter(|| {
            let mut state: Cdcl = Solver::new(cnf.clone(), Options::default());
            for var in 1..=30 {
                for polarity in [true, false] {
                    black_box(state.probe(&[], Literal::new(var, polarity)).unwrap());
                }
            }
        });
    });
}

criterion_group!(benches, bench_3sat, bench_pigeonhole, bench_probe);
criterion_main!(benches);
