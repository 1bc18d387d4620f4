use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bondrot::bonding::infer_bonds;
use bondrot::{Atom, Molecule};
use nalgebra::Vector3;

/// Cubic lattice with 1.5 Å spacing, `n` atoms per edge
fn lattice(n: usize) -> Molecule {
    let mut mol = Molecule::new("lattice");
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                mol.add_atom(Atom::new(
                    "C",
                    Vector3::new(i as f64 * 1.5, j as f64 * 1.5, k as f64 * 1.5),
                ));
            }
        }
    }
    mol
}

fn bench_infer_bonds(c: &mut Criterion) {
    let template = lattice(6);

    c.bench_function("infer_bonds_216", |b| {
        b.iter(|| {
            let mut mol = template.clone();
            black_box(infer_bonds(&mut mol, 1.6).unwrap());
        })
    });
}

criterion_group!(bonding_benches, bench_infer_bonds);
criterion_main!(bonding_benches);
