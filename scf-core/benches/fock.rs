use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};
use scf_core::{
    fock::{DipoleFock, FockBuilder, TensorFock},
    system::ScfSystem,
    testing::noble_gas_chain,
};

fn perturbed_density(system: &ScfSystem, rng: &mut StdRng) -> DMatrix<f64> {
    let n = system.n_orbitals();
    let noise = DMatrix::from_fn(n, n, |_, _| rng.gen_range(-0.05..0.05));
    &system.initial_density + 0.5 * (&noise + noise.transpose())
}

fn bench_fock(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(271828);

    for n_atoms in [2, 4, 8] {
        let system = noble_gas_chain(n_atoms, 4, 6);
        let density = perturbed_density(&system, &mut rng);
        let builder = DipoleFock::new(4);

        c.bench_function(&format!("dipole fock {n_atoms} atoms"), |b| {
            b.iter(|| builder.fock(&system.hamiltonian, &system.interaction, &density))
        });
    }

    // the reference contraction is O(n⁴·m²) - keep it to the small chains
    for n_atoms in [2, 4] {
        let system = noble_gas_chain(n_atoms, 4, 6);
        let density = perturbed_density(&system, &mut rng);
        let builder = TensorFock::new(system.chi.clone().unwrap());

        c.bench_function(&format!("tensor fock {n_atoms} atoms"), |b| {
            b.iter(|| builder.fock(&system.hamiltonian, &system.interaction, &density))
        });
    }
}

criterion_group!(benches, bench_fock);
criterion_main!(benches);
