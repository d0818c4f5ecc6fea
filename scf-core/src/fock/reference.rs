use nalgebra::DMatrix;

use super::{ChiTensor, FockBuilder};

/// Reference Fock build: the explicit tensor contraction
///
///   F = H + 2 · Coulomb(chi, M, D) − Exchange(chi, M, D)
///
/// with Coulomb[p,q] = Σ_{t,u,r,s} chi[p,q,t]·M[t,u]·chi[r,s,u]·D[r,s] and
/// Exchange[p,q] = Σ_{t,u,r,s} chi[r,q,t]·M[t,u]·chi[p,s,u]·D[r,s].
///
/// The cost grows as O(n⁴·m²); this path exists to validate the accelerated
/// [`super::DipoleFock`] build on small systems, not for production
/// iteration. The `rayon` feature spreads the entries over threads.
pub struct TensorFock {
    chi: ChiTensor,
}

impl TensorFock {
    pub fn new(chi: ChiTensor) -> Self {
        Self { chi }
    }
}

impl FockBuilder for TensorFock {
    fn fock(
        &self,
        hamiltonian: &DMatrix<f64>,
        interaction: &DMatrix<f64>,
        density: &DMatrix<f64>,
    ) -> DMatrix<f64> {
        let n = hamiltonian.nrows();
        let n_atoms = interaction.nrows();
        let chi = &self.chi;

        // Hartree intermediate: the density projected onto each atom, then
        // propagated through the interaction
        let atom_density = (0..n_atoms)
            .map(|u| {
                itertools::iproduct!(0..n, 0..n)
                    .map(|(r, s)| chi[(r, s, u)] * density[(r, s)])
                    .sum::<f64>()
            })
            .collect::<Vec<_>>();
        let hartree = (0..n_atoms)
            .map(|t| {
                (0..n_atoms)
                    .map(|u| interaction[(t, u)] * atom_density[u])
                    .sum::<f64>()
            })
            .collect::<Vec<_>>();

        let entry = |p: usize, q: usize| {
            let mut value = hamiltonian[(p, q)];
            for t in 0..n_atoms {
                value += 2.0 * chi[(p, q, t)] * hartree[t];
            }
            for (r, s) in itertools::iproduct!(0..n, 0..n) {
                let mut pair = 0.0;
                for (t, u) in itertools::iproduct!(0..n_atoms, 0..n_atoms) {
                    pair += chi[(r, q, t)] * interaction[(t, u)] * chi[(p, s, u)];
                }
                value -= pair * density[(r, s)];
            }
            value
        };

        #[cfg(feature = "rayon")]
        {
            use rayon::iter::{IntoParallelIterator, ParallelIterator};

            // column-major entries, matching DMatrix storage
            let data = (0..n * n)
                .into_par_iter()
                .map(|linear| entry(linear % n, linear / n))
                .collect::<Vec<_>>();
            DMatrix::from_vec(n, n, data)
        }

        #[cfg(not(feature = "rayon"))]
        DMatrix::from_fn(n, n, entry)
    }
}
