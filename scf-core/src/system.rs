use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::fock::ChiTensor;

/// The immutable physical parameters of a single SCF solve.
///
/// No validation is performed beyond what the underlying linear algebra
/// enforces: mismatched dimensions between the matrices surface as `nalgebra`
/// shape panics, not as solver errors.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScfSystem {
    /// The base one-electron operator H (n×n, symmetric)
    pub hamiltonian: DMatrix<f64>,
    /// Pairwise electron-repulsion coefficients M between atoms
    /// (n_atoms×n_atoms, symmetric)
    pub interaction: DMatrix<f64>,
    /// The density matrix D₀ seeding the first operator build (n×n)
    pub initial_density: DMatrix<f64>,
    /// Rank-3 coupling tensor chi (n×n×n_atoms). Only the reference
    /// tensor-contraction Fock path reads it; the accelerated path encodes
    /// the same couplings through the dipole length
    pub chi: Option<ChiTensor>,
    /// Nuclear-nuclear repulsion energy E_ion
    pub energy_ion: f64,
    /// Electrons contributed by each ion. Expected even; odd values floor
    /// in [`Self::num_occupied`]
    pub ionic_charge: usize,
    /// Orbital count K per atom, so that n = K · n_atoms
    pub orbitals_per_atom: usize,
}

impl ScfSystem {
    pub fn n_orbitals(&self) -> usize {
        self.hamiltonian.nrows()
    }

    pub fn n_atoms(&self) -> usize {
        self.interaction.nrows()
    }

    /// Number of doubly-occupied orbitals, `(Q / 2) * n / K` with floor
    /// division applied at each step in exactly that order. Reordering the
    /// two divisions changes the result for non-divisible inputs, so the
    /// order is part of the contract.
    ///
    /// Meaningful physical results require `0 < num_occupied() <= n`. Values
    /// outside that range are not rejected here; they produce an all-zero or
    /// full-rank density matrix downstream.
    pub fn num_occupied(&self) -> usize {
        (self.ionic_charge / 2) * self.n_orbitals() / self.orbitals_per_atom
    }
}
