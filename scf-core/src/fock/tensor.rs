use std::ops::Index;

use serde::{Deserialize, Serialize};

/// The rank-3 coupling tensor chi of the semi-empirical model.
///
/// `chi[(p, q, a)]` is the coefficient projecting the orbital pair (p, q)
/// onto atom `a`. The tensor is dense in storage but the physical model only
/// populates entries whose orbitals both live on atom `a`, which is what the
/// accelerated Fock build exploits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChiTensor {
    data: Vec<f64>,
    n_orbitals: usize,
    n_atoms: usize,
}

impl ChiTensor {
    pub fn from_fn(
        n_orbitals: usize,
        n_atoms: usize,
        mut func: impl FnMut(usize, usize, usize) -> f64,
    ) -> Self {
        let mut data = vec![0.0; n_orbitals * n_orbitals * n_atoms];
        for (p, q) in itertools::iproduct!(0..n_orbitals, 0..n_orbitals) {
            for a in 0..n_atoms {
                data[(p * n_orbitals + q) * n_atoms + a] = func(p, q, a);
            }
        }
        Self {
            data,
            n_orbitals,
            n_atoms,
        }
    }

    /// The canonical chi tensor of the noble-gas model: orbital 0 on each
    /// atom is s-type and the remaining `orbitals_per_atom - 1` are p-type.
    /// Entries are nonzero only when p, q and a share an atom; matching
    /// orbital types couple with weight 1, s–p pairs with the dipole length.
    ///
    /// [`super::DipoleFock`] with the same dipole reproduces the Fock matrix
    /// this tensor yields through [`super::TensorFock`].
    pub fn dipole_model(n_atoms: usize, orbitals_per_atom: usize, dipole: f64) -> Self {
        Self::from_fn(
            n_atoms * orbitals_per_atom,
            n_atoms,
            |p, q, a| {
                if p / orbitals_per_atom == a && q / orbitals_per_atom == a {
                    on_atom_coefficient(dipole, p % orbitals_per_atom, q % orbitals_per_atom)
                } else {
                    0.0
                }
            },
        )
    }

    pub fn n_orbitals(&self) -> usize {
        self.n_orbitals
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }
}

impl Index<(usize, usize, usize)> for ChiTensor {
    type Output = f64;

    fn index(&self, (p, q, a): (usize, usize, usize)) -> &Self::Output {
        &self.data[(p * self.n_orbitals + q) * self.n_atoms + a]
    }
}

/// On-atom coupling between two orbital types: monopole for matching types,
/// dipole for s–p pairs, zero between distinct p types.
pub(crate) fn on_atom_coefficient(dipole: f64, orb_1: usize, orb_2: usize) -> f64 {
    if orb_1 == orb_2 {
        1.0
    } else if orb_1 == 0 || orb_2 == 0 {
        dipole
    } else {
        0.0
    }
}
