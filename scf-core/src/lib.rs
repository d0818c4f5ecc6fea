pub mod fock;
pub mod scf;
pub mod system;

pub mod testing {
    use std::{error::Error, fs::File, path::Path};

    use nalgebra::DMatrix;
    use serde::{Deserialize, Serialize};

    use crate::{
        fock::{ChiTensor, DEFAULT_DIPOLE},
        system::ScfSystem,
    };

    /// A named physical system snapshot, used to share inputs between tests
    /// and benches.
    #[derive(Serialize, Deserialize)]
    pub struct TestSystem {
        pub name: String,
        system: ScfSystem,
    }

    impl TestSystem {
        pub fn new(name: String, system: ScfSystem) -> Self {
            Self { name, system }
        }

        pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn Error>> {
            Ok(serde_json::to_writer(
                File::options()
                    .create(true)
                    .write(true)
                    .truncate(true)
                    .open(path)?,
                self,
            )?)
        }

        pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
            Ok(serde_json::from_reader(File::open(path)?)?)
        }

        pub fn system(&self) -> &ScfSystem {
            &self.system
        }
    }

    /// Builds a 1-D chain of noble-gas-like atoms with unit spacing: one
    /// s-type and `orbitals_per_atom - 1` p-type orbitals per site, a
    /// distance-decaying interaction, and the canonical dipole-model chi
    /// tensor. Small enough inputs for the reference Fock path.
    pub fn noble_gas_chain(
        n_atoms: usize,
        orbitals_per_atom: usize,
        ionic_charge: usize,
    ) -> ScfSystem {
        let n = n_atoms * orbitals_per_atom;

        let hamiltonian = DMatrix::from_fn(n, n, |p, q| {
            let (atom_p, orb_p) = (p / orbitals_per_atom, p % orbitals_per_atom);
            let (atom_q, orb_q) = (q / orbitals_per_atom, q % orbitals_per_atom);
            if p == q {
                // on-site s/p orbital energies
                if orb_p == 0 {
                    -1.0
                } else {
                    -0.3
                }
            } else if atom_p != atom_q && orb_p == orb_q {
                -0.01 / atom_p.abs_diff(atom_q) as f64
            } else {
                0.0
            }
        });

        let interaction = DMatrix::from_fn(n_atoms, n_atoms, |a, b| {
            if a == b {
                1.0
            } else {
                1.0 / a.abs_diff(b) as f64
            }
        });

        let mut energy_ion = 0.0;
        for atom_a in 0..n_atoms {
            for atom_b in atom_a + 1..n_atoms {
                energy_ion += (ionic_charge * ionic_charge) as f64
                    / atom_b.abs_diff(atom_a) as f64
            }
        }

        let num_occ = (ionic_charge / 2) * n / orbitals_per_atom;
        let initial_density =
            DMatrix::from_diagonal_element(n, n, num_occ as f64 / n as f64);

        ScfSystem {
            hamiltonian,
            interaction,
            initial_density,
            chi: Some(ChiTensor::dipole_model(
                n_atoms,
                orbitals_per_atom,
                DEFAULT_DIPOLE,
            )),
            energy_ion,
            ionic_charge,
            orbitals_per_atom,
        }
    }

}
