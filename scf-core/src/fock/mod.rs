mod dipole;
mod reference;
mod tensor;

pub use dipole::DipoleFock;
pub use reference::TensorFock;
pub use tensor::ChiTensor;

use nalgebra::DMatrix;

/// Atomic dipole length of the noble-gas model, in atomic units. This is the
/// physical constant parameterizing the s–p couplings of the accelerated
/// Fock build; synthetic systems may override it through
/// [`DipoleFock::with_dipole`] and [`ChiTensor::dipole_model`].
pub const DEFAULT_DIPOLE: f64 = 2.781629275106456;

/// An exchangable strategy for building the effective one-electron operator
/// (Fock matrix) from the current density.
///
/// Implementations must agree with each other within floating-point
/// tolerance on the systems they both describe: [`TensorFock`] is the
/// reference contraction over an explicit chi tensor, [`DipoleFock`] the
/// closed-form build exploiting its sparsity.
pub trait FockBuilder {
    fn fock(
        &self,
        hamiltonian: &DMatrix<f64>,
        interaction: &DMatrix<f64>,
        density: &DMatrix<f64>,
    ) -> DMatrix<f64>;
}
