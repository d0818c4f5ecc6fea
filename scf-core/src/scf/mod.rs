mod solver;
pub(crate) mod utils;

pub use solver::ScfSolver;

/// Knobs of the fixed-point iteration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ScfConfig {
    /// the maximum number of iterations to try before giving up on
    /// convergence
    pub max_iterations: usize,
    /// weight of the freshly built density in the damped baseline the
    /// convergence check compares against
    pub mixing_fraction: f64,
    /// if the Frobenius norm of the density change drops below this, the
    /// system is considered converged
    pub tolerance: f64,
}

impl Default for ScfConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            mixing_fraction: 0.25,
            tolerance: 1e-4,
        }
    }
}
