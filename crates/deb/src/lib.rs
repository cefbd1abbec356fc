//! Dynamic Energy Budget (DEB) life-history simulation.
//!
//! An organism's energetics are described by four state variables: reserve
//! `E`, structural volume `V`, maturity `E_H` and the reproduction buffer
//! `E_R`. This crate integrates them over time for a food signal and then
//! derives the seven power flows, the mineral fluxes and the times of birth,
//! weaning and puberty.
//!
//! - [`Organism`] is the validated parameter set, built from
//!   [`OrganismParams`] or a [`Presets`] table.
//! - [`Model`] pairs an organism with a [`ModelKind`] and runs
//!   [`Model::simulate`].
//! - [`Solution`] holds the reconstructed series of the most recent run.
//! - [`powers::Calculator`] and [`DerivativeFunction`] expose the underlying
//!   equations for direct use.
//!
//! ```
//! use debsim::{InitialState, Model, ModelKind, Presets, StepSize};
//!
//! let mouse = Presets::builtin().organism("mouse").unwrap();
//! let mut model = Model::new(ModelKind::Extended, mouse).unwrap();
//! model
//!     .simulate(|_t: f64| 1.0, (0.0, 200.0), StepSize::Auto, InitialState::Birth)
//!     .unwrap();
//!
//! let solution = model.reconstruct().unwrap();
//! let birth = solution.transitions.birth.unwrap();
//! let weaning = solution.transitions.weaning.unwrap();
//! let puberty = solution.transitions.puberty.unwrap();
//! assert!(birth < weaning && weaning < puberty);
//! ```

mod derivative;
mod error;
mod model;
mod organism;
mod presets;
mod solution;
mod stage;
mod variant;

pub mod food;
pub mod powers;

pub use derivative::DerivativeFunction;
pub use error::{ConfigurationError, InvalidInput, Requirement, SimulationError};
pub use model::{InitialState, MAX_STEP, Model, StepSize, Trajectory};
pub use organism::{Organism, OrganismParams};
pub use presets::Presets;
pub use solution::{Mineral, Solution, Transitions};
pub use stage::LifeStage;
pub use variant::{Gestation, ModelKind, Variant};

pub use debsim_solvers::transient::dopri5::Error as SolverError;
