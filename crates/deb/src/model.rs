use std::{fmt, str::FromStr};

use debsim_solvers::transient::dopri5::{self, Action, Config, Event, Sampling};
use ndarray::Array1;
use tracing::{debug, info, trace, warn};

use crate::{
    derivative::DerivativeFunction,
    error::{ConfigurationError, InvalidInput, SimulationError},
    food::FoodFunction,
    organism::{Organism, OrganismParams},
    solution::Solution,
    variant::{ModelKind, Variant},
};

/// Largest step, in time units, the integrator may take.
pub const MAX_STEP: f64 = 2.0;

/// How the integrator chooses the recorded times.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepSize {
    /// Adaptive stepping; every accepted step is recorded.
    Auto,

    /// Record the grid `start + i * h` for every grid time before the end.
    Fixed(f64),
}

impl FromStr for StepSize {
    type Err = InvalidInput;

    /// Parses `"auto"` or a number.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(Self::Auto);
        }
        s.parse()
            .map(Self::Fixed)
            .map_err(|_| InvalidInput::StepSize(s.to_owned()))
    }
}

/// The state a simulation starts from.
#[derive(Debug, Clone, PartialEq)]
pub enum InitialState {
    /// `(e_0, v_0, 0, 0)` from the organism.
    Birth,

    /// An explicit `(E, V, E_H, E_R)`.
    Custom(Vec<f64>),
}

impl From<[f64; 4]> for InitialState {
    fn from(state: [f64; 4]) -> Self {
        Self::Custom(state.to_vec())
    }
}

impl From<Vec<f64>> for InitialState {
    fn from(state: Vec<f64>) -> Self {
        Self::Custom(state)
    }
}

/// Sampled states of one simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    /// Sample times, strictly increasing.
    pub t: Array1<f64>,
    /// Reserve.
    pub e: Array1<f64>,
    /// Structural volume.
    pub v: Array1<f64>,
    /// Maturity.
    pub e_h: Array1<f64>,
    /// Reproduction buffer.
    pub e_r: Array1<f64>,
}

impl Trajectory {
    fn from_solution(solution: &dopri5::Solution<4>) -> Self {
        Self {
            t: Array1::from(solution.t.clone()),
            e: Array1::from(solution.component(0)),
            v: Array1::from(solution.component(1)),
            e_h: Array1::from(solution.component(2)),
            e_r: Array1::from(solution.component(3)),
        }
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Returns `true` if the trajectory has no samples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Returns the state `(E, V, E_H, E_R)` at the last sample.
    #[must_use]
    pub fn last(&self) -> Option<[f64; 4]> {
        let i = self.len().checked_sub(1)?;
        Some([self.e[i], self.v[i], self.e_h[i], self.e_r[i]])
    }
}

/// The food function and trajectory of the most recent successful run.
pub(crate) struct Run {
    pub(crate) food: Box<dyn FoodFunction>,
    pub(crate) trajectory: Trajectory,
}

/// A DEB model: an organism, a resolved variant and the most recent run.
///
/// ```
/// use debsim::{InitialState, Model, StepSize, food::Constant};
///
/// let organism = debsim::Presets::builtin().organism("shark").unwrap();
/// let mut model = Model::standard(organism).unwrap();
///
/// model
///     .simulate(Constant(1.0), (0.0, 100.0), StepSize::Fixed(10.0), InitialState::Birth)
///     .unwrap();
///
/// let solution = model.reconstruct().unwrap();
/// assert_eq!(solution.t.len(), 10);
/// ```
pub struct Model {
    organism: Organism,
    variant: Variant,
    run: Option<Run>,
}

impl Model {
    /// Creates a model of `kind` for `organism`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the organism is invalid or lacks
    /// what the variant requires; see [`Variant::resolve`].
    pub fn new(kind: ModelKind, organism: Organism) -> Result<Self, ConfigurationError> {
        let (variant, organism) = Variant::resolve(kind, organism)?;
        Ok(Self {
            organism,
            variant,
            run: None,
        })
    }

    /// Creates a standard model.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the organism is invalid.
    pub fn standard(organism: Organism) -> Result<Self, ConfigurationError> {
        Self::new(ModelKind::Standard, organism)
    }

    /// Creates an extended (gestation and lactation) model.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the organism is invalid or lacks
    /// valid `t_0` and `e_hx`.
    pub fn extended(organism: Organism) -> Result<Self, ConfigurationError> {
        Self::new(ModelKind::Extended, organism)
    }

    /// Creates a model from raw parameters.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the parameters are invalid.
    pub fn from_params(
        kind: ModelKind,
        params: OrganismParams,
    ) -> Result<Self, ConfigurationError> {
        Self::new(kind, Organism::new(params)?)
    }

    /// Returns the organism the model runs, with variant defaults resolved.
    #[must_use]
    pub fn organism(&self) -> &Organism {
        &self.organism
    }

    #[must_use]
    pub fn variant(&self) -> &Variant {
        &self.variant
    }

    #[must_use]
    pub fn kind(&self) -> ModelKind {
        self.variant.kind()
    }

    /// Returns the trajectory of the most recent successful run.
    #[must_use]
    pub fn trajectory(&self) -> Option<&Trajectory> {
        self.run.as_ref().map(|run| &run.trajectory)
    }

    /// Returns the food function of the most recent successful run.
    #[must_use]
    pub fn food(&self) -> Option<&dyn FoodFunction> {
        self.run.as_ref().map(|run| run.food.as_ref())
    }

    pub(crate) fn run(&self) -> Option<&Run> {
        self.run.as_ref()
    }

    /// Integrates the state equations over `t_span` and stores the result.
    ///
    /// The run replaces any previous one, but only if it succeeds. A run that
    /// fails part way stores nothing: a state the equations cannot handle,
    /// such as zero structure, ends in [`SolverError::StepSizeUnderflow`]
    /// rather than a partial trajectory with undefined powers.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Input`] for a custom initial state that
    /// does not have four values or a fixed step that is not positive, and
    /// [`SimulationError::Solver`] if a fixed step yields more samples than
    /// the solver's step limit or integration fails.
    ///
    /// [`SolverError::StepSizeUnderflow`]: crate::SolverError::StepSizeUnderflow
    pub fn simulate<F>(
        &mut self,
        food: F,
        t_span: (f64, f64),
        step_size: StepSize,
        initial_state: InitialState,
    ) -> Result<&Trajectory, SimulationError>
    where
        F: FoodFunction + 'static,
    {
        let (start, end) = t_span;
        let y0 = self.initial_state(initial_state)?;

        // Known-good values, unwrap is safe
        let config = Config::default().with_max_step(MAX_STEP).unwrap();

        let sampling = match step_size {
            StepSize::Auto => Sampling::Steps,
            StepSize::Fixed(h) if h.is_finite() && h > 0.0 => {
                Sampling::uniform(start, end, h, config.max_steps())?
            }
            StepSize::Fixed(h) => return Err(InvalidInput::NonPositiveStep(h).into()),
        };

        debug!(kind = ?self.kind(), start, end, ?step_size, ?y0, "starting simulation");

        let system = DerivativeFunction::new(&self.organism, &self.variant, &food);
        let observer = |event: &Event<4>| -> Option<Action> {
            trace!(t = event.t, e_h = event.y[2], "sample");
            None
        };
        let solution = dopri5::solve(&system, [start, end], y0, &sampling, &config, observer)
            .inspect_err(|error| warn!(%error, "simulation failed"))?;

        info!(
            samples = solution.len(),
            evaluations = solution.stats.evaluations,
            rejected = solution.stats.rejected,
            "simulation complete"
        );

        let trajectory = Trajectory::from_solution(&solution);
        let run = self.run.insert(Run {
            food: Box::new(food),
            trajectory,
        });
        Ok(&run.trajectory)
    }

    /// Recomputes powers, mineral fluxes and transitions for the stored run.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NotSimulated`] if no run has succeeded yet.
    pub fn reconstruct(&self) -> Result<Solution, InvalidInput> {
        Solution::new(self)
    }

    fn initial_state(&self, initial_state: InitialState) -> Result<[f64; 4], InvalidInput> {
        match initial_state {
            InitialState::Birth => Ok([self.organism.e_0, self.organism.v_0, 0.0, 0.0]),
            InitialState::Custom(values) => {
                let len = values.len();
                values
                    .try_into()
                    .map_err(|_| InvalidInput::InitialStateLength(len))
            }
        }
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("organism", &self.organism)
            .field("variant", &self.variant)
            .field("trajectory", &self.trajectory())
            .finish_non_exhaustive()
    }
}
