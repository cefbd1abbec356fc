//! Food availability over time.
//!
//! A food function maps time to the scaled functional response `f`, usually
//! in `[0, 1]`. Any `Fn(f64) -> f64` closure is a food function; [`Constant`]
//! and [`FoodSchedule`] cover the common fixed and piecewise cases.

use std::ops::Range;

use ndarray::{Array1, ArrayView1};
use thiserror::Error;

/// Scaled functional response as a function of time.
///
/// Must be defined over the whole simulated span. Integrators evaluate it at
/// arbitrary trial times, so implementations should be pure.
pub trait FoodFunction {
    /// Returns the scaled functional response at time `t`.
    fn food(&self, t: f64) -> f64;

    /// Evaluates the response at every time in `t`.
    fn food_series(&self, t: ArrayView1<'_, f64>) -> Array1<f64> {
        t.mapv(|t| self.food(t))
    }
}

impl<F> FoodFunction for F
where
    F: Fn(f64) -> f64,
{
    fn food(&self, t: f64) -> f64 {
        self(t)
    }
}

/// A food level that never changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant(pub f64);

impl FoodFunction for Constant {
    fn food(&self, _t: f64) -> f64 {
        self.0
    }

    fn food_series(&self, t: ArrayView1<'_, f64>) -> Array1<f64> {
        Array1::from_elem(t.len(), self.0)
    }
}

/// A food level held constant over a half-open time range `[start, end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct FoodStep {
    range: Range<f64>,
    level: f64,
}

impl FoodStep {
    /// Creates a step with the given food `level` over `range`.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::EmptyRange`] if the range is empty or not
    /// finite.
    pub fn new(range: Range<f64>, level: f64) -> Result<Self, ScheduleError> {
        if !(range.start.is_finite() && range.end.is_finite() && range.start < range.end) {
            return Err(ScheduleError::EmptyRange(range));
        }
        Ok(Self { range, level })
    }

    /// Returns the time range covered by this step.
    #[must_use]
    pub fn range(&self) -> &Range<f64> {
        &self.range
    }

    /// Returns the food level of this step.
    #[must_use]
    pub fn level(&self) -> f64 {
        self.level
    }
}

/// Errors returned when building a [`FoodSchedule`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("step range {0:?} is empty or not finite")]
    EmptyRange(Range<f64>),

    #[error("steps overlap: {first:?} and {second:?}")]
    Overlapping {
        first: Range<f64>,
        second: Range<f64>,
    },
}

/// Piecewise-constant food availability.
///
/// Times not covered by any step get the `fallback` level.
///
/// ```
/// use debsim::food::{FoodFunction, FoodSchedule, FoodStep};
///
/// let schedule = FoodSchedule::new(
///     [
///         FoodStep::new(0.0..100.0, 1.0).unwrap(),
///         FoodStep::new(100.0..150.0, 0.2).unwrap(),
///     ],
///     0.8,
/// )
/// .unwrap();
///
/// assert_eq!(schedule.food(50.0), 1.0);
/// assert_eq!(schedule.food(120.0), 0.2);
/// assert_eq!(schedule.food(500.0), 0.8);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FoodSchedule {
    steps: Vec<FoodStep>,
    fallback: f64,
}

impl FoodSchedule {
    /// Creates a schedule from steps in any order.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Overlapping`] if any two steps overlap.
    pub fn new<I>(steps: I, fallback: f64) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = FoodStep>,
    {
        let mut steps: Vec<_> = steps.into_iter().collect();
        steps.sort_by(|a, b| a.range.start.total_cmp(&b.range.start));

        if let Some(pair) = steps
            .windows(2)
            .find(|pair| pair[1].range.start < pair[0].range.end)
        {
            return Err(ScheduleError::Overlapping {
                first: pair[0].range.clone(),
                second: pair[1].range.clone(),
            });
        }

        Ok(Self { steps, fallback })
    }

    /// Returns the steps ordered by start time.
    #[must_use]
    pub fn steps(&self) -> &[FoodStep] {
        &self.steps
    }

    /// Returns the food level used outside every step.
    #[must_use]
    pub fn fallback(&self) -> f64 {
        self.fallback
    }
}

impl FoodFunction for FoodSchedule {
    fn food(&self, t: f64) -> f64 {
        let index = self.steps.partition_point(|step| step.range.start <= t);
        index
            .checked_sub(1)
            .map(|i| &self.steps[i])
            .filter(|step| step.range.contains(&t))
            .map_or(self.fallback, FoodStep::level)
    }
}
