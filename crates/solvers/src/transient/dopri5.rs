//! Adaptive Dormand–Prince 5(4) solver for initial value problems.
//!
//! # Algorithm
//!
//! Each step evaluates seven stages and forms a fifth-order solution together
//! with an embedded fourth-order error estimate. The last stage is the
//! derivative at the new state, so it is reused as the first stage of the next
//! step (first same as last).
//!
//! The local error is measured as the root mean square of
//! `err_i / (abs_tol + rel_tol * max(|y_i|, |y_new_i|))`. A step is accepted
//! when that norm is below one, and the next step size is scaled by
//! `0.9 * norm^(-1/5)`, clamped to `[0.2, 10]`.
//!
//! Steps never exceed [`Config::max_step`] and are shortened to land exactly
//! on the end of the span and on any requested grid times.
//!
//! # Observer Events
//!
//! The solver emits one [`Event`] per recorded sample, starting with the
//! initial state. Observers can return [`Action::StopEarly`] to halt
//! immediately and keep the samples recorded so far.
//!
//! # Non-finite derivatives
//!
//! A derivative containing NaN or infinity produces a non-finite error norm,
//! which is always rejected. The step size then shrinks until it underflows
//! and the solver returns [`Error::StepSizeUnderflow`].

mod config;
mod error;
mod event;
mod sampling;
mod solution;
mod tableau;


pub use config::{Config, ConfigError};
pub use error::Error;
pub use event::{Action, Event};
pub use sampling::Sampling;
pub use solution::{Solution, Stats, Status};

use debsim_core::{Observer, OdeSystem};

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Integrates `system` from `y0` over `t_span` using Dormand–Prince 5(4).
///
/// # Observer
///
/// The observer receives an [`Event`] for each recorded sample and may return
/// [`Action::StopEarly`] to terminate the integration early.
///
/// # Errors
///
/// Returns an error if the span or grid is invalid, if the step size
/// underflows, or if the step limit in `config` is exceeded.
pub fn solve<S, Obs, const N: usize>(
    system: &S,
    t_span: [f64; 2],
    y0: [f64; N],
    sampling: &Sampling,
    config: &Config,
    mut observer: Obs,
) -> Result<Solution<N>, Error>
where
    S: OdeSystem<N>,
    Obs: Observer<Event<N>, Action>,
{
    let [start, end] = t_span;
    if !(start.is_finite() && end.is_finite() && end > start) {
        return Err(Error::InvalidSpan { start, end });
    }
    sampling.validate(start, end)?;

    let record_all = matches!(sampling, Sampling::Steps);
    let grid: &[f64] = match sampling {
        Sampling::Steps => &[],
        Sampling::Grid(times) => times,
    };

    let mut recorder = Recorder::new(grid.len());
    let mut stats = Stats::default();

    // A grid time at the start is recorded before stepping.
    let mut next_grid = 0;
    if grid.first() == Some(&start) {
        next_grid = 1;
    }
    let record_start = record_all || next_grid == 1;
    if record_start && recorder.record(start, y0, &mut observer) {
        return Ok(recorder.finish(Status::StoppedByObserver, stats));
    }

    let mut t = start;
    let mut y = y0;
    let mut f = system.derivative(t, &y);
    stats.evaluations += 1;

    let mut h = initial_step(system, t, &y, &f, end - t, config);
    stats.evaluations += 1;

    let mut rejected_last = false;

    while t < end {
        if stats.accepted + stats.rejected >= config.max_steps() {
            return Err(Error::TooManySteps {
                t,
                max_steps: config.max_steps(),
            });
        }

        let min_step = 10.0 * f64::EPSILON * t.abs();
        if h.is_nan() || h <= min_step {
            return Err(Error::StepSizeUnderflow { t, h });
        }

        // Choose the step, shortening it to land on the next target time.
        let mut h_try = h.min(config.max_step());
        let mut target = None;
        if t + h_try >= end {
            h_try = end - t;
            target = Some(end);
        }
        if let Some(&t_grid) = grid.get(next_grid)
            && t + h_try >= t_grid
        {
            h_try = t_grid - t;
            target = Some(t_grid);
        }

        let (y_new, f_new, err_norm) = attempt(system, t, &y, &f, h_try, config);
        stats.evaluations += 6;

        if err_norm < 1.0 {
            let factor = if err_norm == 0.0 {
                MAX_FACTOR
            } else {
                (SAFETY * err_norm.powf(ERROR_EXPONENT)).min(MAX_FACTOR)
            };
            let factor = if rejected_last { factor.min(1.0) } else { factor };

            // A step shortened to hit a target says nothing against the
            // proposed size, so only let it shrink the next step.
            let shortened = h_try < h;
            h = if shortened && factor >= 1.0 {
                h
            } else {
                h_try * factor
            };
            h = h.min(config.max_step());

            t = target.unwrap_or(t + h_try);
            y = y_new;
            f = f_new;
            stats.accepted += 1;
            rejected_last = false;

            let on_grid = grid.get(next_grid) == Some(&t);
            if on_grid {
                next_grid += 1;
            }
            if (record_all || on_grid) && recorder.record(t, y, &mut observer) {
                return Ok(recorder.finish(Status::StoppedByObserver, stats));
            }
        } else {
            h = h_try * (SAFETY * err_norm.powf(ERROR_EXPONENT)).max(MIN_FACTOR);
            stats.rejected += 1;
            rejected_last = true;
        }
    }

    Ok(recorder.finish(Status::Complete, stats))
}

/// Integrates `system` over `t_span` without observation.
///
/// This is a convenience wrapper around [`solve`] that discards events.
///
/// # Errors
///
/// Returns an error under the same conditions as [`solve`].
pub fn solve_unobserved<S, const N: usize>(
    system: &S,
    t_span: [f64; 2],
    y0: [f64; N],
    sampling: &Sampling,
    config: &Config,
) -> Result<Solution<N>, Error>
where
    S: OdeSystem<N>,
{
    solve(system, t_span, y0, sampling, config, ())
}

/// Collects samples and forwards them to the observer.
struct Recorder<const N: usize> {
    t: Vec<f64>,
    y: Vec<[f64; N]>,
}

impl<const N: usize> Recorder<N> {
    fn new(capacity: usize) -> Self {
        Self {
            t: Vec::with_capacity(capacity),
            y: Vec::with_capacity(capacity),
        }
    }

    /// Records a sample and returns `true` if the observer asked to stop.
    fn record<Obs>(&mut self, t: f64, y: [f64; N], observer: &mut Obs) -> bool
    where
        Obs: Observer<Event<N>, Action>,
    {
        let event = Event {
            sample: self.t.len(),
            t,
            y,
        };
        self.t.push(t);
        self.y.push(y);

        matches!(observer.observe(&event), Some(Action::StopEarly))
    }

    fn finish(self, status: Status, stats: Stats) -> Solution<N> {
        Solution {
            status,
            t: self.t,
            y: self.y,
            stats,
        }
    }
}

/// Performs one trial step of size `h` from `(t, y)` with derivative `f`.
///
/// Returns the fifth-order state, its derivative, and the error norm.
fn attempt<S, const N: usize>(
    system: &S,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
    h: f64,
    config: &Config,
) -> ([f64; N], [f64; N], f64)
where
    S: OdeSystem<N>,
{
    let mut k = [[0.0; N]; 7];
    k[0] = *f;

    for stage in 1..7 {
        let mut y_stage = *y;
        for (i, value) in y_stage.iter_mut().enumerate() {
            *value += h * (0..stage)
                .map(|j| tableau::A[stage][j] * k[j][i])
                .sum::<f64>();
        }
        k[stage] = system.derivative(t + tableau::C[stage] * h, &y_stage);
    }

    // The seventh stage is evaluated at the fifth-order solution.
    let mut y_new = *y;
    for (i, value) in y_new.iter_mut().enumerate() {
        *value += h * (0..6).map(|j| tableau::B[j] * k[j][i]).sum::<f64>();
    }
    let f_new = k[6];

    let mut err = [0.0; N];
    for (i, value) in err.iter_mut().enumerate() {
        *value = h * (0..7).map(|j| tableau::E[j] * k[j][i]).sum::<f64>();
    }

    let scale: [f64; N] = std::array::from_fn(|i| {
        config.abs_tol() + config.rel_tol() * y[i].abs().max(y_new[i].abs())
    });

    (y_new, f_new, rms_norm(&err, &scale))
}

/// Chooses the first step size using the heuristic of Hairer, Nørsett and
/// Wanner (Solving Ordinary Differential Equations I, sec. II.4).
fn initial_step<S, const N: usize>(
    system: &S,
    t: f64,
    y: &[f64; N],
    f: &[f64; N],
    span: f64,
    config: &Config,
) -> f64
where
    S: OdeSystem<N>,
{
    let scale: [f64; N] =
        std::array::from_fn(|i| config.abs_tol() + config.rel_tol() * y[i].abs());

    let d0 = rms_norm(y, &scale);
    let d1 = rms_norm(f, &scale);
    let h0 = if d0 < 1e-5 || d1 < 1e-5 {
        1e-6
    } else {
        0.01 * d0 / d1
    };
    let h0 = h0.min(span).min(config.max_step());

    let y1: [f64; N] = std::array::from_fn(|i| y[i] + h0 * f[i]);
    let f1 = system.derivative(t + h0, &y1);
    let df: [f64; N] = std::array::from_fn(|i| f1[i] - f[i]);
    let d2 = rms_norm(&df, &scale) / h0;

    let h1 = if d1 <= 1e-15 && d2 <= 1e-15 {
        (h0 * 1e-3).max(1e-6)
    } else {
        (0.01 / d1.max(d2)).powf(1.0 / 5.0)
    };

    (100.0 * h0).min(h1).min(span).min(config.max_step())
}

/// Root mean square of `values / scale`.
fn rms_norm<const N: usize>(values: &[f64; N], scale: &[f64; N]) -> f64 {
    if N == 0 {
        return 0.0;
    }

    let sum: f64 = values
        .iter()
        .zip(scale)
        .map(|(v, s)| (v / s).powi(2))
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let n = N as f64;
    (sum / n).sqrt()
}
