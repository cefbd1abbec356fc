/// Event emitted by the Dormand–Prince solver for each recorded sample.
///
/// Sample 0 is the initial state at the start of the span.
/// Later samples follow either accepted steps or grid times, depending on
/// the requested [`Sampling`](super::Sampling).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event<const N: usize> {
    /// Index of the sample within the solution.
    pub sample: usize,

    /// Time of the sample.
    pub t: f64,

    /// State at time `t`.
    pub y: [f64; N],
}

/// What an observer can ask of the solver after an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Halt without taking another step; the samples recorded so far,
    /// including the one just observed, are returned as a
    /// [`Status::StoppedByObserver`](super::Status::StoppedByObserver)
    /// solution.
    StopEarly,
}
