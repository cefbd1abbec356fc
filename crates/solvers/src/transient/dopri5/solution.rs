/// Indicates how the solver terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Integrated to the end of the span.
    Complete,

    /// Stopped early due to an observer action.
    StoppedByObserver,
}

/// Work counters for a single run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    /// Number of derivative evaluations.
    pub evaluations: usize,

    /// Number of accepted steps.
    pub accepted: usize,

    /// Number of steps rejected by error control.
    pub rejected: usize,
}

/// The result of a Dormand–Prince integration.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<const N: usize> {
    /// How the solver terminated.
    pub status: Status,

    /// Sample times, strictly increasing.
    pub t: Vec<f64>,

    /// States at each sample time.
    pub y: Vec<[f64; N]>,

    /// Work counters.
    pub stats: Stats,
}

impl<const N: usize> Solution<N> {
    /// Returns the number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    /// Returns `true` if no samples were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Returns the time series of the state component at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= N`.
    #[must_use]
    pub fn component(&self, index: usize) -> Vec<f64> {
        self.y.iter().map(|y| y[index]).collect()
    }
}
