use super::Error;

/// Selects which times the solver records.
#[derive(Debug, Clone, PartialEq)]
pub enum Sampling {
    /// Record the initial state and every accepted step.
    Steps,

    /// Record only at the given times.
    ///
    /// Times must be finite, strictly increasing and inside the span. The
    /// solver shortens steps so that it lands exactly on each time, which
    /// makes recorded states exact step results rather than interpolations.
    Grid(Vec<f64>),
}

impl Sampling {
    /// Creates a uniform grid `start + i * dt` for every `i` whose time lies
    /// before `end`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSpan`] if the span is empty or not finite,
    /// [`Error::InvalidGrid`] if `dt` is not positive and finite, and
    /// [`Error::GridTooLarge`] if the grid would hold more than `max_len`
    /// times.
    pub fn uniform(start: f64, end: f64, dt: f64, max_len: usize) -> Result<Self, Error> {
        if !(start.is_finite() && end.is_finite() && end > start) {
            return Err(Error::InvalidSpan { start, end });
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(Error::InvalidGrid);
        }

        let len = ((end - start) / dt).ceil();
        #[allow(clippy::cast_precision_loss)]
        let limit = max_len as f64;
        if len > limit {
            return Err(Error::GridTooLarge { len, max_len });
        }

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let count = len as usize;

        #[allow(clippy::cast_precision_loss)]
        let times = (0..count)
            .map(|i| start + i as f64 * dt)
            .take_while(|&t| t < end)
            .collect();

        Ok(Self::Grid(times))
    }

    /// Checks that grid times are usable for the span `[start, end]`.
    pub(super) fn validate(&self, start: f64, end: f64) -> Result<(), Error> {
        let Self::Grid(times) = self else {
            return Ok(());
        };

        let in_span = times
            .iter()
            .all(|&t| t.is_finite() && t >= start && t <= end);
        let increasing = times.windows(2).all(|pair| pair[0] < pair[1]);

        if in_span && increasing {
            Ok(())
        } else {
            Err(Error::InvalidGrid)
        }
    }
}
