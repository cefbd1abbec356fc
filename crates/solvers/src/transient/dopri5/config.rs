use thiserror::Error;

/// Configuration for the Dormand–Prince solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    rel_tol: f64,
    abs_tol: f64,
    max_step: f64,
    max_steps: usize,
}

/// Errors that can occur when validating a Dormand–Prince solver config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("rel_tol must be finite and positive")]
    RelTol,

    #[error("abs_tol must be finite and non-negative")]
    AbsTol,

    #[error("max_step must be positive")]
    MaxStep,
}

impl Default for Config {
    fn default() -> Self {
        // Known-good values, unwrap is safe
        Self::new(1e-3, 1e-6, f64::INFINITY, 1_000_000).unwrap()
    }
}

impl Config {
    /// Creates a new config with validated tolerances and step limits.
    ///
    /// `max_step` may be `f64::INFINITY` to leave the step size unbounded.
    ///
    /// # Errors
    ///
    /// Returns an error if a tolerance is negative or non-finite, if `rel_tol`
    /// is zero, or if `max_step` is not positive.
    pub fn new(
        rel_tol: f64,
        abs_tol: f64,
        max_step: f64,
        max_steps: usize,
    ) -> Result<Self, ConfigError> {
        if !rel_tol.is_finite() || rel_tol <= 0.0 {
            return Err(ConfigError::RelTol);
        }
        if !abs_tol.is_finite() || abs_tol < 0.0 {
            return Err(ConfigError::AbsTol);
        }
        if max_step.is_nan() || max_step <= 0.0 {
            return Err(ConfigError::MaxStep);
        }

        Ok(Self {
            rel_tol,
            abs_tol,
            max_step,
            max_steps,
        })
    }

    /// Returns a copy of this config with a different maximum step size.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MaxStep`] if `max_step` is not positive.
    pub fn with_max_step(self, max_step: f64) -> Result<Self, ConfigError> {
        Self::new(self.rel_tol, self.abs_tol, max_step, self.max_steps)
    }

    /// Returns the relative tolerance for local error control.
    #[must_use]
    pub fn rel_tol(&self) -> f64 {
        self.rel_tol
    }

    /// Returns the absolute tolerance for local error control.
    #[must_use]
    pub fn abs_tol(&self) -> f64 {
        self.abs_tol
    }

    /// Returns the largest step the solver may take.
    #[must_use]
    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Returns the maximum number of attempted steps before giving up.
    #[must_use]
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = Config::default();
        assert_eq!(config.rel_tol(), 1e-3);
        assert_eq!(config.abs_tol(), 1e-6);
        assert!(config.max_step().is_infinite());
    }

    #[test]
    fn rejects_bad_tolerances() {
        assert_eq!(Config::new(0.0, 1e-6, 1.0, 10), Err(ConfigError::RelTol));
        assert_eq!(Config::new(f64::NAN, 1e-6, 1.0, 10), Err(ConfigError::RelTol));
        assert_eq!(Config::new(1e-3, -1.0, 1.0, 10), Err(ConfigError::AbsTol));
    }

    #[test]
    fn rejects_non_positive_max_step() {
        let config = Config::default();
        assert_eq!(config.with_max_step(0.0), Err(ConfigError::MaxStep));
        assert_eq!(config.with_max_step(f64::NAN), Err(ConfigError::MaxStep));
        assert_eq!(config.with_max_step(2.0).unwrap().max_step(), 2.0);
    }
}
