use std::fmt;

use debsim_solvers::transient::dopri5;
use thiserror::Error;

/// The range a parameter value must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Finite,
    Positive,
    NonNegative,
    Fraction,
}

impl Requirement {
    /// Returns `true` if `value` satisfies the requirement.
    #[must_use]
    pub fn holds(self, value: f64) -> bool {
        value.is_finite()
            && match self {
                Self::Finite => true,
                Self::Positive => value > 0.0,
                Self::NonNegative => value >= 0.0,
                Self::Fraction => (0.0..=1.0).contains(&value),
            }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Finite => "finite",
            Self::Positive => "finite and positive",
            Self::NonNegative => "finite and non-negative",
            Self::Fraction => "within [0, 1]",
        })
    }
}

/// Invalid or missing organism parameters.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("parameter `{name}` must be {requirement}, got {value}")]
    OutOfRange {
        name: &'static str,
        requirement: Requirement,
        value: f64,
    },

    #[error("maturity at birth e_hb = {e_hb} must be below maturity at puberty e_hp = {e_hp}")]
    BirthAfterPuberty { e_hb: f64, e_hp: f64 },

    #[error(
        "weaning maturity e_hx = {e_hx} must lie strictly between e_hb = {e_hb} and e_hp = {e_hp}"
    )]
    WeaningOutOfRange { e_hb: f64, e_hx: f64, e_hp: f64 },

    #[error("the extended model requires parameter `{0}`")]
    MissingParameter(&'static str),

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),

    #[error("invalid parameter table: {0}")]
    Parse(#[from] toml::de::Error),
}

/// A malformed argument to a model operation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("initial state must have 4 values (E, V, E_H, E_R), got {0}")]
    InitialStateLength(usize),

    #[error("unrecognized step size `{0}`: expected `auto` or a number")]
    StepSize(String),

    #[error("fixed step size must be finite and positive, got {0}")]
    NonPositiveStep(f64),

    #[error("the model has not been simulated yet")]
    NotSimulated,
}

/// Errors returned by [`Model::simulate`](crate::Model::simulate).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error(transparent)]
    Input(#[from] InvalidInput),

    #[error(transparent)]
    Solver(#[from] dopri5::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requirements() {
        assert!(Requirement::Positive.holds(1.0));
        assert!(!Requirement::Positive.holds(0.0));
        assert!(Requirement::NonNegative.holds(0.0));
        assert!(!Requirement::NonNegative.holds(f64::INFINITY));
        assert!(Requirement::Fraction.holds(1.0));
        assert!(!Requirement::Fraction.holds(1.01));
        assert!(!Requirement::Finite.holds(f64::NAN));
    }

    #[test]
    fn messages_name_the_parameter() {
        let error = ConfigurationError::OutOfRange {
            name: "kappa",
            requirement: Requirement::Fraction,
            value: 1.5,
        };
        assert_eq!(
            error.to_string(),
            "parameter `kappa` must be within [0, 1], got 1.5"
        );
    }
}
