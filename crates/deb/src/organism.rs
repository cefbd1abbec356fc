use ndarray::{Array2, arr2};
use serde::Deserialize;

use crate::error::{ConfigurationError, Requirement};

/// Raw organism parameters, as read from a table or mapping.
///
/// Field names follow DEB notation in snake case. Unknown fields are ignored
/// so parameter files may carry extra metadata.
///
/// Units are up to the caller but must be consistent; the presets use joules,
/// cubic centimetres and days.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrganismParams {
    /// Maximum surface-specific assimilation rate `{p_Am}`.
    pub p_am: f64,
    /// Energy conductance `v`.
    pub v: f64,
    /// Volume-specific somatic maintenance cost `[p_M]`.
    pub p_m: f64,
    /// Specific cost of structure `[E_G]`.
    pub e_g: f64,
    /// Fraction of mobilized reserve allocated to soma.
    pub kappa: f64,
    /// Fraction of the reproduction buffer fixed into offspring.
    pub kap_r: f64,
    /// Maturity maintenance rate coefficient.
    pub k_j: f64,
    /// Maturity at birth.
    pub e_hb: f64,
    /// Maturity at puberty.
    pub e_hp: f64,
    /// Maturity at weaning.
    pub e_hx: Option<f64>,
    /// Structural volume at the start of a simulation.
    pub v_0: f64,
    /// Reserve at the start of a simulation; defaults to `e_m * v_0`.
    pub e_0: Option<f64>,
    /// Mineral yields: rows CO2, H2O, O2, N-waste; columns assimilation,
    /// dissipation, growth.
    pub eta_m: [[f64; 3]; 4],
    /// Time before gestation starts.
    pub t_0: Option<f64>,
    /// Scaled functional response while feeding on milk.
    pub f_milk: Option<f64>,
    /// Reserve density of the mother.
    pub e_density_mother: Option<f64>,
}

/// A validated, immutable set of organism parameters.
///
/// Construct with [`Organism::new`]. Fields are public for reading; the type
/// cannot be built outside this crate without going through validation.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Organism {
    pub p_am: f64,
    pub v: f64,
    pub p_m: f64,
    pub e_g: f64,
    pub kappa: f64,
    pub kap_r: f64,
    pub k_j: f64,
    pub e_hb: f64,
    pub e_hp: f64,
    pub e_hx: Option<f64>,
    pub v_0: f64,
    pub e_0: f64,
    pub eta_m: [[f64; 3]; 4],
    pub t_0: Option<f64>,
    pub f_milk: Option<f64>,
    pub e_density_mother: Option<f64>,
}

impl Organism {
    /// Validates raw parameters and resolves defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if any parameter is out of range; see
    /// [`Organism::check_validity`].
    pub fn new(params: OrganismParams) -> Result<Self, ConfigurationError> {
        let e_0 = params.e_0.unwrap_or(params.p_am / params.v * params.v_0);

        let organism = Self {
            p_am: params.p_am,
            v: params.v,
            p_m: params.p_m,
            e_g: params.e_g,
            kappa: params.kappa,
            kap_r: params.kap_r,
            k_j: params.k_j,
            e_hb: params.e_hb,
            e_hp: params.e_hp,
            e_hx: params.e_hx,
            v_0: params.v_0,
            e_0,
            eta_m: params.eta_m,
            t_0: params.t_0,
            f_milk: params.f_milk,
            e_density_mother: params.e_density_mother,
        };

        organism.check_validity()?;
        Ok(organism)
    }

    /// Checks every parameter against its allowed range.
    ///
    /// Rates, costs and thresholds must be non-negative, with `p_am`, `v`,
    /// `e_g`, `e_hb` and `v_0` strictly positive. `kappa` and `kap_r` are fractions.
    /// Thresholds must be ordered `e_hb < e_hx < e_hp`. Mineral yields carry
    /// signs and only need to be finite.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn check_validity(&self) -> Result<(), ConfigurationError> {
        use Requirement::{Finite, Fraction, NonNegative, Positive};

        let checks = [
            ("p_am", self.p_am, Positive),
            ("v", self.v, Positive),
            ("p_m", self.p_m, NonNegative),
            ("e_g", self.e_g, Positive),
            ("kappa", self.kappa, Fraction),
            ("kap_r", self.kap_r, Fraction),
            ("k_j", self.k_j, NonNegative),
            ("e_hb", self.e_hb, Positive),
            ("e_hp", self.e_hp, NonNegative),
            ("v_0", self.v_0, Positive),
            ("e_0", self.e_0, NonNegative),
        ];
        let optional = [
            ("e_hx", self.e_hx, NonNegative),
            ("t_0", self.t_0, Finite),
            ("f_milk", self.f_milk, Finite),
            ("e_density_mother", self.e_density_mother, NonNegative),
        ];
        let yields = self.eta_m.iter().flatten().map(|&y| ("eta_m", y, Finite));

        for (name, value, requirement) in checks
            .into_iter()
            .chain(optional.into_iter().filter_map(|(n, v, r)| Some((n, v?, r))))
            .chain(yields)
        {
            if !requirement.holds(value) {
                return Err(ConfigurationError::OutOfRange {
                    name,
                    requirement,
                    value,
                });
            }
        }

        if self.e_hb >= self.e_hp {
            return Err(ConfigurationError::BirthAfterPuberty {
                e_hb: self.e_hb,
                e_hp: self.e_hp,
            });
        }
        if let Some(e_hx) = self.e_hx
            && (e_hx <= self.e_hb || e_hx >= self.e_hp)
        {
            return Err(ConfigurationError::WeaningOutOfRange {
                e_hb: self.e_hb,
                e_hx,
                e_hp: self.e_hp,
            });
        }

        Ok(())
    }

    /// Maximum reserve density `[E_m] = {p_Am} / v`.
    #[must_use]
    pub fn e_m(&self) -> f64 {
        self.p_am / self.v
    }

    /// Mineral yield matrix (4 × 3).
    #[must_use]
    pub fn yields(&self) -> Array2<f64> {
        arr2(&self.eta_m)
    }

    /// Returns a copy with a different initial reserve.
    pub(crate) fn with_initial_reserve(&self, e_0: f64) -> Self {
        Self {
            e_0,
            ..self.clone()
        }
    }
}

impl TryFrom<OrganismParams> for Organism {
    type Error = ConfigurationError;

    fn try_from(params: OrganismParams) -> Result<Self, Self::Error> {
        Self::new(params)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use approx::assert_relative_eq;

    /// Parameters for a small organism with round numbers.
    pub(crate) fn params() -> OrganismParams {
        OrganismParams {
            p_am: 100.0,
            v: 0.02,
            p_m: 18.0,
            e_g: 2800.0,
            kappa: 0.8,
            kap_r: 0.95,
            k_j: 0.002,
            e_hb: 1.0,
            e_hp: 1000.0,
            e_hx: None,
            v_0: 1e-3,
            e_0: Some(50.0),
            eta_m: [
                [1.0, 2.0, 3.0],
                [4.0, 5.0, 6.0],
                [-7.0, -8.0, -9.0],
                [0.1, 0.2, 0.3],
            ],
            t_0: None,
            f_milk: None,
            e_density_mother: None,
        }
    }

    #[test]
    fn valid_parameters() {
        let organism = Organism::new(params()).expect("valid");
        assert_relative_eq!(organism.e_0, 50.0);
        assert_relative_eq!(organism.e_m(), 5000.0);
        assert_eq!(organism.yields().dim(), (4, 3));
        assert_relative_eq!(organism.yields()[[2, 1]], -8.0);
    }

    #[test]
    fn initial_reserve_defaults_to_maximum_density() {
        let organism = Organism::new(OrganismParams {
            e_0: None,
            ..params()
        })
        .expect("valid");

        assert_relative_eq!(organism.e_0, 5.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            ("kappa", OrganismParams { kappa: 1.2, ..params() }),
            ("kap_r", OrganismParams { kap_r: -0.1, ..params() }),
            ("v", OrganismParams { v: 0.0, ..params() }),
            ("p_m", OrganismParams { p_m: -1.0, ..params() }),
            ("k_j", OrganismParams { k_j: f64::NAN, ..params() }),
            ("e_0", OrganismParams { e_0: Some(-1.0), ..params() }),
            ("e_hb", OrganismParams { e_hb: 0.0, ..params() }),
        ];

        for (expected, params) in cases {
            match Organism::new(params) {
                Err(ConfigurationError::OutOfRange { name, .. }) => assert_eq!(name, expected),
                other => panic!("expected {expected} to be rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn rejects_non_finite_yields() {
        let mut bad = params();
        bad.eta_m[3][2] = f64::INFINITY;

        assert!(matches!(
            Organism::new(bad),
            Err(ConfigurationError::OutOfRange { name: "eta_m", .. })
        ));
    }

    #[test]
    fn rejects_misordered_thresholds() {
        let result = Organism::new(OrganismParams {
            e_hb: 2000.0,
            ..params()
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::BirthAfterPuberty { .. })
        ));

        let result = Organism::new(OrganismParams {
            e_hx: Some(1000.0),
            ..params()
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::WeaningOutOfRange { .. })
        ));
    }

    #[test]
    fn with_initial_reserve_leaves_original_untouched() {
        let organism = Organism::new(params()).unwrap();
        let resolved = organism.with_initial_reserve(7.0);

        assert_relative_eq!(organism.e_0, 50.0);
        assert_relative_eq!(resolved.e_0, 7.0);
        assert_eq!(resolved.p_am, organism.p_am);
    }
}
