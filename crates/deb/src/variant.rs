//! The two sets of state equations and the formulas that differ between them.
//!
//! Most power flows are shared. The extended model differs in four places:
//! assimilation (milk before weaning), growth and reproduction before birth
//! (driven by the mother rather than by mobilization), and the state
//! derivatives before birth (no change until gestation starts, then reserve
//! supplied by the mother).

use crate::{
    error::{ConfigurationError, Requirement},
    organism::Organism,
    stage::LifeStage,
};

/// Selects which set of state equations a model uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    /// The standard DEB model: an embryo lives off its initial reserve, then
    /// feeds on food.
    Standard,

    /// Mammal-style model with fetal development after a preparation time,
    /// and milk feeding until weaning.
    Extended,
}

/// Resolved gestation and lactation parameters of the extended model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gestation {
    /// Time at which gestation starts.
    pub t_0: f64,
    /// Maturity at weaning.
    pub e_hx: f64,
    /// Scaled functional response while feeding on milk.
    pub f_milk: f64,
    /// Reserve density of the mother.
    pub e_density_mother: f64,
}

/// A model kind with its resolved parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Variant {
    Standard,
    Extended(Gestation),
}

impl Variant {
    /// Resolves `kind` against `organism`.
    ///
    /// Returns the variant together with the organism the model should use.
    /// For the extended model that is a copy whose initial reserve is
    /// `e_density_mother * v_0`; the input is never modified.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if the organism fails its validity
    /// check, or for the extended model if `t_0` or `e_hx` is missing,
    /// `t_0 <= 0`, `e_hx` is not strictly between `e_hb` and `e_hp`, or
    /// `f_milk <= 0`.
    pub fn resolve(
        kind: ModelKind,
        organism: Organism,
    ) -> Result<(Self, Organism), ConfigurationError> {
        organism.check_validity()?;

        match kind {
            ModelKind::Standard => Ok((Self::Standard, organism)),
            ModelKind::Extended => {
                let t_0 = organism
                    .t_0
                    .ok_or(ConfigurationError::MissingParameter("t_0"))?;
                let e_hx = organism
                    .e_hx
                    .ok_or(ConfigurationError::MissingParameter("e_hx"))?;
                let f_milk = organism.f_milk.unwrap_or(1.0);
                let e_density_mother = organism.e_density_mother.unwrap_or(organism.e_m());

                for (name, value) in [("t_0", t_0), ("f_milk", f_milk)] {
                    if !Requirement::Positive.holds(value) {
                        return Err(ConfigurationError::OutOfRange {
                            name,
                            requirement: Requirement::Positive,
                            value,
                        });
                    }
                }
                if e_hx <= organism.e_hb || e_hx >= organism.e_hp {
                    return Err(ConfigurationError::WeaningOutOfRange {
                        e_hb: organism.e_hb,
                        e_hx,
                        e_hp: organism.e_hp,
                    });
                }

                let gestation = Gestation {
                    t_0,
                    e_hx,
                    f_milk,
                    e_density_mother,
                };
                let resolved = organism.with_initial_reserve(e_density_mother * organism.v_0);
                Ok((Self::Extended(gestation), resolved))
            }
        }
    }

    /// Returns the kind this variant was resolved from.
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Self::Standard => ModelKind::Standard,
            Self::Extended(_) => ModelKind::Extended,
        }
    }

    /// Returns the gestation parameters of the extended model.
    #[must_use]
    pub fn gestation(&self) -> Option<&Gestation> {
        match self {
            Self::Standard => None,
            Self::Extended(gestation) => Some(gestation),
        }
    }

    /// Classifies maturity `e_h` at time `t`.
    #[must_use]
    pub fn stage(&self, organism: &Organism, t: f64, e_h: f64) -> LifeStage {
        if e_h < organism.e_hb {
            return match self {
                Self::Standard => LifeStage::Embryo,
                Self::Extended(g) => LifeStage::Fetus {
                    gestating: t >= g.t_0,
                },
            };
        }

        if let Self::Extended(g) = self
            && e_h < g.e_hx
        {
            LifeStage::Suckling
        } else if e_h < organism.e_hp {
            LifeStage::Juvenile
        } else {
            LifeStage::Adult
        }
    }

    /// Assimilation power for one sample.
    pub(crate) fn assimilation(
        &self,
        organism: &Organism,
        stage: LifeStage,
        food: f64,
        v: f64,
    ) -> f64 {
        let f = match (stage, self) {
            (LifeStage::Embryo | LifeStage::Fetus { .. }, _) => return 0.0,
            (LifeStage::Suckling, Self::Extended(g)) => g.f_milk,
            _ => food,
        };
        organism.p_am * f * v.powf(2.0 / 3.0)
    }

    /// Growth power for one sample.
    pub(crate) fn growth(
        &self,
        organism: &Organism,
        stage: LifeStage,
        p_c: f64,
        p_s: f64,
        v: f64,
    ) -> f64 {
        match stage {
            LifeStage::Fetus { .. } => organism.e_g * organism.v * v.powf(2.0 / 3.0),
            _ => organism.kappa * p_c - p_s,
        }
    }

    /// Reproduction (or maturation) power for one sample.
    pub(crate) fn reproduction(
        &self,
        organism: &Organism,
        stage: LifeStage,
        flows: Allocation,
    ) -> f64 {
        let Allocation { p_c, p_j, p_s, p_g } = flows;
        let kappa = organism.kappa;
        match stage {
            LifeStage::Fetus { .. } => (1.0 - kappa) * (p_s + p_g) / kappa - p_j,
            _ => (1.0 - kappa) * p_c - p_j,
        }
    }

    /// State derivatives `(dE, dV, dE_H, dE_R)` for one sample.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn rates(
        &self,
        organism: &Organism,
        stage: LifeStage,
        v: f64,
        p_a: f64,
        p_c: f64,
        p_g: f64,
        p_r: f64,
    ) -> [f64; 4] {
        let d_v = p_g / organism.e_g;

        match (stage, self) {
            (LifeStage::Fetus { gestating: false }, _) => [0.0; 4],
            (LifeStage::Fetus { gestating: true }, Self::Extended(g)) => {
                let supply = organism.v * g.e_density_mother * v.powf(2.0 / 3.0);
                [supply, d_v, p_r, 0.0]
            }
            (LifeStage::Adult, _) => [p_a - p_c, d_v, 0.0, organism.kap_r * p_r],
            _ => [p_a - p_c, d_v, p_r, 0.0],
        }
    }
}

/// Powers that feed the reproduction branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Allocation {
    pub p_c: f64,
    pub p_j: f64,
    pub p_s: f64,
    pub p_g: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::organism::{OrganismParams, tests::params};

    fn extended_params() -> OrganismParams {
        OrganismParams {
            e_hx: Some(10.0),
            t_0: Some(50.0),
            ..params()
        }
    }

    fn organism(params: OrganismParams) -> Organism {
        Organism::new(params).expect("valid organism")
    }

    #[test]
    fn standard_keeps_organism() {
        let original = organism(params());
        let (variant, resolved) = Variant::resolve(ModelKind::Standard, original.clone()).unwrap();

        assert_eq!(variant, Variant::Standard);
        assert_eq!(variant.kind(), ModelKind::Standard);
        assert_eq!(resolved, original);
    }

    #[test]
    fn extended_fills_defaults_and_derives_reserve() {
        let (variant, resolved) =
            Variant::resolve(ModelKind::Extended, organism(extended_params())).unwrap();

        let gestation = variant.gestation().expect("extended");
        assert_relative_eq!(gestation.f_milk, 1.0);
        assert_relative_eq!(gestation.e_density_mother, 5000.0);
        assert_relative_eq!(resolved.e_0, 5000.0 * 1e-3);
    }

    #[test]
    fn extended_uses_given_mother_density() {
        let params = OrganismParams {
            e_density_mother: Some(3000.0),
            f_milk: Some(1.3),
            ..extended_params()
        };
        let (variant, resolved) = Variant::resolve(ModelKind::Extended, organism(params)).unwrap();

        assert_relative_eq!(variant.gestation().unwrap().f_milk, 1.3);
        assert_relative_eq!(resolved.e_0, 3.0);
    }

    #[test]
    fn extended_requires_gestation_parameters() {
        let missing_t_0 = OrganismParams {
            t_0: None,
            ..extended_params()
        };
        assert!(matches!(
            Variant::resolve(ModelKind::Extended, organism(missing_t_0)),
            Err(ConfigurationError::MissingParameter("t_0"))
        ));

        let missing_e_hx = OrganismParams {
            e_hx: None,
            ..extended_params()
        };
        assert!(matches!(
            Variant::resolve(ModelKind::Extended, organism(missing_e_hx)),
            Err(ConfigurationError::MissingParameter("e_hx"))
        ));
    }

    #[test]
    fn extended_rejects_out_of_range_values() {
        let zero_t_0 = OrganismParams {
            t_0: Some(0.0),
            ..extended_params()
        };
        assert!(matches!(
            Variant::resolve(ModelKind::Extended, organism(zero_t_0)),
            Err(ConfigurationError::OutOfRange { name: "t_0", .. })
        ));

        let sour_milk = OrganismParams {
            f_milk: Some(0.0),
            ..extended_params()
        };
        assert!(matches!(
            Variant::resolve(ModelKind::Extended, organism(sour_milk)),
            Err(ConfigurationError::OutOfRange { name: "f_milk", .. })
        ));
    }

    #[test]
    fn stages_follow_thresholds() {
        let organism = organism(extended_params());
        let (extended, _) = Variant::resolve(ModelKind::Extended, organism.clone()).unwrap();
        let standard = Variant::Standard;

        assert_eq!(standard.stage(&organism, 0.0, 0.5), LifeStage::Embryo);
        assert_eq!(standard.stage(&organism, 0.0, 1.0), LifeStage::Juvenile);
        assert_eq!(standard.stage(&organism, 0.0, 5.0), LifeStage::Juvenile);
        assert_eq!(standard.stage(&organism, 0.0, 1000.0), LifeStage::Adult);

        assert_eq!(
            extended.stage(&organism, 49.0, 0.5),
            LifeStage::Fetus { gestating: false }
        );
        assert_eq!(
            extended.stage(&organism, 50.0, 0.5),
            LifeStage::Fetus { gestating: true }
        );
        assert_eq!(extended.stage(&organism, 60.0, 5.0), LifeStage::Suckling);
        assert_eq!(extended.stage(&organism, 60.0, 10.0), LifeStage::Juvenile);
        assert_eq!(extended.stage(&organism, 60.0, 2000.0), LifeStage::Adult);
    }
}
