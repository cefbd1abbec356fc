use ndarray::{Array1, Array2, ArrayView1};
use tracing::{debug, warn};

use crate::{
    error::InvalidInput,
    model::Model,
    organism::Organism,
    powers::{Calculator, PowerFlows},
    variant::ModelKind,
};

/// A mineral row of the flux matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mineral {
    CarbonDioxide,
    Water,
    Oxygen,
    NitrogenWaste,
}

impl Mineral {
    /// Row index in the mineral flux matrix.
    #[must_use]
    pub fn row(self) -> usize {
        match self {
            Self::CarbonDioxide => 0,
            Self::Water => 1,
            Self::Oxygen => 2,
            Self::NitrogenWaste => 3,
        }
    }
}

/// Times at which maturity first exceeded each threshold.
///
/// A time is `None` if the threshold was never crossed within the simulated
/// span, or, for weaning, if the organism defines no weaning maturity.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Transitions {
    pub birth: Option<f64>,
    pub weaning: Option<f64>,
    pub puberty: Option<f64>,
}

impl Transitions {
    /// Scans samples in time order for the first one whose maturity is
    /// strictly above each threshold.
    ///
    /// Each threshold has its own detector, so one sample can record several
    /// transitions.
    #[must_use]
    pub fn detect(organism: &Organism, t: ArrayView1<'_, f64>, e_h: ArrayView1<'_, f64>) -> Self {
        let mut transitions = Self::default();

        for (&t, &e_h) in t.iter().zip(e_h.iter()) {
            if transitions.birth.is_none() && e_h > organism.e_hb {
                transitions.birth = Some(t);
            }
            if let Some(e_hx) = organism.e_hx
                && transitions.weaning.is_none()
                && e_h > e_hx
            {
                transitions.weaning = Some(t);
            }
            if transitions.puberty.is_none() && e_h > organism.e_hp {
                transitions.puberty = Some(t);
            }
        }

        transitions
    }
}

/// A simulated trajectory with every derived quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Model variant that produced the trajectory.
    pub kind: ModelKind,
    /// Sample times.
    pub t: Array1<f64>,
    /// Reserve.
    pub e: Array1<f64>,
    /// Structural volume.
    pub v: Array1<f64>,
    /// Maturity.
    pub e_h: Array1<f64>,
    /// Reproduction buffer.
    pub e_r: Array1<f64>,
    /// Power flows at each sample.
    pub powers: PowerFlows,
    /// Mineral fluxes, 4 × N; see [`Mineral`] for the rows.
    pub mineral_fluxes: Array2<f64>,
    pub transitions: Transitions,
}

impl Solution {
    /// Reconstructs the derived series for the model's stored run.
    ///
    /// The result depends only on the stored trajectory, food function and
    /// organism, so calling this twice gives identical arrays.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInput::NotSimulated`] if the model has no run.
    pub fn new(model: &Model) -> Result<Self, InvalidInput> {
        let run = model.run().ok_or(InvalidInput::NotSimulated)?;
        let trajectory = &run.trajectory;
        let organism = model.organism();

        let calculator = Calculator::new(organism, model.variant(), run.food.as_ref());
        let powers = calculator.powers(
            trajectory.t.view(),
            trajectory.e.view(),
            trajectory.v.view(),
            trajectory.e_h.view(),
        );
        let mineral_fluxes =
            calculator.mineral_fluxes(powers.p_a.view(), powers.p_d.view(), powers.p_g.view());

        let non_finite = [
            &powers.p_a,
            &powers.p_c,
            &powers.p_s,
            &powers.p_g,
            &powers.p_j,
            &powers.p_r,
            &powers.p_d,
        ]
        .into_iter()
        .flatten()
        .filter(|p| !p.is_finite())
        .count();
        if non_finite > 0 {
            warn!(non_finite, "reconstructed powers contain non-finite values");
        }

        let transitions = Transitions::detect(organism, trajectory.t.view(), trajectory.e_h.view());
        debug!(
            birth = ?transitions.birth,
            weaning = ?transitions.weaning,
            puberty = ?transitions.puberty,
            "detected transitions"
        );

        Ok(Self {
            kind: model.kind(),
            t: trajectory.t.clone(),
            e: trajectory.e.clone(),
            v: trajectory.v.clone(),
            e_h: trajectory.e_h.clone(),
            e_r: trajectory.e_r.clone(),
            powers,
            mineral_fluxes,
            transitions,
        })
    }

    /// Returns the number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.t.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    /// Returns the flux of one mineral over time.
    #[must_use]
    pub fn mineral(&self, mineral: Mineral) -> ArrayView1<'_, f64> {
        self.mineral_fluxes.row(mineral.row())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ndarray::array;

    use crate::{
        food::Constant,
        model::{InitialState, StepSize},
        organism::{OrganismParams, tests::params},
    };

    #[test]
    fn requires_a_run() {
        let model = Model::standard(Organism::new(params()).unwrap()).unwrap();
        assert_eq!(Solution::new(&model), Err(InvalidInput::NotSimulated));
    }

    #[test]
    fn detectors_are_independent() {
        let organism = Organism::new(OrganismParams {
            e_hx: Some(10.0),
            ..params()
        })
        .unwrap();

        // One sample jumps past birth and weaning at once.
        let t = array![0.0, 1.0, 2.0, 3.0, 4.0];
        let e_h = array![0.0, 1.0, 50.0, 1000.0, 1200.0];
        let transitions = Transitions::detect(&organism, t.view(), e_h.view());

        assert_eq!(
            transitions,
            Transitions {
                birth: Some(2.0),
                weaning: Some(2.0),
                puberty: Some(4.0),
            }
        );
    }

    #[test]
    fn thresholds_are_exclusive() {
        let organism = Organism::new(params()).unwrap();

        let t = array![0.0, 1.0];
        let e_h = array![1.0, 1000.0];
        let transitions = Transitions::detect(&organism, t.view(), e_h.view());

        assert_eq!(transitions.birth, Some(1.0));
        assert_eq!(transitions.weaning, None);
        assert_eq!(transitions.puberty, None);
    }

    #[test]
    fn reconstruction_is_idempotent() {
        let mut model = Model::standard(Organism::new(params()).unwrap()).unwrap();
        model
            .simulate(Constant(0.8), (0.0, 50.0), StepSize::Auto, InitialState::Birth)
            .unwrap();

        let first = Solution::new(&model).unwrap();
        let second = Solution::new(&model).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.len(), model.trajectory().unwrap().len());
        assert_eq!(first.mineral_fluxes.dim(), (4, first.len()));
        assert_eq!(first.mineral(Mineral::Oxygen), first.mineral_fluxes.row(2));
    }
}
