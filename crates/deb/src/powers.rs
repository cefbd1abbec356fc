//! Vectorized power flows.
//!
//! Every method takes equal-length one-dimensional views and returns an array
//! of the same length. Stage-dependent formulas are driven by a per-sample
//! [`LifeStage`] array, so evaluating a single instant is just the
//! one-element case.
//!
//! Nothing here guards against degenerate state. A zero structure, for
//! example, makes mobilization infinite or NaN and the value is returned as
//! is.

use ndarray::{Array1, Array2, ArrayView1, Zip};

use crate::{
    food::FoodFunction,
    organism::Organism,
    stage::LifeStage,
    variant::{Allocation, Variant},
};

/// Computes power flows for one organism, variant and food function.
#[derive(Clone, Copy)]
pub struct Calculator<'a> {
    organism: &'a Organism,
    variant: &'a Variant,
    food: &'a dyn FoodFunction,
}

/// All seven power flows at a series of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerFlows {
    /// Life stage at each sample.
    pub stages: Array1<LifeStage>,
    /// Assimilation.
    pub p_a: Array1<f64>,
    /// Mobilization.
    pub p_c: Array1<f64>,
    /// Somatic maintenance.
    pub p_s: Array1<f64>,
    /// Growth.
    pub p_g: Array1<f64>,
    /// Maturity maintenance.
    pub p_j: Array1<f64>,
    /// Reproduction, or maturation before puberty.
    pub p_r: Array1<f64>,
    /// Dissipation.
    pub p_d: Array1<f64>,
}

impl<'a> Calculator<'a> {
    #[must_use]
    pub fn new(organism: &'a Organism, variant: &'a Variant, food: &'a dyn FoodFunction) -> Self {
        Self {
            organism,
            variant,
            food,
        }
    }

    /// Classifies every sample.
    #[must_use]
    pub fn stages(&self, t: ArrayView1<'_, f64>, e_h: ArrayView1<'_, f64>) -> Array1<LifeStage> {
        Zip::from(t)
            .and(e_h)
            .map_collect(|&t, &e_h| self.variant.stage(self.organism, t, e_h))
    }

    /// Assimilation `p_A`.
    ///
    /// Zero before birth, milk-driven while suckling, food-driven otherwise.
    #[must_use]
    pub fn assimilation(
        &self,
        stages: ArrayView1<'_, LifeStage>,
        v: ArrayView1<'_, f64>,
        t: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let food = self.food.food_series(t);
        Zip::from(stages)
            .and(&food)
            .and(v)
            .map_collect(|&stage, &f, &v| self.variant.assimilation(self.organism, stage, f, v))
    }

    /// Mobilization `p_C = E (e_g v V^(-1/3) + p_m) / (kappa E / V + e_g)`.
    #[must_use]
    pub fn mobilization(&self, e: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> Array1<f64> {
        let Organism {
            e_g,
            v: conductance,
            p_m,
            kappa,
            ..
        } = *self.organism;

        Zip::from(e).and(v).map_collect(|&e, &v| {
            e * (e_g * conductance * v.powf(-1.0 / 3.0) + p_m) / (kappa * e / v + e_g)
        })
    }

    /// Somatic maintenance `p_S = p_m V`.
    #[must_use]
    pub fn somatic_maintenance(&self, v: ArrayView1<'_, f64>) -> Array1<f64> {
        let p_m = self.organism.p_m;
        v.mapv(|v| p_m * v)
    }

    /// Growth `p_G`.
    #[must_use]
    pub fn growth(
        &self,
        stages: ArrayView1<'_, LifeStage>,
        p_c: ArrayView1<'_, f64>,
        p_s: ArrayView1<'_, f64>,
        v: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        Zip::from(stages)
            .and(p_c)
            .and(p_s)
            .and(v)
            .map_collect(|&stage, &p_c, &p_s, &v| {
                self.variant.growth(self.organism, stage, p_c, p_s, v)
            })
    }

    /// Maturity maintenance `p_J`, capped at the puberty level for adults.
    #[must_use]
    pub fn maturity_maintenance(
        &self,
        stages: ArrayView1<'_, LifeStage>,
        e_h: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let Organism { k_j, e_hp, .. } = *self.organism;

        Zip::from(stages).and(e_h).map_collect(|&stage, &e_h| {
            if stage.is_adult() {
                k_j * e_hp
            } else {
                k_j * e_h
            }
        })
    }

    /// Reproduction `p_R`.
    #[must_use]
    pub fn reproduction(
        &self,
        stages: ArrayView1<'_, LifeStage>,
        p_c: ArrayView1<'_, f64>,
        p_j: ArrayView1<'_, f64>,
        p_s: ArrayView1<'_, f64>,
        p_g: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        Zip::from(stages)
            .and(p_c)
            .and(p_j)
            .and(p_s)
            .and(p_g)
            .map_collect(|&stage, &p_c, &p_j, &p_s, &p_g| {
                let flows = Allocation { p_c, p_j, p_s, p_g };
                self.variant.reproduction(self.organism, stage, flows)
            })
    }

    /// Dissipation `p_D`.
    ///
    /// Adults only dissipate the share of `p_R` not fixed into offspring.
    #[must_use]
    pub fn dissipation(
        &self,
        stages: ArrayView1<'_, LifeStage>,
        p_s: ArrayView1<'_, f64>,
        p_j: ArrayView1<'_, f64>,
        p_r: ArrayView1<'_, f64>,
    ) -> Array1<f64> {
        let kap_r = self.organism.kap_r;

        Zip::from(stages)
            .and(p_s)
            .and(p_j)
            .and(p_r)
            .map_collect(|&stage, &p_s, &p_j, &p_r| {
                if stage.is_adult() {
                    p_s + p_j + (1.0 - kap_r) * p_r
                } else {
                    p_s + p_j + p_r
                }
            })
    }

    /// Mineral fluxes as a 4 × N matrix (rows CO2, H2O, O2, N-waste).
    ///
    /// # Panics
    ///
    /// Panics if the three inputs differ in length.
    #[must_use]
    pub fn mineral_fluxes(
        &self,
        p_a: ArrayView1<'_, f64>,
        p_d: ArrayView1<'_, f64>,
        p_g: ArrayView1<'_, f64>,
    ) -> Array2<f64> {
        assert!(
            p_d.len() == p_a.len() && p_g.len() == p_a.len(),
            "power series differ in length"
        );

        let powers = Array2::from_shape_fn((3, p_a.len()), |(row, j)| match row {
            0 => p_a[j],
            1 => p_d[j],
            _ => p_g[j],
        });
        self.organism.yields().dot(&powers)
    }

    /// Computes every power flow from a series of states.
    #[must_use]
    pub fn powers(
        &self,
        t: ArrayView1<'_, f64>,
        e: ArrayView1<'_, f64>,
        v: ArrayView1<'_, f64>,
        e_h: ArrayView1<'_, f64>,
    ) -> PowerFlows {
        let stages = self.stages(t, e_h);
        let p_a = self.assimilation(stages.view(), v, t);
        let p_c = self.mobilization(e, v);
        let p_s = self.somatic_maintenance(v);
        let p_g = self.growth(stages.view(), p_c.view(), p_s.view(), v);
        let p_j = self.maturity_maintenance(stages.view(), e_h);
        let p_r = self.reproduction(
            stages.view(),
            p_c.view(),
            p_j.view(),
            p_s.view(),
            p_g.view(),
        );
        let p_d = self.dissipation(stages.view(), p_s.view(), p_j.view(), p_r.view());

        PowerFlows {
            stages,
            p_a,
            p_c,
            p_s,
            p_g,
            p_j,
            p_r,
            p_d,
        }
    }
}
