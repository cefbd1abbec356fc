use debsim_core::OdeSystem;
use ndarray::aview1;

use crate::{food::FoodFunction, organism::Organism, powers::Calculator, variant::Variant};

/// The state equations `d(E, V, E_H, E_R)/dt` of a model variant.
///
/// Each evaluation runs the power calculator on a single sample. It keeps no
/// state between calls, so integrators may evaluate it at any trial time.
#[derive(Clone, Copy)]
pub struct DerivativeFunction<'a> {
    organism: &'a Organism,
    variant: &'a Variant,
    calculator: Calculator<'a>,
}

impl<'a> DerivativeFunction<'a> {
    #[must_use]
    pub fn new(organism: &'a Organism, variant: &'a Variant, food: &'a dyn FoodFunction) -> Self {
        Self {
            organism,
            variant,
            calculator: Calculator::new(organism, variant, food),
        }
    }
}

impl OdeSystem<4> for DerivativeFunction<'_> {
    fn derivative(&self, t: f64, y: &[f64; 4]) -> [f64; 4] {
        let [e, v, e_h, _] = *y;

        let powers = self
            .calculator
            .powers(aview1(&[t]), aview1(&[e]), aview1(&[v]), aview1(&[e_h]));

        self.variant.rates(
            self.organism,
            powers.stages[0],
            v,
            powers.p_a[0],
            powers.p_c[0],
            powers.p_g[0],
            powers.p_r[0],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use ndarray::array;

    use crate::{
        food::Constant,
        organism::{OrganismParams, tests::params},
        variant::ModelKind,
    };

    fn resolve(kind: ModelKind, params: OrganismParams) -> (Organism, Variant) {
        let (variant, organism) =
            Variant::resolve(kind, Organism::new(params).unwrap()).unwrap();
        (organism, variant)
    }

    fn extended_params() -> OrganismParams {
        OrganismParams {
            e_hx: Some(10.0),
            t_0: Some(50.0),
            ..params()
        }
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn maturation_before_puberty() {
        let (organism, variant) = resolve(ModelKind::Standard, params());
        let food = Constant(1.0);
        let system = DerivativeFunction::new(&organism, &variant, &food);
        let calculator = Calculator::new(&organism, &variant, &food);

        let [e, v, e_h] = [500.0, 1.0, 100.0];
        let rates = system.derivative(0.0, &[e, v, e_h, 0.0]);
        let powers = calculator.powers(
            array![0.0].view(),
            array![e].view(),
            array![v].view(),
            array![e_h].view(),
        );

        assert_eq!(rates[0], powers.p_a[0] - powers.p_c[0]);
        assert_eq!(rates[1], powers.p_g[0] / organism.e_g);
        assert_eq!(rates[2], powers.p_r[0]);
        assert_eq!(rates[3], 0.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn reproduction_after_puberty() {
        let (organism, variant) = resolve(ModelKind::Standard, params());
        let food = Constant(1.0);
        let system = DerivativeFunction::new(&organism, &variant, &food);
        let calculator = Calculator::new(&organism, &variant, &food);

        let [e, v, e_h] = [500.0, 1.0, 2000.0];
        let rates = system.derivative(0.0, &[e, v, e_h, 3.0]);
        let powers = calculator.powers(
            array![0.0].view(),
            array![e].view(),
            array![v].view(),
            array![e_h].view(),
        );

        assert!(powers.p_r[0] >= 0.0);
        assert_eq!(rates[2], 0.0);
        assert_eq!(rates[3], organism.kap_r * powers.p_r[0]);
    }

    #[test]
    fn embryo_lives_off_reserve() {
        let (organism, variant) = resolve(ModelKind::Standard, params());
        let food = Constant(1.0);
        let system = DerivativeFunction::new(&organism, &variant, &food);

        let rates = system.derivative(0.0, &[organism.e_0, organism.v_0, 0.0, 0.0]);

        assert!(rates[0] < 0.0, "no assimilation before birth");
        assert!(rates[1] > 0.0);
        assert!(rates[2] > 0.0);
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn nothing_happens_before_gestation() {
        let (organism, variant) = resolve(ModelKind::Extended, extended_params());
        let food = Constant(1.0);
        let system = DerivativeFunction::new(&organism, &variant, &food);

        for t in [0.0, 10.0, 49.999] {
            assert_eq!(system.derivative(t, &[5.0, 1e-3, 0.5, 0.0]), [0.0; 4]);
        }
    }

    #[test]
    fn mother_supplies_reserve_during_gestation() {
        let (organism, variant) = resolve(ModelKind::Extended, extended_params());
        let food = Constant(1.0);
        let system = DerivativeFunction::new(&organism, &variant, &food);

        let v: f64 = 1e-3;
        let rates = system.derivative(50.0, &[5.0, v, 0.5, 0.0]);

        assert_relative_eq!(rates[0], organism.v * organism.e_m() * v.powf(2.0 / 3.0));
        assert_relative_eq!(rates[1], organism.v * v.powf(2.0 / 3.0));
        assert!(rates[2] > 0.0);
        assert_relative_eq!(rates[3], 0.0);
    }

    #[test]
    fn trial_times_need_not_be_monotonic() {
        let (organism, variant) = resolve(ModelKind::Standard, params());
        let food = |t: f64| if t < 100.0 { 1.0 } else { 0.5 };
        let system = DerivativeFunction::new(&organism, &variant, &food);

        let state = [50.0, 0.1, 10.0, 0.0];
        let early = system.derivative(10.0, &state);
        let late = system.derivative(500.0, &state);
        let early_again = system.derivative(10.0, &state);

        assert_eq!(early, early_again);
        assert!(late[0] < early[0]);
    }
}
