//! Raises the `shark` preset on abundant food and logs its life history.
//!
//! Run with `RUST_LOG=debug` to also see the solver setup and transitions as
//! they are detected.

use std::error::Error;

use debsim::{InitialState, Mineral, Model, Presets, StepSize, food::Constant};
use tracing::info;

fn main() -> Result<(), Box<dyn Error>> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init();

    let shark = Presets::builtin().organism("shark")?;
    let mut model = Model::standard(shark)?;
    model.simulate(
        Constant(1.0),
        (0.0, 20000.0),
        StepSize::Fixed(10.0),
        InitialState::Birth,
    )?;

    let solution = model.reconstruct()?;
    let transitions = solution.transitions;
    info!(
        birth = ?transitions.birth,
        puberty = ?transitions.puberty,
        "life history"
    );

    let last = solution.len() - 1;
    info!(
        t = solution.t[last],
        reserve = solution.e[last],
        structure = solution.v[last],
        maturity = solution.e_h[last],
        reproduction_buffer = solution.e_r[last],
        "final state"
    );
    info!(
        assimilation = solution.powers.p_a[last],
        dissipation = solution.powers.p_d[last],
        growth = solution.powers.p_g[last],
        oxygen = solution.mineral(Mineral::Oxygen)[last],
        carbon_dioxide = solution.mineral(Mineral::CarbonDioxide)[last],
        "final fluxes"
    );

    Ok(())
}
