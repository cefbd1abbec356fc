//! Solvers for initial value problems: integrating `dy/dt = f(t, y)` forward
//! in time from a known state.
//!
//! # Solvers
//!
//! - [`dopri5`]: adaptive explicit Runge–Kutta of order 5(4)

pub mod dopri5;
