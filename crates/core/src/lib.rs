//! Core traits shared across the debsim workspace.
//!
//! This crate defines the abstractions that solvers and models build on:
//!
//! - [`OdeSystem`]: a first-order system `dy/dt = f(t, y)` with `N` states
//! - [`Observer`]: receives solver events and optionally returns control actions

mod observer;
mod system;

pub use observer::Observer;
pub use system::OdeSystem;
