//! Numerical integrators for the debsim workspace.
//!
//! Solvers integrate any [`OdeSystem`] and report progress through an
//! [`Observer`], which may stop a run early.
//!
//! # Modules
//!
//! - [`transient`]: initial value problem integrators
//!
//! [`OdeSystem`]: debsim_core::OdeSystem
//! [`Observer`]: debsim_core::Observer

pub mod transient;
