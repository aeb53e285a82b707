//! # Neuro ODE
//!
//! `neuro_ode` builds conductance based neuron models as symbolic systems of ordinary
//! differential equations and simulates them.
//!
//! A model is described once as a [`model::ModelDescriptor`]: state variables, symbolic
//! derivative expressions, named constants with defaults and an optional stimulus input.
//! A descriptor is compiled with a [`stimulus::Stimulus`] and constant overrides into a
//! numeric derivative function, which the adaptive integrator turns into a
//! [`trajectory::Trajectory`].
//!
//! ```rust
//! use std::collections::HashMap;
//! use neuro_ode::{
//!     analysis::spike_times,
//!     compiler::compile,
//!     integrator::integrate,
//!     neuron::hodgkin_huxley::hodgkin_huxley,
//!     stimulus::Constant,
//! };
//!
//! let model = hodgkin_huxley().unwrap();
//! let f = compile(&model, Constant::new(10.), &HashMap::new()).unwrap();
//!
//! let times: Vec<f64> = (0..=2000).map(|i| i as f64 * 0.025).collect();
//! let trajectory = integrate(&f, model.steady_state().unwrap(), &times).unwrap();
//!
//! let spikes = spike_times(&trajectory, 0, 0.).unwrap();
//! assert!(!spikes.is_empty());
//! ```
//!
//! Models available out of the box are in [`neuron`], and [`config`] describes a whole
//! simulation as a TOML file for the `neuro_ode` binary.

pub mod analysis;
pub mod compiler;
pub mod config;
pub mod error;
pub mod integrator;
pub mod model;
pub mod neuron;
pub mod simulation;
pub mod stimulus;
pub mod symbolic;
pub mod trajectory;
