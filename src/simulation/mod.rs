//! Simulation requests bundling a model with its stimulus, overrides, initial state and
//! time grid, along with a parallel runner for independent requests

use std::{collections::HashMap, sync::Arc};
use rayon::prelude::*;
use tracing::info;
use crate::compiler::compile;
use crate::error::{ConfigError, DimensionMismatchError, NeuroOdeError};
use crate::integrator::{IntegratorOptions, integrate_with_options};
use crate::model::ModelDescriptor;
use crate::stimulus::{Constant, Stimulus};
use crate::symbolic::Symbol;
use crate::trajectory::Trajectory;


/// Output time points of a simulation
#[derive(Debug, Clone, PartialEq)]
pub enum TimeGrid {
    /// Evenly spaced points from `start` to `stop` inclusive, `stop` is included when it
    /// lies on the grid
    Uniform { start: f64, stop: f64, step: f64 },
    /// Explicit time points
    Points(Vec<f64>),
}

impl TimeGrid {
    /// Materializes the time points
    pub fn points(&self) -> Result<Vec<f64>, ConfigError> {
        match self {
            TimeGrid::Uniform { start, stop, step } => {
                if !(start.is_finite() && stop.is_finite() && step.is_finite()) || *step == 0. {
                    return Err(ConfigError::InvalidTimeGrid(
                        format!("start ({}), stop ({}) and step ({}) must be finite with a nonzero step", start, stop, step)
                    ));
                }
                if (stop - start) * step < 0. {
                    return Err(ConfigError::InvalidTimeGrid(
                        format!("step {} does not lead from {} to {}", step, start, stop)
                    ));
                }

                let intervals = ((stop - start) / step + 1e-9).floor() as usize;

                Ok((0..=intervals).map(|i| start + i as f64 * step).collect())
            },
            TimeGrid::Points(points) => Ok(points.clone()),
        }
    }
}

/// A single simulation run
#[derive(Clone)]
pub struct Simulation {
    pub descriptor: Arc<ModelDescriptor>,
    pub stimulus: Arc<dyn Stimulus>,
    pub overrides: HashMap<Symbol, f64>,
    /// Defaults to the model's steady state
    pub initial_state: Option<Vec<f64>>,
    pub time: TimeGrid,
    pub options: IntegratorOptions,
}

impl Simulation {
    /// Simulation of the model without stimulus and with default constants
    pub fn new(descriptor: Arc<ModelDescriptor>, time: TimeGrid) -> Self {
        Simulation {
            descriptor,
            stimulus: Arc::new(Constant::zero()),
            overrides: HashMap::new(),
            initial_state: None,
            time,
            options: IntegratorOptions::default(),
        }
    }

    pub fn with_stimulus<S: Stimulus + 'static>(mut self, stimulus: S) -> Self {
        self.stimulus = Arc::new(stimulus);

        self
    }

    pub fn with_override(mut self, symbol: &Symbol, value: f64) -> Self {
        self.overrides.insert(symbol.clone(), value);

        self
    }

    /// Overrides a constant by name, fails if the model has no such constant
    pub fn with_named_override(self, name: &str, value: f64) -> Result<Self, NeuroOdeError> {
        let symbol = self.descriptor.constant_symbol(name)
            .cloned()
            .ok_or_else(|| DimensionMismatchError::UnknownOverride(name.to_string()))?;

        Ok(self.with_override(&symbol, value))
    }

    pub fn with_initial_state(mut self, initial_state: Vec<f64>) -> Self {
        self.initial_state = Some(initial_state);

        self
    }

    pub fn with_options(mut self, options: IntegratorOptions) -> Self {
        self.options = options;

        self
    }

    /// Compiles the model and integrates it over the time grid
    pub fn run(&self) -> Result<Trajectory, NeuroOdeError> {
        let initial_state = match (&self.initial_state, self.descriptor.steady_state()) {
            (Some(state), _) => state.clone(),
            (None, Some(steady_state)) => steady_state.to_vec(),
            (None, None) => {
                return Err(ConfigError::MissingInitialState(self.descriptor.name().to_string()).into());
            },
        };
        let time_points = self.time.points()?;

        let f = compile(&self.descriptor, self.stimulus.clone(), &self.overrides)?;

        integrate_with_options(&f, &initial_state, &time_points, &self.options)
    }
}

/// Runs independent simulations in parallel, results are in the order of `simulations`
/// and each run fails or succeeds on its own
pub fn run_batch(simulations: &[Simulation]) -> Vec<Result<Trajectory, NeuroOdeError>> {
    info!("running {} simulations", simulations.len());

    simulations.par_iter()
        .map(|simulation| simulation.run())
        .collect()
}
