//! TOML description of a single simulation, read by the `neuro_ode` binary
//!
//! ```toml
//! [simulation]
//! model = "hodgkin_huxley"
//! output = "hodgkin_huxley.csv"
//!
//! [simulation.time]
//! start = 0.0
//! stop = 100.0
//! step = 0.01
//!
//! [simulation.stimulus]
//! type = "pulse"
//! amplitude = 10.0
//! start = 10.0
//! duration = 1.0
//!
//! [simulation.constants]
//! g_Na = 110.0
//! ```

use std::{collections::HashMap, fs::read_to_string, path::Path, str::FromStr, sync::Arc};
use serde::Deserialize;
use tracing::debug;
use crate::error::{ConfigError, NeuroOdeError};
use crate::integrator::IntegratorOptions;
use crate::neuron::model_by_name;
use crate::simulation::{Simulation, TimeGrid};
use crate::stimulus::{
    Constant, NoiseParameters, NoisyStimulus, Pulse, PulseTrain, Sinusoid, Step, Stimulus,
};


fn default_output() -> String {
    String::from("trajectory.csv")
}

/// Root of a configuration file
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationConfig {
    pub simulation: SimulationTable,
}

/// The `[simulation]` table
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationTable {
    /// Model name, see [`crate::neuron::model_by_name`]
    pub model: String,
    /// Path of the csv output
    #[serde(default = "default_output")]
    pub output: String,
    /// Defaults to the steady state of the model
    #[serde(default)]
    pub initial_state: Option<Vec<f64>>,
    pub time: TimeConfig,
    #[serde(default)]
    pub stimulus: StimulusConfig,
    /// Constant overrides by name
    #[serde(default)]
    pub constants: HashMap<String, f64>,
    #[serde(default)]
    pub solver: IntegratorOptions,
    /// Voltage a peak must exceed to be counted as a spike
    #[serde(default)]
    pub spike_threshold: f64,
}

/// The `[simulation.time]` table, either `stop` and `step` or explicit `points`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TimeConfig {
    #[serde(default)]
    pub start: f64,
    pub stop: Option<f64>,
    pub step: Option<f64>,
    pub points: Option<Vec<f64>>,
}

impl TimeConfig {
    pub fn grid(&self) -> Result<TimeGrid, ConfigError> {
        match (&self.points, self.stop, self.step) {
            (Some(points), None, None) => Ok(TimeGrid::Points(points.clone())),
            (None, Some(stop), Some(step)) => Ok(TimeGrid::Uniform { start: self.start, stop, step }),
            (Some(_), _, _) => Err(ConfigError::InvalidTimeGrid(
                String::from("`points` cannot be combined with `stop` or `step`")
            )),
            (None, _, _) => Err(ConfigError::InvalidTimeGrid(
                String::from("either `points` or both `stop` and `step` must be given")
            )),
        }
    }
}

/// The `[simulation.stimulus]` table, selected by its `type` key
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StimulusConfig {
    Constant {
        #[serde(default)]
        amplitude: f64,
    },
    Step {
        amplitude: f64,
        #[serde(default)]
        onset: f64,
    },
    Pulse {
        amplitude: f64,
        start: f64,
        duration: f64,
    },
    PulseTrain {
        amplitude: f64,
        #[serde(default)]
        start: f64,
        duration: f64,
        period: f64,
        count: Option<usize>,
    },
    #[serde(rename = "sine")]
    Sinusoid {
        amplitude: f64,
        frequency: f64,
        #[serde(default)]
        phase: f64,
        #[serde(default)]
        offset: f64,
    },
    /// Gaussian noise added to `base` (no current if missing), redrawn every `dt`
    Noisy {
        base: Option<Box<StimulusConfig>>,
        #[serde(default)]
        mean: f64,
        std: f64,
        min: Option<f64>,
        max: Option<f64>,
        #[serde(default)]
        seed: u64,
        dt: f64,
    },
}

impl Default for StimulusConfig {
    fn default() -> Self {
        StimulusConfig::Constant { amplitude: 0. }
    }
}

impl StimulusConfig {
    /// Builds the stimulus, `window` is the time span noise is drawn over
    pub fn build(&self, window: (f64, f64)) -> Result<Box<dyn Stimulus>, ConfigError> {
        let stimulus: Box<dyn Stimulus> = match self {
            StimulusConfig::Constant { amplitude } => Box::new(Constant::new(*amplitude)),
            StimulusConfig::Step { amplitude, onset } => {
                Box::new(Step { amplitude: *amplitude, onset: *onset })
            },
            StimulusConfig::Pulse { amplitude, start, duration } => {
                if !(*duration >= 0.) {
                    return Err(ConfigError::InvalidStimulus(
                        format!("pulse duration must not be negative, got {}", duration)
                    ));
                }

                Box::new(Pulse { amplitude: *amplitude, start: *start, duration: *duration })
            },
            StimulusConfig::PulseTrain { amplitude, start, duration, period, count } => {
                Box::new(PulseTrain::new(*amplitude, *start, *duration, *period, *count)?)
            },
            StimulusConfig::Sinusoid { amplitude, frequency, phase, offset } => {
                Box::new(Sinusoid { amplitude: *amplitude, frequency: *frequency, phase: *phase, offset: *offset })
            },
            StimulusConfig::Noisy { base, mean, std, min, max, seed, dt } => {
                let base = match base {
                    Some(base) => base.build(window)?,
                    None => Box::new(Constant::zero()),
                };
                let noise = NoiseParameters {
                    mean: *mean,
                    std: *std,
                    min: min.unwrap_or(f64::NEG_INFINITY),
                    max: max.unwrap_or(f64::INFINITY),
                };

                Box::new(NoisyStimulus::new(base, noise, window.0, window.1, *dt, *seed)?)
            },
        };

        Ok(stimulus)
    }
}

impl FromStr for SimulationConfig {
    type Err = ConfigError;

    fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

impl SimulationConfig {
    /// Reads a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = read_to_string(path)?;

        content.parse()
    }

    /// Resolves the model and stimulus and assembles the simulation
    pub fn to_simulation(&self) -> Result<Simulation, NeuroOdeError> {
        let table = &self.simulation;

        let descriptor = Arc::new(model_by_name(&table.model)?);
        let grid = table.time.grid()?;
        let points = grid.points()?;

        let window = points.iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), t| (low.min(*t), high.max(*t)));
        let window = if points.is_empty() { (0., 0.) } else { window };

        let mut simulation = Simulation::new(descriptor, grid)
            .with_stimulus(table.stimulus.build(window)?)
            .with_options(table.solver);

        for (name, value) in &table.constants {
            simulation = simulation.with_named_override(name, *value)?;
        }
        if let Some(initial_state) = &table.initial_state {
            simulation = simulation.with_initial_state(initial_state.clone());
        }

        debug!(
            "configured `{}` over {} time points with {} overrides",
            table.model, points.len(), table.constants.len(),
        );

        Ok(simulation)
    }
}

#[cfg(test)]
mod tests {
    use super::{SimulationConfig, StimulusConfig, TimeConfig};
    use crate::simulation::TimeGrid;


    #[test]
    fn test_minimal_config() {
        let config: SimulationConfig = "
            [simulation]
            model = \"hh\"

            [simulation.time]
            stop = 10.0
            step = 0.5
        ".parse().unwrap();

        assert_eq!(config.simulation.output, "trajectory.csv");
        assert_eq!(config.simulation.stimulus, StimulusConfig::Constant { amplitude: 0. });
        assert_eq!(
            config.simulation.time.grid().unwrap(),
            TimeGrid::Uniform { start: 0., stop: 10., step: 0.5 },
        );
        assert_eq!(config.simulation.solver.rtol, 1e-6);
        assert!(config.simulation.constants.is_empty());
    }

    #[test]
    fn test_stimulus_tables() {
        let config: SimulationConfig = "
            [simulation]
            model = \"erisir\"

            [simulation.time]
            points = [0.0, 1.0, 2.0]

            [simulation.stimulus]
            type = \"noisy\"
            std = 0.5
            seed = 3
            dt = 0.1
            base = { type = \"pulse_train\", amplitude = 4.0, duration = 1.0, period = 5.0 }

            [simulation.solver]
            max_steps = 500
        ".parse().unwrap();

        match &config.simulation.stimulus {
            StimulusConfig::Noisy { base: Some(base), seed, .. } => {
                assert_eq!(*seed, 3);
                assert!(matches!(**base, StimulusConfig::PulseTrain { count: None, .. }));
            },
            other => panic!("unexpected stimulus: {:?}", other),
        }
        assert_eq!(config.simulation.solver.max_steps, 500);
        assert_eq!(config.simulation.solver.atol, 1e-8);
        assert!(config.simulation.stimulus.build((0., 2.)).is_ok());
    }

    #[test]
    fn test_time_table_conflicts() {
        let both = TimeConfig { points: Some(vec![0., 1.]), stop: Some(1.), ..TimeConfig::default() };
        assert!(both.grid().is_err());

        let missing_step = TimeConfig { stop: Some(1.), ..TimeConfig::default() };
        assert!(missing_step.grid().is_err());
    }

    #[test]
    fn test_unknown_stimulus_type() {
        let result = "
            [simulation]
            model = \"hh\"

            [simulation.time]
            stop = 1.0
            step = 0.1

            [simulation.stimulus]
            type = \"sawtooth\"
        ".parse::<SimulationConfig>();

        assert!(result.is_err());
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let valid = "
            [simulation]
            model = \"hh\"
            spike_threshold = 10.0

            [simulation.time]
            stop = 1.0
            step = 0.1

            [simulation.solver]
            rtol = 1e-9
        ";
        assert!(valid.parse::<SimulationConfig>().is_ok());

        for (key, typo) in [("spike_threshold", "spike_treshold"), ("step", "stpe"), ("rtol", "rtoll")] {
            let config = valid.replace(&format!("{} =", key), &format!("{} =", typo));
            assert!(config.parse::<SimulationConfig>().is_err(), "accepted {}", typo);
        }
    }
}
