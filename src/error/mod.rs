//! Error sets for model construction, compilation, integration and configuration

use thiserror::Error;


/// Error set for symbols that cannot be resolved or that collide inside a model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SymbolError {
    /// A symbol is free in a derivative expression but is neither a state variable,
    /// the stimulus, nor a constant with a value
    #[error("Unresolved symbol `{symbol}` in derivative `{derivative}`")]
    UnresolvedSymbol {
        /// Name of the offending symbol
        symbol: String,
        /// Label of the derivative expression the symbol was found in
        derivative: String,
    },
    /// The same symbol was declared twice (as two states or as two constants)
    #[error("Symbol `{0}` is declared more than once")]
    DuplicateSymbol(String),
    /// A symbol is declared both as a state variable and as a constant
    #[error("Symbol `{0}` cannot be both a state variable and a constant")]
    StateConstantConflict(String),
    /// The stimulus symbol is also declared as a state variable or constant
    #[error("Stimulus symbol `{0}` cannot also be a state variable or constant")]
    StimulusConflict(String),
    /// A unit label is attached to a symbol the model does not declare
    #[error("Unit given for `{0}`, which is not a state variable, constant or stimulus of the model")]
    UnknownUnitSymbol(String),
}

/// Error set for vectors or keys whose shape disagrees with the model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DimensionMismatchError {
    /// Initial state length does not match the number of state variables
    #[error("Initial state has {found} values but the model has {expected} state variables")]
    InitialState { expected: usize, found: usize },
    /// State vector passed to a derivative function has the wrong length
    #[error("State vector has {found} values but the model has {expected} state variables")]
    StateVector { expected: usize, found: usize },
    /// Steady state vector has the wrong length
    #[error("Steady state has {found} values but the model has {expected} state variables")]
    SteadyState { expected: usize, found: usize },
    /// Number of derivative labels does not match the number of derivative expressions
    #[error("Model has {expected} derivative expressions but {found} derivative names")]
    DerivativeNames { expected: usize, found: usize },
    /// A unit label is attached to a derivative index past the last state variable
    #[error("Unit given for derivative {index} but the model has {dimension} state variables")]
    UnitDerivative { index: usize, dimension: usize },
    /// A constant override refers to a symbol the model does not declare as a constant
    #[error("Constant override `{0}` is not a constant of the model")]
    UnknownOverride(String),
}

/// Error set for failures of the trajectory integrator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IntegrationError {
    /// Time points are empty, non finite, or not strictly monotonic
    #[error("Invalid time points: {0}")]
    InvalidTimePoints(String),
    /// Solver options are invalid
    #[error("Invalid integrator options: {0}")]
    InvalidOptions(String),
    /// Step budget exhausted before reaching the final time point
    #[error("Exceeded {max_steps} steps by t = {t}")]
    StepBudgetExceeded { max_steps: usize, t: f64 },
    /// Error control asked for a step too small to advance time
    #[error("Step size underflow at t = {0}")]
    StepSizeUnderflow(f64),
    /// Step size is repeatedly limited by stability rather than accuracy
    #[error("Problem appears stiff at t = {0}")]
    StiffnessDetected(f64),
    /// The state or the derivative became NaN or infinite
    #[error("Non finite state encountered at t = {0}")]
    NonFiniteState(f64),
}

/// Error set for loading and running configured simulations
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read or output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Configuration is not valid TOML for a simulation
    #[error("Cannot read config: {0}")]
    Parse(#[from] toml::de::Error),
    /// Trajectory could not be written as csv
    #[error("Cannot write csv: {0}")]
    Csv(#[from] csv::Error),
    /// No model is registered under the given name
    #[error("Unknown model `{0}`")]
    UnknownModel(String),
    /// Stimulus parameters are inconsistent
    #[error("Invalid stimulus: {0}")]
    InvalidStimulus(String),
    /// Time grid parameters are inconsistent
    #[error("Invalid time grid: {0}")]
    InvalidTimeGrid(String),
    /// Model has no steady state and no initial state was given
    #[error("Model `{0}` has no steady state, an initial state must be given")]
    MissingInitialState(String),
}

/// A set of errors that may occur when using the library
#[derive(Error, Debug)]
pub enum NeuroOdeError {
    /// Errors related to symbol resolution
    #[error("{0}")]
    SymbolRelatedError(#[from] SymbolError),
    /// Errors related to dimensions of states and constants
    #[error("{0}")]
    DimensionRelatedError(#[from] DimensionMismatchError),
    /// Errors related to numeric integration
    #[error("{0}")]
    IntegrationRelatedError(#[from] IntegrationError),
    /// Errors related to configuration and output
    #[error("{0}")]
    ConfigRelatedError(#[from] ConfigError),
}
