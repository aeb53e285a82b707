//! The model descriptor, an immutable symbolic description of a neuron as a system of
//! ordinary differential equations, along with a builder that checks the descriptor
//! is well formed before handing it out.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;
use crate::error::{DimensionMismatchError, NeuroOdeError, SymbolError};
use crate::symbolic::{Expr, Symbol};


/// Key used to attach an informational unit label to part of a model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitKey {
    /// Unit of a state variable, constant or stimulus symbol
    Symbol(Symbol),
    /// Unit of the derivative at the given index
    Derivative(usize),
}

/// Raw parts of a model descriptor, validated by [`ModelDescriptor::from_parts`]
#[derive(Debug, Clone, Default)]
pub struct ModelParts {
    /// Display name
    pub name: String,
    /// Human readable label for each derivative
    pub derivative_names: Vec<String>,
    /// Derivative of each state variable, in state order
    pub derivative_expressions: Vec<Expr>,
    /// State variable layout
    pub state_symbols: Vec<Symbol>,
    /// Constants with their default value, `None` when the value must be given at compile time
    pub constants: Vec<(Symbol, Option<f64>)>,
    /// Externally injected current
    pub stimulus_symbol: Option<Symbol>,
    /// Informational unit labels
    pub units: Vec<(UnitKey, String)>,
    /// Known equilibrium of the model
    pub steady_state: Option<Vec<f64>>,
}

/// Symbolic specification of a neuron model, `derivative_expressions()[i]` is the
/// derivative of `state_symbols()[i]` with respect to time
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDescriptor {
    name: String,
    derivative_names: Vec<String>,
    derivative_expressions: Vec<Expr>,
    state_symbols: Vec<Symbol>,
    constants: BTreeMap<Symbol, Option<f64>>,
    stimulus_symbol: Option<Symbol>,
    units: BTreeMap<UnitKey, String>,
    steady_state: Option<Vec<f64>>,
}

fn check_unique<'a, I: IntoIterator<Item = &'a Symbol>>(
    symbols: I
) -> Result<BTreeSet<Symbol>, SymbolError> {
    let mut seen = BTreeSet::new();
    for symbol in symbols {
        if !seen.insert(symbol.clone()) {
            return Err(SymbolError::DuplicateSymbol(symbol.name().to_string()));
        }
    }

    Ok(seen)
}

impl ModelDescriptor {
    /// Checks the given parts and assembles a descriptor, every symbol free in a derivative
    /// expression must be a state variable, a declared constant or the stimulus
    pub fn from_parts(parts: ModelParts) -> Result<Self, NeuroOdeError> {
        let dimension = parts.derivative_expressions.len();

        if parts.derivative_names.len() != dimension {
            return Err(DimensionMismatchError::DerivativeNames {
                expected: dimension,
                found: parts.derivative_names.len(),
            }.into());
        }
        if parts.state_symbols.len() != dimension {
            return Err(DimensionMismatchError::StateVector {
                expected: dimension,
                found: parts.state_symbols.len(),
            }.into());
        }
        if let Some(steady_state) = &parts.steady_state {
            if steady_state.len() != dimension {
                return Err(DimensionMismatchError::SteadyState {
                    expected: dimension,
                    found: steady_state.len(),
                }.into());
            }
        }

        let states = check_unique(&parts.state_symbols)?;
        let constant_symbols = check_unique(parts.constants.iter().map(|(symbol, _)| symbol))?;

        if let Some(conflict) = states.intersection(&constant_symbols).next() {
            return Err(SymbolError::StateConstantConflict(conflict.name().to_string()).into());
        }
        if let Some(stimulus) = &parts.stimulus_symbol {
            if states.contains(stimulus) || constant_symbols.contains(stimulus) {
                return Err(SymbolError::StimulusConflict(stimulus.name().to_string()).into());
            }
        }

        for (label, expr) in parts.derivative_names.iter().zip(parts.derivative_expressions.iter()) {
            let unresolved = expr.free_symbols()
                .into_iter()
                .find(|symbol| {
                    !states.contains(symbol) &&
                    !constant_symbols.contains(symbol) &&
                    parts.stimulus_symbol.as_ref() != Some(symbol)
                });

            if let Some(symbol) = unresolved {
                return Err(SymbolError::UnresolvedSymbol {
                    symbol: symbol.name().to_string(),
                    derivative: label.clone(),
                }.into());
            }
        }

        for (key, _) in &parts.units {
            match key {
                UnitKey::Derivative(index) if *index >= dimension => {
                    return Err(DimensionMismatchError::UnitDerivative { index: *index, dimension }.into());
                },
                UnitKey::Symbol(symbol) if !states.contains(symbol) &&
                    !constant_symbols.contains(symbol) &&
                    parts.stimulus_symbol.as_ref() != Some(symbol) => {
                    return Err(SymbolError::UnknownUnitSymbol(symbol.name().to_string()).into());
                },
                _ => {},
            }
        }

        debug!(
            "built model `{}` with {} state variables and {} constants",
            parts.name, dimension, parts.constants.len(),
        );

        Ok(
            ModelDescriptor {
                name: parts.name,
                derivative_names: parts.derivative_names,
                derivative_expressions: parts.derivative_expressions,
                state_symbols: parts.state_symbols,
                constants: parts.constants.into_iter().collect(),
                stimulus_symbol: parts.stimulus_symbol,
                units: parts.units.into_iter().collect(),
                steady_state: parts.steady_state,
            }
        )
    }

    /// Display name of the model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of state variables
    pub fn dimension(&self) -> usize {
        self.state_symbols.len()
    }

    pub fn derivative_names(&self) -> &[String] {
        &self.derivative_names
    }

    pub fn derivative_expressions(&self) -> &[Expr] {
        &self.derivative_expressions
    }

    pub fn state_symbols(&self) -> &[Symbol] {
        &self.state_symbols
    }

    /// Constant symbols and their defaults
    pub fn constants(&self) -> &BTreeMap<Symbol, Option<f64>> {
        &self.constants
    }

    pub fn stimulus_symbol(&self) -> Option<&Symbol> {
        self.stimulus_symbol.as_ref()
    }

    pub fn units(&self) -> &BTreeMap<UnitKey, String> {
        &self.units
    }

    /// Unit label attached to the given key, if any
    pub fn unit(&self, key: &UnitKey) -> Option<&str> {
        self.units.get(key).map(|unit| unit.as_str())
    }

    /// Known equilibrium, usable as an initial state
    pub fn steady_state(&self) -> Option<&[f64]> {
        self.steady_state.as_deref()
    }

    /// Index of a state variable in the state vector
    pub fn state_index(&self, symbol: &Symbol) -> Option<usize> {
        self.state_symbols.iter().position(|i| i == symbol)
    }

    /// Looks up a declared constant by name
    pub fn constant_symbol(&self, name: &str) -> Option<&Symbol> {
        self.constants.keys().find(|symbol| symbol.name() == name)
    }

    /// Names of the state variables in state order
    pub fn state_labels(&self) -> Vec<String> {
        self.state_symbols.iter()
            .map(|symbol| symbol.name().to_string())
            .collect()
    }

    /// Default constants merged with the given overrides, overrides win, fails if an
    /// override is not a declared constant
    pub fn resolve_constants(
        &self,
        overrides: &HashMap<Symbol, f64>
    ) -> Result<HashMap<Symbol, f64>, DimensionMismatchError> {
        if let Some(unknown) = overrides.keys().find(|symbol| !self.constants.contains_key(*symbol)) {
            return Err(DimensionMismatchError::UnknownOverride(unknown.name().to_string()));
        }

        let mut values: HashMap<Symbol, f64> = self.constants.iter()
            .filter_map(|(symbol, default)| default.map(|value| (symbol.clone(), value)))
            .collect();
        values.extend(overrides.iter().map(|(symbol, value)| (symbol.clone(), *value)));

        Ok(values)
    }
}

/// Builds a [`ModelDescriptor`] one state variable at a time
///
/// ```rust
/// use neuro_ode::{model::ModelBuilder, symbolic::Symbol};
///
/// let x = Symbol::new("x");
/// let a = Symbol::new("a");
///
/// let decay = ModelBuilder::new("decay")
///     .state(&x, "x / dt", -(&a * &x))
///     .constant(&a, 1.)
///     .build()
///     .unwrap();
///
/// assert_eq!(decay.dimension(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    parts: ModelParts,
}

impl ModelBuilder {
    pub fn new(name: &str) -> Self {
        ModelBuilder {
            parts: ModelParts { name: name.to_string(), ..ModelParts::default() },
        }
    }

    /// Appends a state variable, its derivative label and its derivative expression
    pub fn state(mut self, symbol: &Symbol, derivative_name: &str, derivative: Expr) -> Self {
        self.parts.state_symbols.push(symbol.clone());
        self.parts.derivative_names.push(derivative_name.to_string());
        self.parts.derivative_expressions.push(derivative);

        self
    }

    /// Declares a constant with a default value
    pub fn constant(mut self, symbol: &Symbol, default: f64) -> Self {
        self.parts.constants.push((symbol.clone(), Some(default)));

        self
    }

    /// Declares a constant that has no default and must be overridden when compiling
    pub fn required_constant(mut self, symbol: &Symbol) -> Self {
        self.parts.constants.push((symbol.clone(), None));

        self
    }

    /// Sets the symbol representing injected current
    pub fn stimulus(mut self, symbol: &Symbol) -> Self {
        self.parts.stimulus_symbol = Some(symbol.clone());

        self
    }

    /// Attaches a unit label
    pub fn unit(mut self, key: UnitKey, unit: &str) -> Self {
        self.parts.units.push((key, unit.to_string()));

        self
    }

    /// Sets the known equilibrium of the model
    pub fn steady_state(mut self, values: Vec<f64>) -> Self {
        self.parts.steady_state = Some(values);

        self
    }

    pub fn build(self) -> Result<ModelDescriptor, NeuroOdeError> {
        ModelDescriptor::from_parts(self.parts)
    }
}
