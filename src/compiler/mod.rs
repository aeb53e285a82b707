//! Turns a symbolic [`ModelDescriptor`] into a numeric derivative function by fixing
//! its constants, binding a stimulus and lowering every derivative expression into
//! a tree of closures.

use std::collections::HashMap;
use tracing::debug;
use crate::error::{DimensionMismatchError, NeuroOdeError, SymbolError};
use crate::integrator::DerivativeFunction;
use crate::model::ModelDescriptor;
use crate::stimulus::Stimulus;
use crate::symbolic::{Expr, Function, Op, Symbol};


type Lowered = Box<dyn Fn(&[f64], f64) -> f64 + Send + Sync>;

#[derive(Debug, Clone, Copy)]
enum Slot {
    State(usize),
    Stimulus,
}

fn lower(expr: &Expr, slots: &HashMap<Symbol, Slot>, derivative: &str) -> Result<Lowered, SymbolError> {
    let lowered: Lowered = match expr {
        Expr::Number(x) => {
            let x = *x;
            Box::new(move |_, _| x)
        },
        Expr::Name(symbol) => match slots.get(symbol) {
            Some(Slot::State(i)) => {
                let i = *i;
                Box::new(move |y, _| y[i])
            },
            Some(Slot::Stimulus) => Box::new(|_, stimulus| stimulus),
            None => {
                return Err(SymbolError::UnresolvedSymbol {
                    symbol: symbol.name().to_string(),
                    derivative: derivative.to_string(),
                });
            }
        },
        Expr::UnaryMinus(inner) => {
            let inner = lower(inner, slots, derivative)?;
            Box::new(move |y, s| -inner(y, s))
        },
        Expr::BinOp { lhs, op: Op::Power, rhs } if is_integral(rhs) => {
            let base = lower(lhs, slots, derivative)?;
            let exponent = rhs.as_number().unwrap_or(1.) as i32;
            Box::new(move |y, s| base(y, s).powi(exponent))
        },
        Expr::BinOp { lhs, op, rhs } => {
            let lhs = lower(lhs, slots, derivative)?;
            let rhs = lower(rhs, slots, derivative)?;
            match op {
                Op::Add => Box::new(move |y, s| lhs(y, s) + rhs(y, s)),
                Op::Subtract => Box::new(move |y, s| lhs(y, s) - rhs(y, s)),
                Op::Multiply => Box::new(move |y, s| lhs(y, s) * rhs(y, s)),
                Op::Divide => Box::new(move |y, s| lhs(y, s) / rhs(y, s)),
                Op::Power => Box::new(move |y, s| lhs(y, s).powf(rhs(y, s))),
            }
        },
        Expr::Function { function: Function::Exp, arg } => {
            let arg = lower(arg, slots, derivative)?;
            Box::new(move |y, s| arg(y, s).exp())
        },
    };

    Ok(lowered)
}

fn is_integral(expr: &Expr) -> bool {
    match expr.as_number() {
        Some(x) => x.fract() == 0. && x.abs() <= i32::MAX as f64,
        None => false,
    }
}

/// Numeric right hand side `f(state, t)` of a compiled model
///
/// Holds only numbers and the bound stimulus, evaluating it does not touch any shared
/// state so it can be used from any thread.
pub struct CompiledDerivative {
    model_name: String,
    labels: Vec<String>,
    equations: Vec<Lowered>,
    stimulus: Option<Box<dyn Stimulus>>,
}

impl CompiledDerivative {
    /// Name of the model this function was compiled from
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Length of the state vector
    pub fn dimension(&self) -> usize {
        self.equations.len()
    }

    /// Evaluates every derivative at the given state and time
    pub fn evaluate(&self, y: &[f64], t: f64) -> Result<Vec<f64>, DimensionMismatchError> {
        let mut dydt = vec![0.; self.dimension()];
        self.evaluate_into(y, t, &mut dydt)?;

        Ok(dydt)
    }

    /// Evaluates every derivative at the given state and time, writing into `dydt`
    pub fn evaluate_into(&self, y: &[f64], t: f64, dydt: &mut [f64]) -> Result<(), DimensionMismatchError> {
        for found in [y.len(), dydt.len()] {
            if found != self.dimension() {
                return Err(DimensionMismatchError::StateVector { expected: self.dimension(), found });
            }
        }

        self.write_derivatives(y, t, dydt);

        Ok(())
    }

    fn write_derivatives(&self, y: &[f64], t: f64, dydt: &mut [f64]) {
        let stimulus = match &self.stimulus {
            Some(stimulus) => stimulus.current(t),
            None => 0.,
        };

        for (output, equation) in dydt.iter_mut().zip(self.equations.iter()) {
            *output = equation(y, stimulus);
        }
    }
}

impl DerivativeFunction for CompiledDerivative {
    fn dimension(&self) -> usize {
        self.equations.len()
    }

    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        self.write_derivatives(y, t, dydt);
    }

    fn state_labels(&self) -> Vec<String> {
        self.labels.clone()
    }
}

/// Compiles a model with the given stimulus and constant overrides
///
/// Overrides replace the default value of a declared constant, constants declared without
/// a default must be overridden. The stimulus is only called when the model declares
/// a stimulus symbol.
///
/// ```rust
/// use std::collections::HashMap;
/// use neuro_ode::{compiler::compile, neuron::hodgkin_huxley::hodgkin_huxley, stimulus::Constant};
///
/// let model = hodgkin_huxley().unwrap();
/// let f = compile(&model, Constant::zero(), &HashMap::new()).unwrap();
///
/// let dydt = f.evaluate(model.steady_state().unwrap(), 0.).unwrap();
/// assert!(dydt.iter().all(|i| i.abs() < 1e-3));
/// ```
pub fn compile<S: Stimulus + 'static>(
    descriptor: &ModelDescriptor,
    stimulus: S,
    overrides: &HashMap<Symbol, f64>,
) -> Result<CompiledDerivative, NeuroOdeError> {
    let constants = descriptor.resolve_constants(overrides)?;

    let mut slots: HashMap<Symbol, Slot> = descriptor.state_symbols().iter()
        .enumerate()
        .map(|(i, symbol)| (symbol.clone(), Slot::State(i)))
        .collect();
    if let Some(symbol) = descriptor.stimulus_symbol() {
        slots.insert(symbol.clone(), Slot::Stimulus);
    }

    let mut equations = Vec::with_capacity(descriptor.dimension());
    for (label, expr) in descriptor.derivative_names().iter().zip(descriptor.derivative_expressions()) {
        let folded = expr.substitute(&constants).fold_constants();

        if let Some(symbol) = folded.free_symbols().into_iter().find(|i| !slots.contains_key(i)) {
            return Err(SymbolError::UnresolvedSymbol {
                symbol: symbol.name().to_string(),
                derivative: label.clone(),
            }.into());
        }

        equations.push(lower(&folded, &slots, label)?);
    }

    debug!(
        "compiled `{}` with {} overrides, stimulus {}",
        descriptor.name(),
        overrides.len(),
        if descriptor.stimulus_symbol().is_some() { "bound" } else { "unused" },
    );

    Ok(
        CompiledDerivative {
            model_name: descriptor.name().to_string(),
            labels: descriptor.state_labels(),
            equations,
            stimulus: match descriptor.stimulus_symbol() {
                Some(_) => Some(Box::new(stimulus)),
                None => None,
            },
        }
    )
}

/// Same as [`compile`] with overrides keyed by constant name
pub fn compile_with_named_overrides<S: Stimulus + 'static>(
    descriptor: &ModelDescriptor,
    stimulus: S,
    overrides: &HashMap<String, f64>,
) -> Result<CompiledDerivative, NeuroOdeError> {
    let mut by_symbol = HashMap::new();
    for (name, value) in overrides {
        match descriptor.constant_symbol(name) {
            Some(symbol) => { by_symbol.insert(symbol.clone(), *value); },
            None => return Err(DimensionMismatchError::UnknownOverride(name.clone()).into()),
        }
    }

    compile(descriptor, stimulus, &by_symbol)
}
