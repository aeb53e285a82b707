//! Reusable pieces for conductance based models: voltage dependent rate functions,
//! gating variable kinetics and ionic currents, all producing symbolic expressions.
//!
//! Every model in [`crate::neuron`] is put together from these, so the kinetics formulas
//! exist in one place and each model only supplies its own parameters.

use crate::symbolic::{Expr, Symbol};


fn shifted(voltage: &Symbol, offset: f64) -> Expr {
    if offset == 0. {
        voltage.expr()
    } else {
        voltage + offset
    }
}

/// Voltage dependent transition rate of a gating variable
///
/// With `u = V + offset`:
/// - `Exponential`: `scale * exp(-u / slope)`
/// - `Sigmoid`: `scale / (1 + exp(-u / slope))`
/// - `Linoid`: `scale * u / (1 - exp(-u / slope))`
///
/// The linoid form has a removable singularity at `u = 0` (`V = -offset`). The expression
/// is kept as written, so evaluating it exactly at that voltage gives `NaN`; the integrator
/// reports such states as an error rather than the kinetics being altered.
#[derive(Debug, Clone, PartialEq)]
pub enum RateFunction {
    Exponential { scale: f64, offset: f64, slope: f64 },
    Sigmoid { scale: f64, offset: f64, slope: f64 },
    Linoid { scale: f64, offset: f64, slope: f64 },
    /// Arbitrary expression of the voltage
    Custom(Expr),
}

impl RateFunction {
    /// Symbolic rate as a function of the given voltage symbol
    pub fn expression(&self, voltage: &Symbol) -> Expr {
        match self {
            RateFunction::Exponential { scale, offset, slope } => {
                *scale * (-shifted(voltage, *offset) / *slope).exp()
            },
            RateFunction::Sigmoid { scale, offset, slope } => {
                *scale / (1. + (-shifted(voltage, *offset) / *slope).exp())
            },
            RateFunction::Linoid { scale, offset, slope } => {
                *scale * shifted(voltage, *offset) / (1. - (-shifted(voltage, *offset) / *slope).exp())
            },
            RateFunction::Custom(expr) => expr.clone(),
        }
    }

    /// Voltage at which the rate expression divides by zero, only linoid rates have one
    pub fn singular_voltage(&self) -> Option<f64> {
        match self {
            RateFunction::Linoid { offset, .. } => Some(-offset),
            _ => None,
        }
    }
}

/// Forward (`alpha`) and backward (`beta`) rates of a two state channel gate
#[derive(Debug, Clone, PartialEq)]
pub struct RatePair {
    pub alpha: RateFunction,
    pub beta: RateFunction,
}

impl RatePair {
    pub fn new(alpha: RateFunction, beta: RateFunction) -> Self {
        RatePair { alpha, beta }
    }

    /// `alpha / (alpha + beta)`
    pub fn steady_state(&self, voltage: &Symbol) -> Expr {
        let alpha = self.alpha.expression(voltage);
        let beta = self.beta.expression(voltage);

        &alpha / (&alpha + beta)
    }

    /// `1 / (alpha + beta)`
    pub fn time_constant(&self, voltage: &Symbol) -> Expr {
        1. / (self.alpha.expression(voltage) + self.beta.expression(voltage))
    }
}

/// First order kinetics of a gating variable
#[derive(Debug, Clone, PartialEq)]
pub enum GatingKinetics {
    /// `alpha * (1 - x) - beta * x`
    HodgkinHuxley(RatePair),
    /// `(x_inf - x) / tau_x`, used for slow currents such as adaptation
    Relaxation {
        steady_state: RateFunction,
        time_constant: RateFunction,
    },
}

/// A gating variable that is part of the state vector
#[derive(Debug, Clone, PartialEq)]
pub struct GatingVariable {
    pub symbol: Symbol,
    pub kinetics: GatingKinetics,
}

impl GatingVariable {
    pub fn hodgkin_huxley(symbol: &Symbol, rates: RatePair) -> Self {
        GatingVariable { symbol: symbol.clone(), kinetics: GatingKinetics::HodgkinHuxley(rates) }
    }

    pub fn relaxation(symbol: &Symbol, steady_state: RateFunction, time_constant: RateFunction) -> Self {
        GatingVariable {
            symbol: symbol.clone(),
            kinetics: GatingKinetics::Relaxation { steady_state, time_constant },
        }
    }

    /// Time derivative of the gating variable
    pub fn derivative(&self, voltage: &Symbol) -> Expr {
        let x = &self.symbol;

        match &self.kinetics {
            GatingKinetics::HodgkinHuxley(rates) => {
                rates.alpha.expression(voltage) * (1. - x) - rates.beta.expression(voltage) * x
            },
            GatingKinetics::Relaxation { steady_state, time_constant } => {
                (steady_state.expression(voltage) - x) / time_constant.expression(voltage)
            },
        }
    }

    /// Value the gating variable relaxes to at a fixed voltage
    pub fn steady_state(&self, voltage: &Symbol) -> Expr {
        match &self.kinetics {
            GatingKinetics::HodgkinHuxley(rates) => rates.steady_state(voltage),
            GatingKinetics::Relaxation { steady_state, .. } => steady_state.expression(voltage),
        }
    }
}

/// A factor of a channel's open probability
#[derive(Debug, Clone, PartialEq)]
pub enum Gate {
    /// Gating variable integrated as part of the state
    State(Symbol),
    /// Gate assumed to be at its steady state value instantly, given as an expression of voltage
    Instantaneous(Expr),
}

impl Gate {
    fn expression(&self) -> Expr {
        match self {
            Gate::State(symbol) => symbol.expr(),
            Gate::Instantaneous(expr) => expr.clone(),
        }
    }
}

/// Ionic current `g * prod(gate ^ p) * (V - E)`
#[derive(Debug, Clone, PartialEq)]
pub struct IonicCurrent {
    /// Maximal conductance
    pub conductance: Symbol,
    /// Reversal potential
    pub reversal: Symbol,
    /// Gates and their exponents
    pub gates: Vec<(Gate, f64)>,
}

impl IonicCurrent {
    /// Current without gates, such as a leak current
    pub fn new(conductance: &Symbol, reversal: &Symbol) -> Self {
        IonicCurrent { conductance: conductance.clone(), reversal: reversal.clone(), gates: vec![] }
    }

    /// Adds a gate raised to the given exponent
    pub fn gate(mut self, gate: Gate, exponent: f64) -> Self {
        self.gates.push((gate, exponent));

        self
    }

    pub fn expression(&self, voltage: &Symbol) -> Expr {
        let open_probability = self.gates.iter()
            .map(|(gate, exponent)| {
                if *exponent == 1. {
                    gate.expression()
                } else {
                    gate.expression().powf(*exponent)
                }
            });

        Expr::product(std::iter::once(self.conductance.expr()).chain(open_probability)) *
            (voltage - &self.reversal)
    }
}

/// Membrane equation `(I_stim - sum(I_ionic)) / C_m`, without a stimulus the
/// injected current is left out
pub fn membrane_equation(
    stimulus: Option<&Symbol>,
    currents: &[IonicCurrent],
    voltage: &Symbol,
    capacitance: &Symbol,
) -> Expr {
    let mut net = match stimulus {
        Some(symbol) => symbol.expr(),
        None => Expr::Number(0.),
    };
    for current in currents {
        net = net - current.expression(voltage);
    }

    net / capacitance
}
