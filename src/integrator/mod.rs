//! Adaptive Dormand-Prince 5(4) integration producing a [`Trajectory`] at a fixed set
//! of output times.
//!
//! Stepping and error control are done by [`ode_solvers::dopri5::Dopri5`]. The system
//! is integrated one output interval at a time and the state at each output time is
//! the solver's dense output at the end of its interval, so time points may be
//! irregular and increasing or decreasing.

use ndarray::{Array1, Array2};
use ode_solvers::DVector;
use ode_solvers::dop_shared::{IntegrationError as SolverError, System};
use ode_solvers::dopri5::Dopri5;
use serde::Deserialize;
use tracing::{debug, warn};
use crate::error::{DimensionMismatchError, IntegrationError, NeuroOdeError};
use crate::trajectory::Trajectory;


/// Right hand side `dy/dt = f(t, y)` of a system of differential equations
pub trait DerivativeFunction {
    /// Number of state variables
    fn dimension(&self) -> usize;
    /// Writes `f(t, y)` into `dydt`, both slices have length `dimension()`
    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]);
    /// Names of the state variables, used to label trajectory columns
    fn state_labels(&self) -> Vec<String> {
        (0..self.dimension()).map(|i| format!("y{}", i)).collect()
    }
}

/// Derivative function backed by a closure
///
/// ```rust
/// use neuro_ode::integrator::{FnDerivative, integrate};
///
/// let decay = FnDerivative::new(1, |_, y: &[f64], dydt: &mut [f64]| dydt[0] = -y[0]);
/// let trajectory = integrate(&decay, &[1.], &[0., 1.]).unwrap();
///
/// assert!((trajectory.states()[[1, 0]] - (-1_f64).exp()).abs() < 1e-5);
/// ```
pub struct FnDerivative<F> {
    dimension: usize,
    f: F,
}

impl<F: Fn(f64, &[f64], &mut [f64])> FnDerivative<F> {
    pub fn new(dimension: usize, f: F) -> Self {
        FnDerivative { dimension, f }
    }
}

impl<F: Fn(f64, &[f64], &mut [f64])> DerivativeFunction for FnDerivative<F> {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn derivative(&self, t: f64, y: &[f64], dydt: &mut [f64]) {
        (self.f)(t, y, dydt)
    }
}

/// Tolerances and step budget of the integrator
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegratorOptions {
    /// Relative tolerance
    pub rtol: f64,
    /// Absolute tolerance
    pub atol: f64,
    /// Maximum number of attempted steps over the whole integration
    pub max_steps: usize,
}

impl Default for IntegratorOptions {
    fn default() -> Self {
        IntegratorOptions {
            rtol: 1e-6,
            atol: 1e-8,
            max_steps: 1_000_000,
        }
    }
}

impl IntegratorOptions {
    /// Checks that tolerances and the step budget are usable
    pub fn validate(&self) -> Result<(), IntegrationError> {
        if !(self.rtol.is_finite() && self.rtol > 0.) {
            return Err(IntegrationError::InvalidOptions(format!("rtol must be positive, got {}", self.rtol)));
        }
        if !(self.atol.is_finite() && self.atol > 0.) {
            return Err(IntegrationError::InvalidOptions(format!("atol must be positive, got {}", self.atol)));
        }
        if self.max_steps == 0 {
            return Err(IntegrationError::InvalidOptions(String::from("max_steps must be nonzero")));
        }

        Ok(())
    }
}

/// Adapts a [`DerivativeFunction`] to the solver, in a local time `s` running forward
/// from zero with `t = start + direction * s`
struct Interval<'a, F: ?Sized> {
    f: &'a F,
    start: f64,
    direction: f64,
}

impl<'a, F: ?Sized> Clone for Interval<'a, F> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, F: ?Sized> Copy for Interval<'a, F> {}

impl<'a, F: ?Sized> Interval<'a, F> {
    fn time(&self, s: f64) -> f64 {
        self.start + self.direction * s
    }

    fn error(&self, e: SolverError) -> IntegrationError {
        match e {
            SolverError::MaxNumStepReached { x, n_step } => {
                IntegrationError::StepBudgetExceeded { max_steps: n_step as usize, t: self.time(x) }
            },
            SolverError::StepSizeUnderflow { x } => IntegrationError::StepSizeUnderflow(self.time(x)),
            SolverError::StiffnessDetected { x } => IntegrationError::StiffnessDetected(self.time(x)),
        }
    }
}

impl<'a, F: DerivativeFunction + ?Sized> System<f64, DVector<f64>> for Interval<'a, F> {
    fn system(&self, s: f64, y: &DVector<f64>, dy: &mut DVector<f64>) {
        self.f.derivative(self.time(s), y.as_slice(), dy.as_mut_slice());
        if self.direction < 0. {
            dy.iter_mut().for_each(|i| *i = -*i);
        }
    }
}

// dense output is only emitted up to the solver's current time, the end of each interval
// is overshot by this fraction so rounding in the last step cannot skip the output time
const OVERSHOOT: f64 = 1e-12;

/// Integrates from `start` to `end`, returning the state at `end` and the number of
/// attempted steps
fn advance<F: DerivativeFunction + ?Sized>(
    f: &F,
    start: f64,
    end: f64,
    y: &[f64],
    options: &IntegratorOptions,
) -> Result<(Vec<f64>, usize), IntegrationError> {
    let interval = Interval { f, start, direction: (end - start).signum() };
    let length = (end - start).abs();

    let mut stepper = Dopri5::new(
        interval,
        0.,
        length * (1. + OVERSHOOT),
        length,
        DVector::from_column_slice(y),
        options.rtol,
        options.atol,
    );

    let stats = stepper.integrate().map_err(|e| interval.error(e))?;
    let steps = (stats.accepted_steps + stats.rejected_steps) as usize;

    let state = stepper.x_out().iter()
        .zip(stepper.y_out().iter())
        .min_by(|a, b| (a.0 - length).abs().total_cmp(&(b.0 - length).abs()))
        .map(|(_, state)| state.as_slice().to_vec())
        .ok_or(IntegrationError::StepSizeUnderflow(start))?;

    if state.iter().any(|i| !i.is_finite()) {
        return Err(IntegrationError::NonFiniteState(end));
    }

    Ok((state, steps))
}

fn check_time_points(time_points: &[f64]) -> Result<f64, IntegrationError> {
    if time_points.is_empty() {
        return Err(IntegrationError::InvalidTimePoints(String::from("no time points given")));
    }
    if let Some(t) = time_points.iter().find(|i| !i.is_finite()) {
        return Err(IntegrationError::InvalidTimePoints(format!("time point {} is not finite", t)));
    }
    if time_points.len() == 1 {
        return Ok(1.);
    }

    let direction = (time_points[1] - time_points[0]).signum();
    let monotonic = time_points.windows(2)
        .all(|pair| pair[1] != pair[0] && (pair[1] - pair[0]).signum() == direction);

    if !monotonic {
        return Err(IntegrationError::InvalidTimePoints(
            String::from("time points must be strictly increasing or strictly decreasing")
        ));
    }

    Ok(direction)
}

/// Integrates `f` from `initial_state` at `time_points[0]` with default options,
/// see [`integrate_with_options`]
pub fn integrate<F: DerivativeFunction + ?Sized>(
    f: &F,
    initial_state: &[f64],
    time_points: &[f64],
) -> Result<Trajectory, NeuroOdeError> {
    integrate_with_options(f, initial_state, time_points, &IntegratorOptions::default())
}

/// Integrates `f` from `initial_state` at `time_points[0]`, returning the state at
/// every time point
///
/// Fails without a partial result if the initial state has the wrong length, the time
/// points are empty, not finite or not strictly monotonic, or the solver cannot
/// continue (step budget exhausted, step size underflow, stiffness, non finite values).
pub fn integrate_with_options<F: DerivativeFunction + ?Sized>(
    f: &F,
    initial_state: &[f64],
    time_points: &[f64],
    options: &IntegratorOptions,
) -> Result<Trajectory, NeuroOdeError> {
    let result = solve(f, initial_state, time_points, options);

    if let Err(e) = &result {
        warn!("integration failed: {}", e);
    }

    result
}

fn solve<F: DerivativeFunction + ?Sized>(
    f: &F,
    initial_state: &[f64],
    time_points: &[f64],
    options: &IntegratorOptions,
) -> Result<Trajectory, NeuroOdeError> {
    options.validate()?;

    let n = f.dimension();
    if initial_state.len() != n {
        return Err(DimensionMismatchError::InitialState { expected: n, found: initial_state.len() }.into());
    }

    check_time_points(time_points)?;
    let t0 = time_points[0];
    if initial_state.iter().any(|i| !i.is_finite()) {
        return Err(IntegrationError::NonFiniteState(t0).into());
    }

    let mut dydt = vec![0.; n];
    f.derivative(t0, initial_state, &mut dydt);
    if dydt.iter().any(|i| !i.is_finite()) {
        return Err(IntegrationError::NonFiniteState(t0).into());
    }

    debug!(
        "integrating {} state variables over {} time points from t = {}",
        n, time_points.len(), t0,
    );

    let mut states = Array2::<f64>::zeros((time_points.len(), n));
    states.row_mut(0).assign(&Array1::from(initial_state.to_vec()));

    let mut y = initial_state.to_vec();
    let mut steps = 0;

    for (i, pair) in time_points.windows(2).enumerate() {
        let (start, end) = (pair[0], pair[1]);

        let (next, taken) = advance(f, start, end, &y, options)?;
        steps += taken;
        if steps > options.max_steps {
            return Err(IntegrationError::StepBudgetExceeded { max_steps: options.max_steps, t: end }.into());
        }

        states.row_mut(i + 1).assign(&Array1::from(next.clone()));
        y = next;
    }

    debug!("integration finished after {} steps", steps);

    Ok(Trajectory::new(Array1::from(time_points.to_vec()), states, f.state_labels()))
}
