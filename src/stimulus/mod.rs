//! Injected current as a function of time, substituted for a model's stimulus symbol
//! when the model is compiled.

use std::sync::Arc;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use crate::error::ConfigError;


/// Time varying input current
pub trait Stimulus: Send + Sync {
    /// Current injected at time `t`
    fn current(&self, t: f64) -> f64;
}

impl<S: Stimulus + ?Sized> Stimulus for Box<S> {
    fn current(&self, t: f64) -> f64 {
        (**self).current(t)
    }
}

impl<S: Stimulus + ?Sized> Stimulus for Arc<S> {
    fn current(&self, t: f64) -> f64 {
        (**self).current(t)
    }
}

/// Stimulus backed by a closure
#[derive(Clone)]
pub struct FnStimulus<F>(pub F);

impl<F: Fn(f64) -> f64 + Send + Sync> Stimulus for FnStimulus<F> {
    fn current(&self, t: f64) -> f64 {
        (self.0)(t)
    }
}

/// Wraps a closure of time as a stimulus
///
/// ```rust
/// use neuro_ode::stimulus::{Stimulus, from_fn};
///
/// let ramp = from_fn(|t| 0.5 * t);
/// assert_eq!(ramp.current(4.), 2.);
/// ```
pub fn from_fn<F: Fn(f64) -> f64 + Send + Sync>(f: F) -> FnStimulus<F> {
    FnStimulus(f)
}

/// Constant current
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Constant {
    pub current: f64,
}

impl Constant {
    pub fn new(current: f64) -> Self {
        Constant { current }
    }

    /// No injected current
    pub fn zero() -> Self {
        Constant { current: 0. }
    }
}

impl Stimulus for Constant {
    fn current(&self, _: f64) -> f64 {
        self.current
    }
}

/// Current switched on at `onset` and held afterwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub amplitude: f64,
    pub onset: f64,
}

impl Stimulus for Step {
    fn current(&self, t: f64) -> f64 {
        if t >= self.onset { self.amplitude } else { 0. }
    }
}

/// Single rectangular pulse over `[start, start + duration)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub amplitude: f64,
    pub start: f64,
    pub duration: f64,
}

impl Stimulus for Pulse {
    fn current(&self, t: f64) -> f64 {
        if t >= self.start && t < self.start + self.duration {
            self.amplitude
        } else {
            0.
        }
    }
}

/// Rectangular pulses repeated every `period` starting at `start`, unbounded
/// when `count` is `None`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseTrain {
    pub amplitude: f64,
    pub start: f64,
    pub duration: f64,
    pub period: f64,
    pub count: Option<usize>,
}

impl PulseTrain {
    pub fn new(
        amplitude: f64,
        start: f64,
        duration: f64,
        period: f64,
        count: Option<usize>,
    ) -> Result<Self, ConfigError> {
        if !(period > 0.) || !(duration >= 0.) || duration > period {
            return Err(ConfigError::InvalidStimulus(
                format!("pulse train needs 0 <= duration ({}) <= period ({})", duration, period)
            ));
        }

        Ok(PulseTrain { amplitude, start, duration, period, count })
    }
}

impl Stimulus for PulseTrain {
    fn current(&self, t: f64) -> f64 {
        if t < self.start {
            return 0.;
        }

        let elapsed = t - self.start;
        let index = (elapsed / self.period).floor();
        if let Some(count) = self.count {
            if index >= count as f64 {
                return 0.;
            }
        }

        if elapsed - index * self.period < self.duration { self.amplitude } else { 0. }
    }
}

/// `offset + amplitude * sin(2 pi frequency t + phase)`, frequency in cycles per unit time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sinusoid {
    pub amplitude: f64,
    pub frequency: f64,
    pub phase: f64,
    pub offset: f64,
}

impl Stimulus for Sinusoid {
    fn current(&self, t: f64) -> f64 {
        self.offset + self.amplitude * (2. * std::f64::consts::PI * self.frequency * t + self.phase).sin()
    }
}

/// Parameters of clamped gaussian noise
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    /// Mean of distribution
    pub mean: f64,
    /// Standard deviation of distribution
    pub std: f64,
    /// Minimum cutoff value
    pub min: f64,
    /// Maximum cutoff value
    pub max: f64,
}

impl Default for NoiseParameters {
    fn default() -> Self {
        NoiseParameters {
            mean: 0.,
            std: 1.,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

impl NoiseParameters {
    /// Draws a normally distributed number clamped between the minimum and maximum,
    /// a zero standard deviation always returns the mean
    fn sample<R: rand::Rng>(&self, distribution: Option<&Normal<f64>>, rng: &mut R) -> f64 {
        match distribution {
            Some(normal) => normal.sample(rng).max(self.min).min(self.max),
            None => self.mean,
        }
    }

    fn distribution(&self) -> Result<Option<Normal<f64>>, ConfigError> {
        if self.min > self.max {
            return Err(ConfigError::InvalidStimulus(
                format!("noise minimum ({}) is greater than maximum ({})", self.min, self.max)
            ));
        }
        if self.std == 0. {
            return Ok(None);
        }

        Normal::new(self.mean, self.std)
            .map(Some)
            .map_err(|e| ConfigError::InvalidStimulus(format!("noise distribution: {}", e)))
    }
}

/// Base stimulus plus gaussian noise held constant over each `dt` window
///
/// Noise is drawn once at construction from a generator seeded with `seed`, so the
/// stimulus is a pure function of time and two stimuli built with the same arguments
/// are identical. Before `start` the first sample is used, after the last window the
/// last sample is used.
pub struct NoisyStimulus {
    base: Box<dyn Stimulus>,
    start: f64,
    dt: f64,
    samples: Vec<f64>,
}

impl NoisyStimulus {
    pub fn new<S: Stimulus + 'static>(
        base: S,
        noise: NoiseParameters,
        start: f64,
        stop: f64,
        dt: f64,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        if !(dt > 0.) || !dt.is_finite() {
            return Err(ConfigError::InvalidStimulus(format!("noise step must be positive, got {}", dt)));
        }
        if !(stop >= start) || !start.is_finite() || !stop.is_finite() {
            return Err(ConfigError::InvalidStimulus(
                format!("noise window [{}, {}] is not a finite increasing interval", start, stop)
            ));
        }

        let distribution = noise.distribution()?;
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let windows = ((stop - start) / dt).ceil() as usize + 1;

        let samples = (0..windows)
            .map(|_| noise.sample(distribution.as_ref(), &mut rng))
            .collect();

        Ok(NoisyStimulus { base: Box::new(base), start, dt, samples })
    }

    /// Noise value applied at time `t`
    pub fn noise(&self, t: f64) -> f64 {
        let index = ((t - self.start) / self.dt).floor().max(0.) as usize;

        self.samples[index.min(self.samples.len() - 1)]
    }
}

impl Stimulus for NoisyStimulus {
    fn current(&self, t: f64) -> f64 {
        self.base.current(t) + self.noise(t)
    }
}
