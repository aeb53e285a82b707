//! Erisir model of a fast spiking inhibitory interneuron, potassium current with
//! two activation gates and instantaneous sodium activation

use crate::error::NeuroOdeError;
use crate::model::{ModelBuilder, ModelDescriptor, UnitKey};
use crate::symbolic::symbols;
use super::ion_channels::{
    Gate, GatingVariable, IonicCurrent, RateFunction, RatePair, membrane_equation,
};


/// Potassium activation rates, `alpha_n` is singular at 95 mV
pub fn potassium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 1., offset: -95., slope: 11.8 },
        RateFunction::Exponential { scale: 0.025, offset: 0., slope: 22.222 },
    )
}

/// Sodium activation rates, `alpha_m` is singular at 75.5 mV
pub fn sodium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 40., offset: -75.5, slope: 13.5 },
        RateFunction::Exponential { scale: 1.2262, offset: 0., slope: 42.248 },
    )
}

/// Sodium inactivation rates, `beta_h` is singular at -51.25 mV
pub fn sodium_inactivation() -> RatePair {
    RatePair::new(
        RateFunction::Exponential { scale: 0.0035, offset: 0., slope: 24.186 },
        RateFunction::Linoid { scale: 0.017, offset: 51.25, slope: 5.2 },
    )
}

/// Builds the Erisir interneuron model, state is `[V_m, n, h]`
///
/// Default constants are `g_K = 224`, `g_Na = 112`, `g_L = 0.5` (mS/cm^2),
/// `E_K = -90`, `E_Na = 60`, `E_L = -70` (mV) and `C_m = 1` (uF/cm^2)
pub fn erisir() -> Result<ModelDescriptor, NeuroOdeError> {
    let [g_k, g_na, g_l] = symbols(["g_K", "g_Na", "g_L"]);
    let [e_k, e_na, e_l] = symbols(["E_K", "E_Na", "E_L"]);
    let [c_m, i_a] = symbols(["C_m", "I_A"]);
    let [v, n, h] = symbols(["V_m", "n", "h"]);

    let n_gate = GatingVariable::hodgkin_huxley(&n, potassium_activation());
    let h_gate = GatingVariable::hodgkin_huxley(&h, sodium_inactivation());
    let m_inf = sodium_activation().steady_state(&v);

    let currents = [
        IonicCurrent::new(&g_k, &e_k).gate(Gate::State(n.clone()), 2.),
        IonicCurrent::new(&g_na, &e_na)
            .gate(Gate::Instantaneous(m_inf), 3.)
            .gate(Gate::State(h.clone()), 1.),
        IonicCurrent::new(&g_l, &e_l),
    ];

    ModelBuilder::new("Erisir interneuron model")
        .state(&v, "voltage / dt", membrane_equation(Some(&i_a), &currents, &v, &c_m))
        .state(&n, "K activation gate / dt", n_gate.derivative(&v))
        .state(&h, "Na inactivation gate / dt", h_gate.derivative(&v))
        .constant(&g_k, 224.)
        .constant(&g_na, 112.)
        .constant(&g_l, 0.5)
        .constant(&c_m, 1.)
        .constant(&e_k, -90.)
        .constant(&e_na, 60.)
        .constant(&e_l, -70.)
        .stimulus(&i_a)
        .unit(UnitKey::Symbol(v), "mV")
        .steady_state(vec![
            -69.83143598922476,
            0.00024416841622672703,
            0.873198903112398,
        ])
        .build()
}
