//! The classic Hodgkin Huxley model of the squid giant axon with sodium, potassium
//! and leak currents, with the resting potential shifted to -65 mV

use crate::error::NeuroOdeError;
use crate::model::{ModelBuilder, ModelDescriptor, UnitKey};
use crate::symbolic::symbols;
use super::ion_channels::{
    Gate, GatingVariable, IonicCurrent, RateFunction, RatePair, membrane_equation,
};


/// Potassium activation rates, `alpha_n` is singular at -55 mV
pub fn potassium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 0.01, offset: 55., slope: 10. },
        RateFunction::Exponential { scale: 0.125, offset: 65., slope: 80. },
    )
}

/// Sodium activation rates, `alpha_m` is singular at -40 mV
pub fn sodium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 0.1, offset: 40., slope: 10. },
        RateFunction::Exponential { scale: 4., offset: 65., slope: 18. },
    )
}

/// Sodium inactivation rates
pub fn sodium_inactivation() -> RatePair {
    RatePair::new(
        RateFunction::Exponential { scale: 0.07, offset: 65., slope: 20. },
        RateFunction::Sigmoid { scale: 1., offset: 35., slope: 10. },
    )
}

/// Builds the Hodgkin Huxley model, state is `[V_m, n, m, h]`
///
/// Default constants are `g_K = 36`, `g_Na = 120`, `g_L = 0.3` (mS/cm^2),
/// `E_K = -77`, `E_Na = 50`, `E_L = -54.4` (mV) and `C_m = 1` (uF/cm^2),
/// the stimulus `I_A` is in uA/cm^2
pub fn hodgkin_huxley() -> Result<ModelDescriptor, NeuroOdeError> {
    let [g_k, g_na, g_l] = symbols(["g_K", "g_Na", "g_L"]);
    let [e_k, e_na, e_l] = symbols(["E_K", "E_Na", "E_L"]);
    let [c_m, i_a] = symbols(["C_m", "I_A"]);
    let [v, n, m, h] = symbols(["V_m", "n", "m", "h"]);

    let n_gate = GatingVariable::hodgkin_huxley(&n, potassium_activation());
    let m_gate = GatingVariable::hodgkin_huxley(&m, sodium_activation());
    let h_gate = GatingVariable::hodgkin_huxley(&h, sodium_inactivation());

    let currents = [
        IonicCurrent::new(&g_k, &e_k).gate(Gate::State(n.clone()), 4.),
        IonicCurrent::new(&g_na, &e_na)
            .gate(Gate::State(m.clone()), 3.)
            .gate(Gate::State(h.clone()), 1.),
        IonicCurrent::new(&g_l, &e_l),
    ];

    let mut builder = ModelBuilder::new("Hodgkin-Huxley model")
        .state(&v, "voltage / dt", membrane_equation(Some(&i_a), &currents, &v, &c_m))
        .state(&n, "K activation gate / dt", n_gate.derivative(&v))
        .state(&m, "Na activation gate / dt", m_gate.derivative(&v))
        .state(&h, "Na inactivation gate / dt", h_gate.derivative(&v))
        .constant(&g_k, 36.)
        .constant(&g_na, 120.)
        .constant(&g_l, 0.3)
        .constant(&e_k, -77.)
        .constant(&e_na, 50.)
        .constant(&e_l, -54.4)
        .constant(&c_m, 1.)
        .stimulus(&i_a)
        .steady_state(vec![
            -65.,
            0.317681167579781,
            0.052934217620864,
            0.596111046346827,
        ]);

    for conductance in [&g_k, &g_na, &g_l] {
        builder = builder.unit(UnitKey::Symbol(conductance.clone()), "mS/cm^2");
    }
    for potential in [&v, &e_k, &e_na, &e_l] {
        builder = builder.unit(UnitKey::Symbol(potential.clone()), "mV");
    }

    builder
        .unit(UnitKey::Symbol(c_m), "uF/cm^2")
        .unit(UnitKey::Symbol(i_a), "uA/cm^2")
        .unit(UnitKey::Derivative(0), "mV/ms")
        .unit(UnitKey::Derivative(1), "1/ms")
        .unit(UnitKey::Derivative(2), "1/ms")
        .unit(UnitKey::Derivative(3), "1/ms")
        .build()
}
