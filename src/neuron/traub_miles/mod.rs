//! Reduced Traub-Miles model of a pyramidal excitatory cell with an added M-current,
//! a slow potassium current that produces spike frequency adaptation
//!
//! Sodium activation is taken to be instantaneous (`m = m_inf(V)`), leaving potassium
//! activation `n`, sodium inactivation `h` and the M-current gate `w` as gating states.

use crate::error::NeuroOdeError;
use crate::model::{ModelBuilder, ModelDescriptor, UnitKey};
use crate::symbolic::symbols;
use super::ion_channels::{
    Gate, GatingVariable, IonicCurrent, RateFunction, RatePair, membrane_equation,
};


/// Sodium activation rates, `alpha_m` is singular at -54 mV and `beta_m` at -27 mV
pub fn sodium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 0.32, offset: 54., slope: 4. },
        RateFunction::Linoid { scale: -0.28, offset: 27., slope: -5. },
    )
}

/// Sodium inactivation rates
pub fn sodium_inactivation() -> RatePair {
    RatePair::new(
        RateFunction::Exponential { scale: 0.128, offset: 50., slope: 18. },
        RateFunction::Sigmoid { scale: 4., offset: 27., slope: 5. },
    )
}

/// Potassium activation rates, `alpha_n` is singular at -52 mV
pub fn potassium_activation() -> RatePair {
    RatePair::new(
        RateFunction::Linoid { scale: 0.032, offset: 52., slope: 5. },
        RateFunction::Exponential { scale: 0.5, offset: 57., slope: 40. },
    )
}

/// Builds the reduced Traub-Miles model with M-current, state is `[V_m, n, h, w]`
///
/// Default constants are `g_Na = 100`, `g_K = 80`, `g_L = 0.1`, `g_M = 0.4` (mS/cm^2),
/// `E_Na = 50`, `E_K = -100`, `E_L = -67` (mV) and `C_m = 1` (uF/cm^2)
pub fn traub_miles_m_current() -> Result<ModelDescriptor, NeuroOdeError> {
    let [g_k, g_na, g_l, g_m] = symbols(["g_K", "g_Na", "g_L", "g_M"]);
    let [e_k, e_na, e_l] = symbols(["E_K", "E_Na", "E_L"]);
    let [c_m, i_a] = symbols(["C_m", "I_A"]);
    let [v, n, h, w] = symbols(["V_m", "n", "h", "w"]);

    let n_gate = GatingVariable::hodgkin_huxley(&n, potassium_activation());
    let h_gate = GatingVariable::hodgkin_huxley(&h, sodium_inactivation());
    let w_gate = GatingVariable::relaxation(
        &w,
        RateFunction::Sigmoid { scale: 1., offset: 35., slope: 10. },
        RateFunction::Custom(
            400. / (3.3 * ((&v + 35.) / 20.).exp() + (-(&v + 35.) / 20.).exp())
        ),
    );
    let m_inf = sodium_activation().steady_state(&v);

    let currents = [
        IonicCurrent::new(&g_k, &e_k).gate(Gate::State(n.clone()), 4.),
        IonicCurrent::new(&g_na, &e_na)
            .gate(Gate::Instantaneous(m_inf), 3.)
            .gate(Gate::State(h.clone()), 1.),
        IonicCurrent::new(&g_l, &e_l),
        IonicCurrent::new(&g_m, &e_k).gate(Gate::State(w.clone()), 1.),
    ];

    ModelBuilder::new("Reduced Traub-Miles model with M-current")
        .state(&v, "voltage / dt", membrane_equation(Some(&i_a), &currents, &v, &c_m))
        .state(&n, "K activation gate / dt", n_gate.derivative(&v))
        .state(&h, "Na inactivation gate / dt", h_gate.derivative(&v))
        .state(&w, "M-current gate / dt", w_gate.derivative(&v))
        .constant(&c_m, 1.)
        .constant(&e_na, 50.)
        .constant(&e_k, -100.)
        .constant(&e_l, -67.)
        .constant(&g_na, 100.)
        .constant(&g_k, 80.)
        .constant(&g_l, 0.1)
        .constant(&g_m, 0.4)
        .stimulus(&i_a)
        .unit(UnitKey::Symbol(v), "mV")
        .unit(UnitKey::Symbol(i_a), "uA/cm^2")
        .steady_state(vec![
            -70.32776756995159,
            0.0215988536794527,
            0.9982615596543024,
            0.028393883035029308,
        ])
        .build()
}
