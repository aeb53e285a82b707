#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use neuro_ode::{
        analysis::{find_peaks, spike_times},
        compiler::{compile, compile_with_named_overrides},
        error::{DimensionMismatchError, IntegrationError, NeuroOdeError},
        integrator::{FnDerivative, IntegratorOptions, integrate, integrate_with_options},
        model::ModelBuilder,
        neuron::{erisir::erisir, hodgkin_huxley::hodgkin_huxley, traub_miles::traub_miles_m_current},
        stimulus::{Constant, Pulse},
        symbolic::symbols,
    };


    fn grid(stop: f64, step: f64) -> Vec<f64> {
        let n = (stop / step).round() as usize;

        (0..=n).map(|i| i as f64 * step).collect()
    }

    #[test]
    pub fn test_linear_decay() -> Result<(), NeuroOdeError> {
        let [x, y, a, b] = symbols(["x", "y", "a", "b"]);
        let model = ModelBuilder::new("linear decay")
            .state(&x, "x / dt", -(&a * &x))
            .state(&y, "y / dt", -(&b * &y))
            .constant(&a, 1.)
            .constant(&b, 2.)
            .build()?;

        let f = compile(&model, Constant::zero(), &HashMap::new())?;
        let trajectory = integrate(&f, &[1., 1.], &[0., 1., 2.])?;

        let expected = [[1., 1.], [0.368, 0.135], [0.135, 0.018]];
        for (row, expected_row) in trajectory.states().rows().into_iter().zip(expected) {
            for (value, expected_value) in row.iter().zip(expected_row) {
                assert!((value - expected_value).abs() < 1e-3, "{} != {}", value, expected_value);
            }
        }
        assert_eq!(trajectory.labels(), &[String::from("x"), String::from("y")]);
        assert_eq!(trajectory.times().to_vec(), vec![0., 1., 2.]);

        Ok(())
    }

    #[test]
    pub fn test_initial_state_length_is_checked() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let f = compile(&model, Constant::zero(), &HashMap::new())?;

        let result = integrate(&f, &[-65., 0.3, 0.05], &[0., 1.]);

        assert!(matches!(
            result,
            Err(NeuroOdeError::DimensionRelatedError(
                DimensionMismatchError::InitialState { expected: 4, found: 3 }
            ))
        ));

        Ok(())
    }

    #[test]
    pub fn test_integration_is_deterministic() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let steady_state = model.steady_state().expect("model has a steady state");
        let times = grid(20., 0.1);

        let first = integrate(&compile(&model, Constant::new(10.), &HashMap::new())?, steady_state, &times)?;
        let second = integrate(&compile(&model, Constant::new(10.), &HashMap::new())?, steady_state, &times)?;

        assert_eq!(first, second);

        Ok(())
    }

    #[test]
    pub fn test_hodgkin_huxley_rests_at_steady_state() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let steady_state = model.steady_state().expect("model has a steady state");
        let f = compile(&model, Constant::zero(), &HashMap::new())?;

        let trajectory = integrate(&f, steady_state, &grid(50., 0.5))?;

        let voltages = trajectory.column(0).expect("voltage column");
        assert!(voltages.iter().all(|v| (v - steady_state[0]).abs() < 0.5));

        let last = trajectory.last_state().expect("trajectory is not empty");
        for (value, expected) in last.iter().zip(steady_state) {
            assert!((value - expected).abs() < 1e-2);
        }

        Ok(())
    }

    #[test]
    pub fn test_hodgkin_huxley_repetitive_firing() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let f = compile(&model, Constant::new(10.), &HashMap::new())?;

        let trajectory = integrate(
            &f, model.steady_state().expect("model has a steady state"), &grid(100., 0.025)
        )?;

        let spikes = spike_times(&trajectory, 0, 0.).expect("voltage column");
        assert!(spikes.len() >= 5, "found {} spikes", spikes.len());

        let voltages = trajectory.column_by_label("V_m").expect("voltage column").to_vec();
        assert!(voltages.iter().all(|v| *v < 60. && *v > -90.));

        Ok(())
    }

    #[test]
    pub fn test_hodgkin_huxley_pulse_threshold() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let steady_state = model.steady_state().expect("model has a steady state");
        let times = grid(30., 0.05);

        let strong = compile(&model, Pulse { amplitude: 20., start: 10., duration: 1. }, &HashMap::new())?;
        let weak = compile(&model, Pulse { amplitude: 2., start: 10., duration: 1. }, &HashMap::new())?;

        let strong = integrate(&strong, steady_state, &times)?;
        let weak = integrate(&weak, steady_state, &times)?;

        assert_eq!(spike_times(&strong, 0, 0.).map(|i| i.len()), Some(1));
        assert_eq!(spike_times(&weak, 0, 0.).map(|i| i.len()), Some(0));

        Ok(())
    }

    #[test]
    pub fn test_m_current_adaptation() -> Result<(), NeuroOdeError> {
        let model = traub_miles_m_current()?;
        let steady_state = model.steady_state().expect("model has a steady state");
        let times = grid(200., 0.05);

        let adapting = compile(&model, Constant::new(2.), &HashMap::new())?;
        let without_m_current = compile_with_named_overrides(
            &model, Constant::new(2.), &HashMap::from([(String::from("g_M"), 0.)])
        )?;

        let adapting = integrate(&adapting, steady_state, &times)?;
        let without_m_current = integrate(&without_m_current, steady_state, &times)?;

        let adapting_spikes = spike_times(&adapting, 0, 0.).expect("voltage column");
        let regular_spikes = spike_times(&without_m_current, 0, 0.).expect("voltage column");

        assert!(!adapting_spikes.is_empty());
        assert!(
            regular_spikes.len() > adapting_spikes.len(),
            "{} spikes without M-current, {} with",
            regular_spikes.len(),
            adapting_spikes.len(),
        );

        Ok(())
    }

    #[test]
    pub fn test_erisir_rheobase() -> Result<(), NeuroOdeError> {
        let model = erisir()?;
        let steady_state = model.steady_state().expect("model has a steady state");
        let times = grid(200., 0.05);

        let below = integrate(&compile(&model, Constant::new(2.), &HashMap::new())?, steady_state, &times)?;
        let above = integrate(&compile(&model, Constant::new(7.), &HashMap::new())?, steady_state, &times)?;

        let below = find_peaks(&below.column(0).expect("voltage column").to_vec(), 0.);
        let above = find_peaks(&above.column(0).expect("voltage column").to_vec(), 0.);

        assert!(below.is_empty());
        assert!(above.len() >= 5, "found {} spikes", above.len());

        Ok(())
    }

    #[test]
    pub fn test_backward_integration() -> Result<(), NeuroOdeError> {
        let decay = FnDerivative::new(1, |_, y: &[f64], dydt: &mut [f64]| dydt[0] = -y[0]);

        let trajectory = integrate(&decay, &[(-1_f64).exp()], &[1., 0.5, 0.])?;

        assert!((trajectory.states()[[1, 0]] - (-0.5_f64).exp()).abs() < 1e-5);
        assert!((trajectory.states()[[2, 0]] - 1.).abs() < 1e-5);

        Ok(())
    }

    #[test]
    pub fn test_invalid_time_points() {
        let decay = FnDerivative::new(1, |_, y: &[f64], dydt: &mut [f64]| dydt[0] = -y[0]);

        for times in [vec![], vec![0., 1., 0.5], vec![0., 0.], vec![0., f64::INFINITY]] {
            assert!(matches!(
                integrate(&decay, &[1.], &times),
                Err(NeuroOdeError::IntegrationRelatedError(IntegrationError::InvalidTimePoints(_)))
            ));
        }
    }

    #[test]
    pub fn test_step_budget() -> Result<(), NeuroOdeError> {
        let model = hodgkin_huxley()?;
        let f = compile(&model, Constant::new(10.), &HashMap::new())?;
        let options = IntegratorOptions { max_steps: 10, ..IntegratorOptions::default() };

        let result = integrate_with_options(
            &f, model.steady_state().expect("model has a steady state"), &grid(100., 1.), &options
        );

        assert!(matches!(
            result,
            Err(NeuroOdeError::IntegrationRelatedError(IntegrationError::StepBudgetExceeded { max_steps: 10, .. }))
        ));

        Ok(())
    }

    #[test]
    pub fn test_finite_time_blow_up() {
        let blow_up = FnDerivative::new(1, |_, y: &[f64], dydt: &mut [f64]| dydt[0] = y[0] * y[0]);

        let result = integrate(&blow_up, &[1.], &[0., 0.5, 2.]);

        assert!(matches!(result, Err(NeuroOdeError::IntegrationRelatedError(_))));
    }

    #[test]
    pub fn test_invalid_options() {
        let decay = FnDerivative::new(1, |_, y: &[f64], dydt: &mut [f64]| dydt[0] = -y[0]);
        let options = IntegratorOptions { atol: -1., ..IntegratorOptions::default() };

        assert!(matches!(
            integrate_with_options(&decay, &[1.], &[0., 1.], &options),
            Err(NeuroOdeError::IntegrationRelatedError(IntegrationError::InvalidOptions(_)))
        ));
    }
}
