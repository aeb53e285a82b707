#[cfg(test)]
mod tests {
    use std::{fs::read_to_string, sync::Arc};
    use neuro_ode::{
        analysis::spike_times,
        config::SimulationConfig,
        error::{ConfigError, DimensionMismatchError, NeuroOdeError},
        model::ModelBuilder,
        neuron::model_by_name,
        simulation::{Simulation, TimeGrid, run_batch},
        stimulus::{Constant, NoiseParameters, NoisyStimulus},
        symbolic::symbols,
    };


    fn simulation(name: &str, current: f64) -> Result<Simulation, NeuroOdeError> {
        Ok(
            Simulation::new(
                Arc::new(model_by_name(name)?),
                TimeGrid::Uniform { start: 0., stop: 20., step: 0.1 },
            ).with_stimulus(Constant::new(current))
        )
    }

    #[test]
    pub fn test_batch_matches_sequential_runs() -> Result<(), NeuroOdeError> {
        let simulations = vec![
            simulation("hh", 5.)?,
            simulation("rtm", 2.)?,
            simulation("erisir", 7.)?,
            simulation("hh", 0.)?.with_named_override("g_K", 30.)?,
        ];

        let batch = run_batch(&simulations);
        assert_eq!(batch.len(), simulations.len());

        for (simulation, result) in simulations.iter().zip(batch) {
            assert_eq!(result?, simulation.run()?);
        }

        Ok(())
    }

    #[test]
    pub fn test_batch_failures_are_independent() -> Result<(), NeuroOdeError> {
        let simulations = vec![
            simulation("hh", 5.)?,
            simulation("hh", 5.)?.with_initial_state(vec![-65., 0.3]),
        ];

        let batch = run_batch(&simulations);

        assert!(batch[0].is_ok());
        assert!(matches!(
            batch[1],
            Err(NeuroOdeError::DimensionRelatedError(DimensionMismatchError::InitialState { .. }))
        ));

        Ok(())
    }

    #[test]
    pub fn test_unknown_named_override() -> Result<(), NeuroOdeError> {
        assert!(matches!(
            simulation("hh", 0.)?.with_named_override("g_M", 1.),
            Err(NeuroOdeError::DimensionRelatedError(DimensionMismatchError::UnknownOverride(_)))
        ));

        Ok(())
    }

    #[test]
    pub fn test_missing_initial_state() -> Result<(), NeuroOdeError> {
        let [x, a] = symbols(["x", "a"]);
        let model = ModelBuilder::new("decay")
            .state(&x, "x / dt", -(&a * &x))
            .constant(&a, 1.)
            .build()?;

        let time = TimeGrid::Points(vec![0., 1.]);
        let without_state = Simulation::new(Arc::new(model), time);

        assert!(matches!(
            without_state.run(),
            Err(NeuroOdeError::ConfigRelatedError(ConfigError::MissingInitialState(_)))
        ));

        let trajectory = without_state.with_initial_state(vec![2.]).run()?;
        assert!((trajectory.states()[[1, 0]] - 2. * (-1_f64).exp()).abs() < 1e-5);

        Ok(())
    }

    #[test]
    pub fn test_noisy_runs_are_reproducible() -> Result<(), NeuroOdeError> {
        let noise = NoiseParameters { mean: 0., std: 3., min: -10., max: 10. };
        let noisy = |seed| NoisyStimulus::new(Constant::new(5.), noise, 0., 20., 0.5, seed);

        let first = simulation("hh", 0.)?.with_stimulus(noisy(11)?).run()?;
        let second = simulation("hh", 0.)?.with_stimulus(noisy(11)?).run()?;
        let other = simulation("hh", 0.)?.with_stimulus(noisy(12)?).run()?;

        assert_eq!(first, second);
        assert_ne!(first, other);

        Ok(())
    }

    #[test]
    pub fn test_config_runs_pulse_simulation() -> Result<(), NeuroOdeError> {
        let output = std::env::temp_dir().join("neuro_ode_config_test.csv");

        let config: SimulationConfig = format!("
            [simulation]
            model = \"hodgkin_huxley\"
            output = {:?}

            [simulation.time]
            stop = 30.0
            step = 0.05

            [simulation.stimulus]
            type = \"pulse\"
            amplitude = 20.0
            start = 10.0
            duration = 1.0

            [simulation.constants]
            E_L = -54.4

            [simulation.solver]
            rtol = 1e-7
        ", output.to_string_lossy()).parse()?;

        let simulation = config.to_simulation()?;
        assert_eq!(simulation.options.rtol, 1e-7);
        assert_eq!(simulation.overrides.len(), 1);

        let trajectory = simulation.run()?;
        assert_eq!(trajectory.len(), 601);
        assert_eq!(spike_times(&trajectory, 0, 0.).map(|i| i.len()), Some(1));

        trajectory.save_csv(&config.simulation.output)?;
        let written = read_to_string(&output).map_err(ConfigError::from)?;
        let mut lines = written.lines();

        assert_eq!(lines.next(), Some("time,V_m,n,m,h"));
        assert_eq!(lines.count(), 601);

        Ok(())
    }

    #[test]
    pub fn test_config_rejects_unknown_model() -> Result<(), NeuroOdeError> {
        let config: SimulationConfig = "
            [simulation]
            model = \"morris_lecar\"

            [simulation.time]
            points = [0.0, 1.0]
        ".parse()?;

        assert!(matches!(
            config.to_simulation(),
            Err(NeuroOdeError::ConfigRelatedError(ConfigError::UnknownModel(_)))
        ));

        Ok(())
    }
}
