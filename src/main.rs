use std::{env, io::{Error, ErrorKind}};
use tracing::info;
use tracing_subscriber::EnvFilter;
use neuro_ode::{
    analysis::spike_times,
    config::SimulationConfig,
    error::{ConfigError, NeuroOdeError},
};


fn main() -> Result<(), NeuroOdeError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        return Err(
            ConfigError::Io(Error::new(ErrorKind::InvalidInput, "Requires .toml argument file")).into()
        );
    }

    let config = SimulationConfig::from_file(&args[1])?;
    let simulation = config.to_simulation()?;

    info!("simulating `{}`", simulation.descriptor.name());
    let trajectory = simulation.run()?;

    trajectory.save_csv(&config.simulation.output)?;
    info!("wrote {} time points to {}", trajectory.len(), config.simulation.output);

    let spikes = spike_times(&trajectory, 0, config.simulation.spike_threshold).unwrap_or_default();
    info!("{} spikes above {} mV", spikes.len(), config.simulation.spike_threshold);

    Ok(())
}
