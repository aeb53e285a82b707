//! Conductance based neuron models and the ion channel pieces they are built from

pub mod ion_channels;
pub mod hodgkin_huxley;
pub mod traub_miles;
pub mod erisir;

use crate::error::{ConfigError, NeuroOdeError};
use crate::model::ModelDescriptor;


/// Names accepted by [`model_by_name`], the first of each pair is the full name
pub const MODEL_NAMES: [(&str, &str); 3] = [
    ("hodgkin_huxley", "hh"),
    ("traub_miles", "rtm"),
    ("erisir", "erisir"),
];

/// Looks up a model by name or short name, case insensitive
pub fn model_by_name(name: &str) -> Result<ModelDescriptor, NeuroOdeError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "hodgkin_huxley" | "hh" => hodgkin_huxley::hodgkin_huxley(),
        "traub_miles" | "rtm" => traub_miles::traub_miles_m_current(),
        "erisir" => erisir::erisir(),
        _ => Err(ConfigError::UnknownModel(name.to_string()).into()),
    }
}

/// Every available model
pub fn available_models() -> Result<Vec<ModelDescriptor>, NeuroOdeError> {
    MODEL_NAMES.iter()
        .map(|(name, _)| model_by_name(name))
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::error::{ConfigError, NeuroOdeError};
    use super::{MODEL_NAMES, available_models, model_by_name};


    #[test]
    fn test_lookup() {
        for (name, short) in MODEL_NAMES {
            assert_eq!(model_by_name(name).unwrap(), model_by_name(short).unwrap());
        }

        assert_eq!(model_by_name(" HH ").unwrap().name(), "Hodgkin-Huxley model");
        assert!(matches!(
            model_by_name("izhikevich"),
            Err(NeuroOdeError::ConfigRelatedError(ConfigError::UnknownModel(_)))
        ));
        assert_eq!(available_models().unwrap().len(), 3);
    }
}
