use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::engines::genetics::PARAMETER_BITS;
use crate::error::EvosimError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Population count per generation.
    pub generation_size: usize,
    /// Maximum number of concurrently simulated agents.
    pub batch_size: usize,
    /// Wall-clock lifetime window of one batch, in milliseconds.
    pub generation_lifetime_ms: u64,
    pub mutation_probability: f64,
    pub long_living_probability: f64,
    /// Bits per genome. Must be a whole number of 16-bit parameter words.
    pub genome_length: usize,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            generation_size: 100,
            batch_size: 10,
            generation_lifetime_ms: 10_000,
            mutation_probability: 0.04,
            long_living_probability: 0.2,
            genome_length: 176,
            seed: None,
        }
    }
}

impl EvolutionConfig {
    pub fn generation_lifetime(&self) -> Duration {
        Duration::from_millis(self.generation_lifetime_ms)
    }

    /// Whether switching from `self` to `next` requires a full run restart.
    /// Size and genome-shape changes invalidate the live population; lifetime
    /// and probability changes apply to the run in flight.
    pub fn requires_restart(&self, next: &EvolutionConfig) -> bool {
        self.generation_size != next.generation_size
            || self.batch_size != next.batch_size
            || self.genome_length != next.genome_length
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<(), EvosimError> {
        if self.generation_size < 2 {
            return Err(EvosimError::Configuration(
                "Generation size must be at least 2".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(EvosimError::Configuration(
                "Batch size must be positive".to_string(),
            ));
        }
        if self.generation_lifetime_ms == 0 {
            return Err(EvosimError::Configuration(
                "Generation lifetime must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(EvosimError::Configuration(
                "Mutation probability must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.long_living_probability) {
            return Err(EvosimError::Configuration(
                "Long-living probability must be between 0 and 1".to_string(),
            ));
        }
        if self.genome_length == 0 || self.genome_length % PARAMETER_BITS != 0 {
            return Err(EvosimError::Configuration(format!(
                "Genome length must be a positive multiple of {}",
                PARAMETER_BITS
            )));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest {
                    name: "generation_size".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(100),
                    min: Some(2.0),
                    max: Some(10000.0),
                    description: "Number of genomes in a generation".to_string(),
                },
                FieldManifest {
                    name: "batch_size".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(10),
                    min: Some(1.0),
                    max: Some(10000.0),
                    description: "Max concurrently simulated agents".to_string(),
                },
                FieldManifest {
                    name: "generation_lifetime_ms".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(10_000),
                    min: Some(1.0),
                    max: None,
                    description: "Batch lifetime window in milliseconds".to_string(),
                },
                FieldManifest {
                    name: "mutation_probability".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(0.04),
                    min: Some(0.0),
                    max: Some(1.0),
                    description: "Per-bit mutation probability".to_string(),
                },
                FieldManifest {
                    name: "long_living_probability".to_string(),
                    field_type: "float".to_string(),
                    default: serde_json::json!(0.2),
                    min: Some(0.0),
                    max: Some(1.0),
                    description: "Per-slot probability of carrying a parent over unchanged"
                        .to_string(),
                },
                FieldManifest {
                    name: "genome_length".to_string(),
                    field_type: "integer".to_string(),
                    default: serde_json::json!(176),
                    min: Some(16.0),
                    max: None,
                    description: "Bits per genome, a multiple of 16".to_string(),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EvolutionConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut config = EvolutionConfig::default();
        config.mutation_probability = 1.5;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.generation_size = 1;
        assert!(config.validate().is_err());

        let mut config = EvolutionConfig::default();
        config.genome_length = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn restart_classification() {
        let base = EvolutionConfig::default();

        let mut resized = base.clone();
        resized.batch_size += 5;
        assert!(base.requires_restart(&resized));

        let mut retimed = base.clone();
        retimed.generation_lifetime_ms = 500;
        retimed.mutation_probability = 0.5;
        assert!(!base.requires_restart(&retimed));
    }
}
