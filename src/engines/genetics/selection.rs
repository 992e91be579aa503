use crate::engines::genetics::genome::{Generation, Genome};
use crate::engines::genetics::operators::{crossover_bits, mutate_bits, roulette_pick, viable_count};
use crate::error::{EvosimError, Result};
use rand::Rng;

/// Validated probability pair for one selection round.
///
/// Values outside [0, 1] are a configuration error and are rejected up front
/// rather than clamped silently.
#[derive(Debug, Clone, Copy)]
pub struct SelectionProbabilities {
    pub mutation_probability: f64,
    pub long_living_probability: f64,
}

impl SelectionProbabilities {
    pub fn new(mutation_probability: f64, long_living_probability: f64) -> Result<Self> {
        for (name, value) in [
            ("mutation_probability", mutation_probability),
            ("long_living_probability", long_living_probability),
        ] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(EvosimError::Configuration(format!(
                    "{} must be between 0 and 1, got {}",
                    name, value
                )));
            }
        }
        Ok(Self {
            mutation_probability,
            long_living_probability,
        })
    }
}

/// Breed the next generation from `generation` via fitness-proportionate
/// parent selection, single-point crossover, per-bit mutation and long-living
/// carry-over.
///
/// The fitness function is evaluated once for every genome before any
/// breeding happens; if it fails for any genome the whole call fails and the
/// caller owns the fallback. The output generation always has exactly the
/// input size.
pub fn select<F, R>(
    generation: &Generation,
    fitness_fn: F,
    probabilities: SelectionProbabilities,
    rng: &mut R,
) -> Result<Generation>
where
    F: Fn(&Genome) -> Result<f64>,
    R: Rng,
{
    if generation.is_empty() {
        return Err(EvosimError::Selection(
            "cannot select from an empty generation".to_string(),
        ));
    }

    let weights = generation
        .iter()
        .map(&fitness_fn)
        .collect::<Result<Vec<f64>>>()?;

    let viable = viable_count(&weights);
    let mut next_generation: Generation = Vec::with_capacity(generation.len());

    for _ in 0..generation.len() {
        let parent1_index = roulette_pick(&weights, rng);

        // Long-living slot: the selected parent survives unmutated.
        if rng.gen::<f64>() < probabilities.long_living_probability {
            next_generation.push(generation[parent1_index].clone());
            continue;
        }

        // Parents must be distinct unless only one genome can ever win a
        // spin (a single-winner wheel, or a population of one).
        let allow_same_parent = generation.len() <= 1 || viable == 1;
        let parent2_index = if allow_same_parent {
            roulette_pick(&weights, rng)
        } else {
            loop {
                let candidate = roulette_pick(&weights, rng);
                if candidate != parent1_index {
                    break candidate;
                }
            }
        };

        let mut child = crossover_bits(
            &generation[parent1_index],
            &generation[parent2_index],
            rng,
        );
        mutate_bits(&mut child, probabilities.mutation_probability, rng);
        next_generation.push(child);
    }

    Ok(next_generation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn probabilities_out_of_range_are_rejected() {
        assert!(SelectionProbabilities::new(-0.1, 0.5).is_err());
        assert!(SelectionProbabilities::new(0.5, 1.1).is_err());
        assert!(SelectionProbabilities::new(f64::NAN, 0.0).is_err());
        assert!(SelectionProbabilities::new(0.0, 1.0).is_ok());
    }

    #[test]
    fn failing_fitness_fails_the_whole_call() {
        let mut rng = StdRng::seed_from_u64(3);
        let generation = vec![vec![0, 1], vec![1, 0]];
        let probabilities = SelectionProbabilities::new(0.1, 0.1).unwrap();
        let result = select(
            &generation,
            |_| Err(EvosimError::FitnessLookup("missing".to_string())),
            probabilities,
            &mut rng,
        );
        assert!(matches!(result, Err(EvosimError::FitnessLookup(_))));
    }

    #[test]
    fn single_viable_genome_still_fills_the_generation() {
        let mut rng = StdRng::seed_from_u64(3);
        let generation = vec![vec![0, 1, 0, 1], vec![1, 1, 1, 1]];
        let probabilities = SelectionProbabilities::new(0.0, 0.0).unwrap();
        let next = select(
            &generation,
            |genome| Ok(if genome[0] == 1 { 1.0 } else { 0.0 }),
            probabilities,
            &mut rng,
        )
        .unwrap();
        assert_eq!(next.len(), 2);
    }
}
