use crate::engines::genetics::genome::{Generation, Genome};
use rand::Rng;

/// Generate one random genome of independently uniform bits.
pub fn random_genome<R: Rng>(genome_length: usize, rng: &mut R) -> Genome {
    (0..genome_length)
        .map(|_| if rng.gen_bool(0.5) { 1 } else { 0 })
        .collect()
}

/// Create the initial generation: `generation_size` random genomes of
/// `genome_length` bits each. The RNG is injected so runs can be reproduced
/// under a fixed seed.
pub fn create_generation<R: Rng>(
    generation_size: usize,
    genome_length: usize,
    rng: &mut R,
) -> Generation {
    (0..generation_size)
        .map(|_| random_genome(genome_length, rng))
        .collect()
}
