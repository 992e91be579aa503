use crate::engines::genetics::genome::Genome;
use rand::Rng;

/// Roulette wheel pick: probability of an index being chosen is proportional
/// to its fitness weight. Degenerate weight vectors (all zero, or containing
/// no positive weight) fall back to a uniform pick.
pub fn roulette_pick<R: Rng>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().map(|w| w.max(0.0)).sum();

    if total <= 0.0 || !total.is_finite() {
        return rng.gen_range(0..weights.len());
    }

    let mut spin = rng.gen::<f64>() * total;

    for (index, weight) in weights.iter().enumerate() {
        spin -= weight.max(0.0);
        if spin <= 0.0 {
            return index;
        }
    }

    // Fallback
    weights.len() - 1
}

/// Single-point crossover: the child takes the head of one parent and the
/// tail of the other.
pub fn crossover_bits<R: Rng>(parent1: &Genome, parent2: &Genome, rng: &mut R) -> Genome {
    let len = parent1.len().min(parent2.len());
    if len <= 1 {
        return parent1.clone();
    }

    let point = rng.gen_range(1..len);

    let mut child = parent1.clone();
    child[point..len].copy_from_slice(&parent2[point..len]);
    child
}

/// Mutation: each bit flips independently with `mutation_probability`.
pub fn mutate_bits<R: Rng>(genome: &mut Genome, mutation_probability: f64, rng: &mut R) {
    for bit in genome.iter_mut() {
        if rng.gen::<f64>() < mutation_probability {
            *bit = 1 - *bit;
        }
    }
}

/// Count how many weights could ever win a roulette spin.
pub fn viable_count(weights: &[f64]) -> usize {
    weights.iter().filter(|w| **w > 0.0 && w.is_finite()).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn roulette_survives_zero_weights() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = vec![0.0, 0.0, 0.0];
        for _ in 0..50 {
            assert!(roulette_pick(&weights, &mut rng) < weights.len());
        }
    }

    #[test]
    fn roulette_honors_degenerate_distribution() {
        let mut rng = StdRng::seed_from_u64(7);
        let weights = vec![0.0, 3.5, 0.0];
        for _ in 0..50 {
            assert_eq!(roulette_pick(&weights, &mut rng), 1);
        }
    }

    #[test]
    fn mutation_probability_zero_is_identity() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = vec![1, 0, 1, 1, 0, 0, 1, 0];
        let original = genome.clone();
        mutate_bits(&mut genome, 0.0, &mut rng);
        assert_eq!(genome, original);
    }

    #[test]
    fn mutation_probability_one_flips_every_bit() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = vec![1, 0, 1, 1];
        mutate_bits(&mut genome, 1.0, &mut rng);
        assert_eq!(genome, vec![0, 1, 0, 0]);
    }

    #[test]
    fn crossover_preserves_length_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(7);
        let parent1 = vec![0; 16];
        let parent2 = vec![1; 16];
        let child = crossover_bits(&parent1, &parent2, &mut rng);
        assert_eq!(child.len(), 16);
        // Head comes from parent1, tail from parent2.
        assert_eq!(child[0], 0);
        assert_eq!(child[15], 1);
    }
}
