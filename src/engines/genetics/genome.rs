/// Genome representation for the evolution engine
///
/// A genome is a fixed-length sequence of bits that deterministically maps to
/// the control parameters of a simulated agent. Each consecutive 16-bit word
/// is decoded by the codec into one half-precision parameter value.
///
/// # Why bit strings instead of parameter vectors?
///
/// Genetic algorithms work best on simple, linear structures:
/// - **Crossover**: swapping genome segments is trivial (slice splicing)
/// - **Mutation**: flipping individual bits is straightforward
/// - **No invalid states**: any bit string decodes to a parameter vector
///
/// # Conversion
///
/// Use `codec::decode_parameters()` to convert Genome -> Vec<f64>
pub type Bit = u8;

pub type Genome = Vec<Bit>;

/// The population of genomes alive at one evolutionary step. Index-addressed;
/// never mutated after creation.
pub type Generation = Vec<Genome>;

/// A genome's bit sequence rendered as a canonical string (i.e. '1010011'),
/// used as a content-addressed fitness lookup key. Two genomes with identical
/// bits produce identical keys.
pub type GenomeKey = String;

pub fn is_bit(value: Bit) -> bool {
    value <= 1
}

/// Render a genome as its canonical content key.
pub fn genome_key(genome: &Genome) -> GenomeKey {
    genome
        .iter()
        .map(|bit| if *bit == 0 { '0' } else { '1' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_genomes_share_a_key() {
        let a: Genome = vec![1, 0, 1, 1, 0];
        let b: Genome = vec![1, 0, 1, 1, 0];
        assert_eq!(genome_key(&a), genome_key(&b));
        assert_eq!(genome_key(&a), "10110");
    }
}
