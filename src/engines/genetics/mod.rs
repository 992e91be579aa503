pub mod codec;
pub mod genome;
pub mod operators;
pub mod population;
pub mod selection;

pub use codec::{bits_to_f16, decode_parameters, PARAMETER_BITS};
pub use genome::{genome_key, Bit, Generation, Genome, GenomeKey};
pub use population::{create_generation, random_genome};
pub use selection::{select, SelectionProbabilities};
