use crate::engines::genetics::genome::{is_bit, Bit, Genome};
use crate::error::{EvosimError, Result};

/// Bits per encoded parameter word: 1 sign, 5 exponent, 10 mantissa.
pub const PARAMETER_BITS: usize = 16;

const EXPONENT_BITS: usize = 5;
const EXPONENT_BIAS: i32 = 15;

/// Decode a 16-bit sequence into its half-precision floating point value.
///
/// The layout is the IEEE 754 binary16 one: sign, 5 exponent bits (bias 15),
/// 10 mantissa bits, most significant bit first. A zero exponent field
/// denotes a subnormal (including signed zero); an all-ones exponent field
/// denotes infinity or NaN. Pure and bit-exact: the same input always yields
/// the same value.
pub fn bits_to_f16(bits: &[Bit]) -> Result<f64> {
    if bits.len() != PARAMETER_BITS {
        return Err(EvosimError::Codec(format!(
            "expected {} bits, got {}",
            PARAMETER_BITS,
            bits.len()
        )));
    }
    if let Some(bad) = bits.iter().find(|bit| !is_bit(**bit)) {
        return Err(EvosimError::Codec(format!("invalid bit value {}", bad)));
    }

    let sign = if bits[0] == 1 { -1.0 } else { 1.0 };

    let mut exponent: u32 = 0;
    for bit in &bits[1..1 + EXPONENT_BITS] {
        exponent = (exponent << 1) | u32::from(*bit);
    }

    let mut fraction: f64 = 0.0;
    for (position, bit) in bits[1 + EXPONENT_BITS..].iter().enumerate() {
        if *bit == 1 {
            fraction += (2.0_f64).powi(-(position as i32 + 1));
        }
    }

    let value = match exponent {
        // Subnormal range, signed zero included.
        0 => fraction * (2.0_f64).powi(1 - EXPONENT_BIAS),
        0b11111 => {
            if fraction == 0.0 {
                f64::INFINITY
            } else {
                f64::NAN
            }
        }
        _ => (1.0 + fraction) * (2.0_f64).powi(exponent as i32 - EXPONENT_BIAS),
    };

    Ok(sign * value)
}

/// Decode a genome into the parameter vector consumed by the agent simulator.
///
/// The genome is split into consecutive 16-bit words, each decoded with
/// [`bits_to_f16`]. The genome length must be an exact multiple of the word
/// width; anything else is a caller bug and is rejected, never truncated.
pub fn decode_parameters(genome: &Genome) -> Result<Vec<f64>> {
    if genome.len() % PARAMETER_BITS != 0 {
        return Err(EvosimError::Codec(format!(
            "genome length {} is not a multiple of {}",
            genome.len(),
            PARAMETER_BITS
        )));
    }
    genome.chunks(PARAMETER_BITS).map(bits_to_f16).collect()
}
