use evosim::engines::genetics::{bits_to_f16, Bit};

fn bits(pattern: &str) -> Vec<Bit> {
    pattern
        .chars()
        .map(|c| if c == '1' { 1 } else { 0 })
        .collect()
}

/// Reference vectors for the half-precision layout. Every listed value is
/// exactly representable, so the assertions are exact rather than
/// approximate.
const TEST_CASES_16_BITS: [(f64, &str); 16] = [
    (-65504.0, "1111101111111111"),
    (-10344.0, "1111000100001101"),
    (-27.15625, "1100111011001010"),
    (-1.0, "1011110000000000"),
    (-0.0999755859375, "1010111001100110"),
    (0.0, "0000000000000000"),
    (5.9604644775390625e-8, "0000000000000001"),
    (4.5299530029296875e-6, "0000000001001100"),
    (0.0999755859375, "0010111001100110"),
    (0.199951171875, "0011001001100110"),
    (0.300048828125, "0011010011001101"),
    (1.0, "0011110000000000"),
    (1.5, "0011111000000000"),
    (1.75, "0011111100000000"),
    (1.875, "0011111110000000"),
    (65504.0, "0111101111111111"),
];

#[test]
fn converts_binary_bits_to_decimal_numbers() {
    for (decimal, binary) in TEST_CASES_16_BITS {
        let decoded = bits_to_f16(&bits(binary)).unwrap();
        assert_eq!(decoded, decimal, "decoding {}", binary);
    }
}

#[test]
fn decoding_is_a_pure_function() {
    let word = bits("0011010011001101");
    let first = bits_to_f16(&word).unwrap();
    let second = bits_to_f16(&word).unwrap();
    assert_eq!(first, second);
}

#[test]
fn negative_zero_keeps_its_sign() {
    let decoded = bits_to_f16(&bits("1000000000000000")).unwrap();
    assert_eq!(decoded, 0.0);
    assert!(decoded.is_sign_negative());
}

#[test]
fn subnormals_are_reproduced_exactly() {
    // Smallest positive subnormal: 2^-24.
    let decoded = bits_to_f16(&bits("0000000000000001")).unwrap();
    assert_eq!(decoded, 2.0_f64.powi(-24));

    let decoded = bits_to_f16(&bits("1000000000000001")).unwrap();
    assert_eq!(decoded, -(2.0_f64.powi(-24)));
}

#[test]
fn malformed_length_is_rejected_not_coerced() {
    assert!(bits_to_f16(&bits("00111100000000")).is_err());
    assert!(bits_to_f16(&bits("001111000000000000")).is_err());
    assert!(bits_to_f16(&[]).is_err());
}
