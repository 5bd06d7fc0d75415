/// Fee estimation from script templates.
///
/// Sizes are conservative upper bounds on the serialized cost each
/// input or output adds to a transaction. Overestimating slightly
/// overpays; underestimating produces transactions that relay poorly,
/// so unknown templates use the largest input size.

use coinkit_script::ScriptTemplate;

/// Version, input/output counts, and lock time.
pub const TX_OVERHEAD_SIZE: u64 = 10;

/// P2PKH input: outpoint + DER signature + compressed pubkey pushes.
pub const P2PKH_INPUT_SIZE: u64 = 148;
/// P2WPKH input: outpoint + empty scriptSig; witness bytes discounted.
pub const P2WPKH_INPUT_SIZE: u64 = 68;
/// P2WSH input upper bound for a small witness script.
pub const P2WSH_INPUT_SIZE: u64 = 105;
/// Bare P2PK input: outpoint + signature push only.
pub const P2PK_INPUT_SIZE: u64 = 116;

/// P2PKH output: value + 25-byte script.
pub const P2PKH_OUTPUT_SIZE: u64 = 34;
/// P2SH output: value + 23-byte script.
pub const P2SH_OUTPUT_SIZE: u64 = 32;
/// P2WPKH output: value + 22-byte program.
pub const P2WPKH_OUTPUT_SIZE: u64 = 31;
/// P2WSH output: value + 34-byte program.
pub const P2WSH_OUTPUT_SIZE: u64 = 43;
/// Bare P2PK output: value + 35-byte script.
pub const P2PK_OUTPUT_SIZE: u64 = 44;

/// Serialized cost of spending an output of the given template.
///
/// P2SH, multisig, and unrecognized templates fall back to the largest
/// single-key estimate.
pub fn input_size(template: ScriptTemplate) -> u64 {
    match template {
        ScriptTemplate::PayToWitnessPublicKeyHash => P2WPKH_INPUT_SIZE,
        ScriptTemplate::PayToWitnessScriptHash => P2WSH_INPUT_SIZE,
        ScriptTemplate::PayToPublicKey => P2PK_INPUT_SIZE,
        _ => P2PKH_INPUT_SIZE,
    }
}

/// Serialized cost of an output of the given template.
pub fn output_size(template: ScriptTemplate) -> u64 {
    match template {
        ScriptTemplate::PayToScriptHash => P2SH_OUTPUT_SIZE,
        ScriptTemplate::PayToWitnessPublicKeyHash => P2WPKH_OUTPUT_SIZE,
        ScriptTemplate::PayToWitnessScriptHash => P2WSH_OUTPUT_SIZE,
        ScriptTemplate::PayToPublicKey => P2PK_OUTPUT_SIZE,
        _ => P2PKH_OUTPUT_SIZE,
    }
}

/// Estimated serialized size for a transaction spending the given input
/// templates into the given output templates.
///
/// # Arguments
/// * `input_templates` - Template of the locking script of each spent output.
/// * `output_templates` - Template of each created output.
pub fn estimated_size(
    input_templates: &[ScriptTemplate],
    output_templates: &[ScriptTemplate],
) -> u64 {
    TX_OVERHEAD_SIZE
        + input_templates.iter().map(|t| input_size(*t)).sum::<u64>()
        + output_templates.iter().map(|t| output_size(*t)).sum::<u64>()
}

/// Flat conservative fee estimate that assumes every input is the
/// largest single-key spend and every output is P2PKH.
///
/// # Arguments
/// * `input_count` - Number of inputs.
/// * `output_count` - Number of outputs.
/// * `byte_fee` - Fee rate in base units per byte.
pub fn calculate_fee(input_count: usize, output_count: usize, byte_fee: u64) -> u64 {
    let size = TX_OVERHEAD_SIZE
        + input_count as u64 * P2PKH_INPUT_SIZE
        + output_count as u64 * P2PKH_OUTPUT_SIZE;
    size * byte_fee
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Known sizes: one P2PKH input, two P2PKH outputs.
    #[test]
    fn test_estimated_size_p2pkh() {
        let size = estimated_size(
            &[ScriptTemplate::PayToPublicKeyHash],
            &[
                ScriptTemplate::PayToPublicKeyHash,
                ScriptTemplate::PayToPublicKeyHash,
            ],
        );
        assert_eq!(size, 10 + 148 + 34 + 34);
    }

    /// Segwit inputs are cheaper than legacy; unknown falls back to the
    /// conservative legacy estimate.
    #[test]
    fn test_input_size_ordering() {
        assert!(input_size(ScriptTemplate::PayToWitnessPublicKeyHash)
            < input_size(ScriptTemplate::PayToPublicKeyHash));
        assert_eq!(
            input_size(ScriptTemplate::Unknown),
            input_size(ScriptTemplate::PayToPublicKeyHash)
        );
        assert_eq!(
            input_size(ScriptTemplate::PayToScriptHash),
            P2PKH_INPUT_SIZE
        );
    }

    /// calculate_fee agrees with the flat formula.
    #[test]
    fn test_calculate_fee() {
        assert_eq!(calculate_fee(1, 2, 1), 10 + 148 + 68);
        assert_eq!(calculate_fee(2, 2, 3), 3 * (10 + 296 + 68));
        assert_eq!(calculate_fee(0, 0, 5), 50);
    }

    /// Fee is monotonically non-decreasing in both counts and in rate.
    #[test]
    fn test_fee_monotonic()  {
        for inputs in 0..8 {
            for outputs in 0..8 {
                for rate in 1..4u64 {
                    let base = calculate_fee(inputs, outputs, rate);
                    assert!(calculate_fee(inputs + 1, outputs, rate) > base);
                    assert!(calculate_fee(inputs, outputs + 1, rate) > base);
                    assert!(calculate_fee(inputs, outputs, rate + 1) > base);
                }
            }
        }
    }
}
