//! Script opcode constants.
//!
//! Only the opcodes the engine pattern-matches or emits are named; any
//! other byte still decodes as an anonymous opcode chunk.

/// Push an empty byte vector onto the stack.
pub const OP_0: u8 = 0x00;
/// Alias for OP_0.
pub const OP_FALSE: u8 = 0x00;

/// Smallest direct data push (1 byte).
pub const OP_DATA_1: u8 = 0x01;
/// Direct push of 20 bytes (hash160 payloads).
pub const OP_DATA_20: u8 = 0x14;
/// Direct push of 32 bytes (sha256 payloads).
pub const OP_DATA_32: u8 = 0x20;
/// Direct push of 33 bytes (compressed public keys).
pub const OP_DATA_33: u8 = 0x21;
/// Direct push of 65 bytes (uncompressed public keys).
pub const OP_DATA_65: u8 = 0x41;
/// Largest direct data push (75 bytes).
pub const OP_DATA_75: u8 = 0x4b;

/// Next byte is the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;
/// Next two bytes (LE) are the push length.
pub const OP_PUSHDATA2: u8 = 0x4d;
/// Next four bytes (LE) are the push length.
pub const OP_PUSHDATA4: u8 = 0x4e;

/// Push the number -1.
pub const OP_1NEGATE: u8 = 0x4f;
/// Push the number 1.
pub const OP_1: u8 = 0x51;
/// Push the number 2.
pub const OP_2: u8 = 0x52;
/// Push the number 3.
pub const OP_3: u8 = 0x53;
/// Push the number 16.
pub const OP_16: u8 = 0x60;

/// Flow control.
pub const OP_IF: u8 = 0x63;
pub const OP_NOTIF: u8 = 0x64;
pub const OP_VERIF: u8 = 0x65;
pub const OP_VERNOTIF: u8 = 0x66;
pub const OP_ELSE: u8 = 0x67;
pub const OP_ENDIF: u8 = 0x68;
pub const OP_VERIFY: u8 = 0x69;
/// Mark the output as unspendable data carrier.
pub const OP_RETURN: u8 = 0x6a;

/// Stack operations.
pub const OP_DUP: u8 = 0x76;

/// Comparison.
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;

/// Crypto.
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKSIGVERIFY: u8 = 0xad;
pub const OP_CHECKMULTISIG: u8 = 0xae;
pub const OP_CHECKMULTISIGVERIFY: u8 = 0xaf;

/// Check whether `op` encodes a small integer (OP_0 or OP_1..OP_16).
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// `true` for OP_0 and OP_1 through OP_16.
pub fn is_small_int_op(op: u8) -> bool {
    op == OP_0 || (OP_1..=OP_16).contains(&op)
}

/// Decode a small-int opcode to its numeric value.
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// `Some(0..=16)` for OP_0/OP_1..OP_16, `None` otherwise.
pub fn small_int_value(op: u8) -> Option<usize> {
    if op == OP_0 {
        Some(0)
    } else if (OP_1..=OP_16).contains(&op) {
        Some((op - OP_1 + 1) as usize)
    } else {
        None
    }
}

/// Encode a small integer (0..=16) as its opcode.
///
/// # Arguments
/// * `n` - The value to encode.
///
/// # Returns
/// `Some(opcode)` for 0..=16, `None` otherwise.
pub fn small_int_opcode(n: usize) -> Option<u8> {
    match n {
        0 => Some(OP_0),
        1..=16 => Some(OP_1 + (n as u8) - 1),
        _ => None,
    }
}

/// Render an opcode byte as its canonical OP_xxx name.
///
/// # Arguments
/// * `op` - The opcode byte.
///
/// # Returns
/// The canonical name, or `OP_UNKNOWN_<hex>` for unnamed bytes.
pub fn opcode_to_string(op: u8) -> String {
    match op {
        OP_0 => "OP_FALSE".to_string(),
        OP_PUSHDATA1 => "OP_PUSHDATA1".to_string(),
        OP_PUSHDATA2 => "OP_PUSHDATA2".to_string(),
        OP_PUSHDATA4 => "OP_PUSHDATA4".to_string(),
        OP_1NEGATE => "OP_1NEGATE".to_string(),
        OP_1..=OP_16 => format!("OP_{}", op - OP_1 + 1),
        OP_IF => "OP_IF".to_string(),
        OP_NOTIF => "OP_NOTIF".to_string(),
        OP_ELSE => "OP_ELSE".to_string(),
        OP_ENDIF => "OP_ENDIF".to_string(),
        OP_VERIFY => "OP_VERIFY".to_string(),
        OP_RETURN => "OP_RETURN".to_string(),
        OP_DUP => "OP_DUP".to_string(),
        OP_EQUAL => "OP_EQUAL".to_string(),
        OP_EQUALVERIFY => "OP_EQUALVERIFY".to_string(),
        OP_HASH160 => "OP_HASH160".to_string(),
        OP_CHECKSIG => "OP_CHECKSIG".to_string(),
        OP_CHECKSIGVERIFY => "OP_CHECKSIGVERIFY".to_string(),
        OP_CHECKMULTISIG => "OP_CHECKMULTISIG".to_string(),
        OP_CHECKMULTISIGVERIFY => "OP_CHECKMULTISIGVERIFY".to_string(),
        _ => format!("OP_UNKNOWN_{:02x}", op),
    }
}

/// Parse a canonical OP_xxx name back to its opcode byte.
///
/// # Arguments
/// * `name` - The opcode name (e.g. "OP_DUP").
///
/// # Returns
/// `Some(opcode)` if the name is recognized.
pub fn string_to_opcode(name: &str) -> Option<u8> {
    match name {
        "OP_0" | "OP_FALSE" => Some(OP_0),
        "OP_PUSHDATA1" => Some(OP_PUSHDATA1),
        "OP_PUSHDATA2" => Some(OP_PUSHDATA2),
        "OP_PUSHDATA4" => Some(OP_PUSHDATA4),
        "OP_1NEGATE" => Some(OP_1NEGATE),
        "OP_IF" => Some(OP_IF),
        "OP_NOTIF" => Some(OP_NOTIF),
        "OP_ELSE" => Some(OP_ELSE),
        "OP_ENDIF" => Some(OP_ENDIF),
        "OP_VERIFY" => Some(OP_VERIFY),
        "OP_RETURN" => Some(OP_RETURN),
        "OP_DUP" => Some(OP_DUP),
        "OP_EQUAL" => Some(OP_EQUAL),
        "OP_EQUALVERIFY" => Some(OP_EQUALVERIFY),
        "OP_HASH160" => Some(OP_HASH160),
        "OP_CHECKSIG" => Some(OP_CHECKSIG),
        "OP_CHECKSIGVERIFY" => Some(OP_CHECKSIGVERIFY),
        "OP_CHECKMULTISIG" => Some(OP_CHECKMULTISIG),
        "OP_CHECKMULTISIGVERIFY" => Some(OP_CHECKMULTISIGVERIFY),
        _ => {
            // OP_1..OP_16 numeric names.
            let n: usize = name.strip_prefix("OP_")?.parse().ok()?;
            if (1..=16).contains(&n) {
                small_int_opcode(n)
            } else {
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_int_roundtrip() {
        for n in 0..=16usize {
            let op = small_int_opcode(n).expect("in range");
            assert!(is_small_int_op(op));
            assert_eq!(small_int_value(op), Some(n));
        }
        assert!(small_int_opcode(17).is_none());
        assert!(!is_small_int_op(OP_DUP));
    }

    #[test]
    fn test_opcode_name_roundtrip() {
        for op in [OP_DUP, OP_HASH160, OP_EQUAL, OP_CHECKSIG, OP_CHECKMULTISIG, OP_2, OP_16] {
            let name = opcode_to_string(op);
            assert_eq!(string_to_opcode(&name), Some(op), "roundtrip for {}", name);
        }
    }

    #[test]
    fn test_unknown_opcode_name() {
        assert_eq!(opcode_to_string(0xba), "OP_UNKNOWN_ba");
        assert_eq!(string_to_opcode("OP_BOGUS"), None);
    }
}
