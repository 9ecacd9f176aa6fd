//! Quantity formatting between JSON-RPC representations
//!
//! Pure, stateless conversions. JSON-RPC encodes quantities as 0x-prefixed
//! hex strings; callers sometimes hold them as decimal strings or native
//! integers. Everything here is side-effect free.

use ethers::types::{H256, U256};

use crate::error::{ClientError, ClientResult};

/// Target representation for a formatted quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// 0x-prefixed hexadecimal, the wire encoding
    Hex,
    /// Base-10 string
    Decimal,
}

/// Format a quantity in the requested representation.
pub fn format_quantity(value: U256, target: Representation) -> String {
    match target {
        Representation::Hex => format!("{value:#x}"),
        Representation::Decimal => value.to_string(),
    }
}

/// Parse a quantity from either wire or decimal form.
pub fn parse_quantity(raw: &str) -> ClientResult<U256> {
    let parsed = if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        U256::from_str_radix(hex, 16)
            .map_err(|e| ClientError::Validation(format!("invalid hex quantity {raw:?}: {e}")))
    } else {
        U256::from_dec_str(raw)
            .map_err(|e| ClientError::Validation(format!("invalid decimal quantity {raw:?}: {e}")))
    }?;
    Ok(parsed)
}

/// Parse a block number quantity into a native integer.
pub fn parse_block_number(raw: &str) -> ClientResult<u64> {
    let value = parse_quantity(raw)?;
    if value > U256::from(u64::MAX) {
        return Err(ClientError::Validation(format!(
            "block number {raw:?} exceeds u64 range"
        )));
    }
    Ok(value.as_u64())
}

/// Truncate a transaction hash for log lines.
pub fn truncate_hash(hash: &H256) -> String {
    let hex = hex::encode(hash.as_bytes());
    format!("0x{}..", &hex[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_both_representations() {
        let value = U256::from(255u64);
        assert_eq!(format_quantity(value, Representation::Hex), "0xff");
        assert_eq!(format_quantity(value, Representation::Decimal), "255");
        assert_eq!(format_quantity(U256::zero(), Representation::Hex), "0x0");
    }

    #[test]
    fn parses_hex_and_decimal() {
        assert_eq!(parse_quantity("0xff").unwrap(), U256::from(255u64));
        assert_eq!(parse_quantity("255").unwrap(), U256::from(255u64));
        assert_eq!(parse_block_number("0xa").unwrap(), 10);
        assert!(parse_quantity("0xzz").is_err());
        assert!(parse_quantity("not a number").is_err());
    }

    #[test]
    fn truncates_hash_for_display() {
        let hash = H256::from_low_u64_be(0xdead);
        let shown = truncate_hash(&hash);
        assert_eq!(shown, "0x00000000..");
        assert_eq!(shown.len(), 12);
    }
}
