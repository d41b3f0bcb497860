use serde::{Deserialize, Serialize};

use era_ssz::{ItemParser, parse_ssz_list, read_u32_le, read_u64_le};

use crate::{hexutil::to_hex, types::withdrawal::Withdrawal};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionPayload {
    pub parent_hash: String,
    pub fee_recipient: String,
    pub state_root: String,
    pub receipts_root: String,
    pub logs_bloom: String,
    pub prev_randao: String,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: String,
    /// Decimal string: a `u256` never fits in a machine integer and must
    /// not be silently truncated to `u64`.
    pub base_fee_per_gas: String,
    pub block_hash: String,
    pub transactions: Vec<String>,
    pub withdrawals: Vec<Withdrawal>,
    pub blob_gas_used: Option<u64>,
    pub excess_blob_gas: Option<u64>,
}

/// Whether this fork's execution payload carries withdrawals / blob gas
/// fields, mirroring the fork-schema table rather than a per-fork struct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadShape {
    pub has_withdrawals: bool,
    pub has_blob_gas: bool,
}

impl ExecutionPayload {
    const FIXED_PREFIX: usize = 32 + 20 + 32 + 32 + 256 + 32 + 8 + 8 + 8 + 8; // 436

    pub fn parse(bytes: &[u8], shape: PayloadShape) -> Option<Self> {
        if bytes.len() < Self::FIXED_PREFIX + 4 + 32 + 32 + 4 {
            return None;
        }

        let parent_hash = to_hex(&bytes[0..32]);
        let fee_recipient = to_hex(&bytes[32..52]);
        let state_root = to_hex(&bytes[52..84]);
        let receipts_root = to_hex(&bytes[84..116]);
        let logs_bloom = to_hex(&bytes[116..372]);
        let prev_randao = to_hex(&bytes[372..404]);
        let block_number = read_u64_le(bytes, 404);
        let gas_limit = read_u64_le(bytes, 412);
        let gas_used = read_u64_le(bytes, 420);
        let timestamp = read_u64_le(bytes, 428);

        let mut cursor = Self::FIXED_PREFIX;
        let extra_data_offset = read_u32_le(bytes, cursor) as usize;
        cursor += 4;
        let base_fee_per_gas = u256_le_to_decimal(&bytes[cursor..cursor + 32]);
        cursor += 32;
        let block_hash = to_hex(&bytes[cursor..cursor + 32]);
        cursor += 32;
        let transactions_offset = read_u32_le(bytes, cursor) as usize;
        cursor += 4;

        let mut offsets = vec![extra_data_offset, transactions_offset];
        let withdrawals_offset = if shape.has_withdrawals {
            if bytes.len() < cursor + 4 {
                return None;
            }
            let offset = read_u32_le(bytes, cursor) as usize;
            cursor += 4;
            offsets.push(offset);
            Some(offset)
        } else {
            None
        };

        let (blob_gas_used, excess_blob_gas) = if shape.has_blob_gas {
            if bytes.len() < cursor + 16 {
                return None;
            }
            let blob_gas_used = read_u64_le(bytes, cursor);
            let excess_blob_gas = read_u64_le(bytes, cursor + 8);
            cursor += 16;
            (Some(blob_gas_used), Some(excess_blob_gas))
        } else {
            (None, None)
        };
        let _ = cursor;

        for &offset in &offsets {
            if offset > bytes.len() {
                return None;
            }
        }
        let end_of = |start: usize| -> usize {
            offsets
                .iter()
                .copied()
                .filter(|&o| o > start)
                .min()
                .unwrap_or(bytes.len())
        };

        let extra_data = to_hex(&bytes[extra_data_offset..end_of(extra_data_offset)]);

        let tx_span = &bytes[transactions_offset..end_of(transactions_offset)];
        let tx_parser = ItemParser::variable(|b: &[u8]| Some(to_hex(b)));
        let transactions = parse_ssz_list(tx_span, &tx_parser, "execution_payload.transactions");

        let withdrawals = match withdrawals_offset {
            Some(offset) => {
                let span = &bytes[offset..end_of(offset)];
                let parser = ItemParser::fixed(Withdrawal::SSZ_SIZE, Withdrawal::parse);
                parse_ssz_list(span, &parser, "execution_payload.withdrawals")
            }
            None => Vec::new(),
        };

        Some(Self {
            parent_hash,
            fee_recipient,
            state_root,
            receipts_root,
            logs_bloom,
            prev_randao,
            block_number,
            gas_limit,
            gas_used,
            timestamp,
            extra_data,
            base_fee_per_gas,
            block_hash,
            transactions,
            withdrawals,
            blob_gas_used,
            excess_blob_gas,
        })
    }
}

/// Converts a little-endian 256-bit integer into its decimal string
/// representation via repeated base-256-into-base-10 accumulation, since no
/// bignum type is in scope for a field this crate otherwise treats as
/// opaque bytes.
fn u256_le_to_decimal(bytes: &[u8]) -> String {
    let mut digits: Vec<u8> = vec![0];
    for &byte in bytes.iter().rev() {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let value = *digit as u32 * 256 + carry;
            *digit = (value % 10) as u8;
            carry = value / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }
    while digits.len() > 1 && *digits.last().unwrap() == 0 {
        digits.pop();
    }
    digits
        .iter()
        .rev()
        .map(|d| (b'0' + d) as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u256_zero_is_zero() {
        assert_eq!(u256_le_to_decimal(&[0u8; 32]), "0");
    }

    #[test]
    fn u256_small_value() {
        let mut bytes = [0u8; 32];
        bytes[0] = 42;
        assert_eq!(u256_le_to_decimal(&bytes), "42");
    }

    #[test]
    fn u256_beyond_u64_range() {
        // 2^64 represented little-endian
        let mut bytes = [0u8; 32];
        bytes[8] = 1;
        assert_eq!(u256_le_to_decimal(&bytes), "18446744073709551616");
    }
}
