use serde::{Deserialize, Serialize};

use era_ssz::{ItemParser, parse_ssz_list, read_u32_le, read_u64_le};

use crate::hexutil::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub pubkey: String,
    pub withdrawal_credentials: String,
    pub amount: u64,
    pub signature: String,
    pub index: u64,
}

impl DepositRequest {
    pub const SSZ_SIZE: usize = 192;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            pubkey: to_hex(&bytes[0..48]),
            withdrawal_credentials: to_hex(&bytes[48..80]),
            amount: read_u64_le(bytes, 80),
            signature: to_hex(&bytes[88..184]),
            index: read_u64_le(bytes, 184),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    pub source_address: String,
    pub validator_pubkey: String,
    pub amount: u64,
}

impl WithdrawalRequest {
    pub const SSZ_SIZE: usize = 76;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            source_address: to_hex(&bytes[0..20]),
            validator_pubkey: to_hex(&bytes[20..68]),
            amount: read_u64_le(bytes, 68),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidationRequest {
    pub source_address: String,
    pub source_pubkey: String,
    pub target_pubkey: String,
}

impl ConsolidationRequest {
    pub const SSZ_SIZE: usize = 116;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SSZ_SIZE {
            return None;
        }
        Some(Self {
            source_address: to_hex(&bytes[0..20]),
            source_pubkey: to_hex(&bytes[20..68]),
            target_pubkey: to_hex(&bytes[68..116]),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExecutionRequests {
    pub deposits: Vec<DepositRequest>,
    pub withdrawals: Vec<WithdrawalRequest>,
    pub consolidations: Vec<ConsolidationRequest>,
}

impl ExecutionRequests {
    /// Three leading `u32` offsets, one per inner list.
    const HEADER_SIZE: usize = 12;

    pub fn parse(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::HEADER_SIZE {
            return None;
        }
        let offsets = [
            read_u32_le(bytes, 0) as usize,
            read_u32_le(bytes, 4) as usize,
            read_u32_le(bytes, 8) as usize,
        ];
        for &offset in &offsets {
            if offset > bytes.len() {
                return None;
            }
        }
        let end = |i: usize| -> usize {
            offsets
                .iter()
                .skip(i + 1)
                .copied()
                .find(|&o| o >= offsets[i])
                .unwrap_or(bytes.len())
        };

        let deposits_parser = ItemParser::fixed(DepositRequest::SSZ_SIZE, DepositRequest::parse);
        let withdrawals_parser =
            ItemParser::fixed(WithdrawalRequest::SSZ_SIZE, WithdrawalRequest::parse);
        let consolidations_parser =
            ItemParser::fixed(ConsolidationRequest::SSZ_SIZE, ConsolidationRequest::parse);

        Some(Self {
            deposits: parse_ssz_list(
                &bytes[offsets[0]..end(0)],
                &deposits_parser,
                "execution_requests.deposits",
            ),
            withdrawals: parse_ssz_list(
                &bytes[offsets[1]..end(1)],
                &withdrawals_parser,
                "execution_requests.withdrawals",
            ),
            consolidations: parse_ssz_list(
                &bytes[offsets[2]..end(2)],
                &consolidations_parser,
                "execution_requests.consolidations",
            ),
        })
    }
}
