//! Minimal, tolerant SSZ primitives for decoding era-file block bytes.
//!
//! Unlike a strict SSZ decoder, the functions here never fail on
//! out-of-bounds reads: era archives are expected to outlive the schema
//! that produced them, so forward-compatible tolerance is load-bearing,
//! not a shortcut.

mod error;
mod list;
mod primitives;

pub use error::SszError;
pub use list::{ItemParser, fallback_count, parse_ssz_list, reset_fallback_count};
pub use primitives::{read_u32_le, read_u64_le};
