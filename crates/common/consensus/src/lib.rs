//! Fork-aware SSZ decoding of beacon-chain blocks: Phase0 through Electra
//! share a generic body decoder driven by a per-fork [`schema::BodySchema`]
//! value rather than a parser-subclass chain.

mod body;
mod block;
mod error;
mod hexutil;
mod schema;
pub mod types;

pub use body::{BeaconBlockBody, decode_body};
pub use block::{BeaconBlock, DecodedBlock, SignedBeaconBlock, decode_signed_block};
pub use error::ConsensusError;
pub use schema::{BodyField, BodySchema, body_schema, payload_shape};
