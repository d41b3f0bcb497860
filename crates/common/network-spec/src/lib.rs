mod fork;
mod networks;

pub use fork::Fork;
pub use networks::{Network, NetworkSpec, UnknownNetwork, mainnet, gnosis, sepolia, spec_for};
