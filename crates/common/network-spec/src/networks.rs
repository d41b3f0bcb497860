use serde::{Deserialize, Serialize};

use crate::fork::Fork;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    Mainnet,
    Gnosis,
    Sepolia,
}

impl Network {
    /// Detects a network from an era filename's leading substring, falling
    /// back to mainnet when nothing else matches.
    pub fn detect_from_filename(filename: &str) -> Network {
        if filename.contains("gnosis") {
            Network::Gnosis
        } else if filename.contains("sepolia") {
            Network::Sepolia
        } else {
            Network::Mainnet
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Gnosis => "gnosis",
            Network::Sepolia => "sepolia",
        }
    }
}

impl std::fmt::Display for Network {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(String);

impl std::str::FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "gnosis" => Ok(Network::Gnosis),
            "sepolia" => Ok(Network::Sepolia),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// Genesis time, slot timing, and fork-activation epochs for one network.
#[derive(Debug, Clone, Copy)]
pub struct NetworkSpec {
    pub network: Network,
    pub genesis_time: u64,
    pub seconds_per_slot: u64,
    pub slots_per_epoch: u64,
    pub slots_per_historical_root: u64,
    pub altair_epoch: u64,
    pub bellatrix_epoch: u64,
    pub capella_epoch: u64,
    pub deneb_epoch: u64,
    pub electra_epoch: u64,
}

impl NetworkSpec {
    pub fn epoch_for_slot(&self, slot: u64) -> u64 {
        slot / self.slots_per_epoch
    }

    /// Selects the latest fork whose activation epoch has been reached.
    pub fn fork_for_slot(&self, slot: u64) -> Fork {
        let epoch = self.epoch_for_slot(slot);
        if epoch >= self.electra_epoch {
            Fork::Electra
        } else if epoch >= self.deneb_epoch {
            Fork::Deneb
        } else if epoch >= self.capella_epoch {
            Fork::Capella
        } else if epoch >= self.bellatrix_epoch {
            Fork::Bellatrix
        } else if epoch >= self.altair_epoch {
            Fork::Altair
        } else {
            Fork::Phase0
        }
    }

    pub fn genesis_plus_slot(&self, slot: u64) -> u64 {
        self.genesis_time + slot * self.seconds_per_slot
    }
}

pub const fn mainnet() -> NetworkSpec {
    NetworkSpec {
        network: Network::Mainnet,
        genesis_time: 1_606_824_023,
        seconds_per_slot: 12,
        slots_per_epoch: 32,
        slots_per_historical_root: 8192,
        altair_epoch: 74_240,
        bellatrix_epoch: 144_896,
        capella_epoch: 194_048,
        deneb_epoch: 269_568,
        electra_epoch: u64::MAX,
    }
}

pub const fn gnosis() -> NetworkSpec {
    NetworkSpec {
        network: Network::Gnosis,
        genesis_time: 1_638_993_340,
        seconds_per_slot: 5,
        slots_per_epoch: 16,
        slots_per_historical_root: 8192,
        altair_epoch: 512,
        bellatrix_epoch: 385_536,
        capella_epoch: 648_704,
        deneb_epoch: 889_856,
        electra_epoch: 1_337_856,
    }
}

pub const fn sepolia() -> NetworkSpec {
    NetworkSpec {
        network: Network::Sepolia,
        genesis_time: 1_655_733_600,
        seconds_per_slot: 12,
        slots_per_epoch: 32,
        slots_per_historical_root: 8192,
        altair_epoch: 50,
        bellatrix_epoch: 100,
        capella_epoch: 56_832,
        deneb_epoch: 132_608,
        electra_epoch: u64::MAX,
    }
}

pub fn spec_for(network: Network) -> NetworkSpec {
    match network {
        Network::Mainnet => mainnet(),
        Network::Gnosis => gnosis(),
        Network::Sepolia => sepolia(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::phase0_genesis(Network::Mainnet, 0, Fork::Phase0)]
    #[case::bellatrix_at_the_merge(Network::Mainnet, 144_896 * 32, Fork::Bellatrix)]
    #[case::mainnet_caps_at_deneb(Network::Mainnet, 400_000 * 32, Fork::Deneb)]
    #[case::gnosis_reaches_electra(Network::Gnosis, 1_337_856 * 16, Fork::Electra)]
    fn fork_for_slot_selects_the_active_fork(#[case] network: Network, #[case] slot: u64, #[case] expected: Fork) {
        assert_eq!(spec_for(network).fork_for_slot(slot), expected);
    }

    #[test]
    fn parses_network_names_case_insensitively() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!("GNOSIS".parse::<Network>().unwrap(), Network::Gnosis);
        assert!("holesky".parse::<Network>().is_err());
    }

    #[test]
    fn detects_network_from_filename() {
        assert_eq!(
            Network::detect_from_filename("gnosis-01082-abcd1234.era"),
            Network::Gnosis
        );
        assert_eq!(
            Network::detect_from_filename("mainnet-01082-abcd1234.era"),
            Network::Mainnet
        );
        assert_eq!(
            Network::detect_from_filename("unknown-01082.era"),
            Network::Mainnet
        );
    }
}
