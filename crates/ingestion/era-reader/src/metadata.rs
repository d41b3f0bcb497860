use era_network_spec::{Network, NetworkSpec, spec_for};

use crate::error::ReaderError;

/// Metadata recovered from an era filename of the form
/// `<network>-<era5digits>[-<8hex>].era`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EraMetadata {
    pub network: Network,
    pub era_number: u64,
    /// Defaults to the literal string `"unknown"` rather than `None` when
    /// absent from the filename, matching the original tool's behavior.
    pub hash: String,
    pub start_slot: u64,
    pub end_slot: u64,
}

impl EraMetadata {
    pub fn from_filename(filename: &str) -> Result<Self, ReaderError> {
        let stem = filename.strip_suffix(".era").unwrap_or(filename);
        let parts: Vec<&str> = stem.split('-').collect();
        if parts.len() < 2 {
            return Err(ReaderError::InvalidFilename {
                filename: filename.to_string(),
            });
        }

        let network = Network::detect_from_filename(stem);

        let era_number = parts
            .iter()
            .find_map(|part| part.parse::<u64>().ok())
            .ok_or_else(|| ReaderError::InvalidFilename {
                filename: filename.to_string(),
            })?;

        let hash = parts
            .iter()
            .rev()
            .find(|part| part.len() == 8 && part.chars().all(|c| c.is_ascii_hexdigit()))
            .map(|part| part.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let spec: NetworkSpec = spec_for(network);
        let spr = spec.slots_per_historical_root;

        Ok(Self {
            network,
            era_number,
            hash,
            start_slot: era_number * spr,
            end_slot: era_number * spr + spr - 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_filename() {
        let meta = EraMetadata::from_filename("mainnet-01082-abcd1234.era").unwrap();
        assert_eq!(meta.network, Network::Mainnet);
        assert_eq!(meta.era_number, 1082);
        assert_eq!(meta.hash, "abcd1234");
        assert_eq!(meta.start_slot, 1082 * 8192);
    }

    #[test]
    fn defaults_hash_to_unknown_without_one() {
        let meta = EraMetadata::from_filename("gnosis-00042.era").unwrap();
        assert_eq!(meta.hash, "unknown");
        assert_eq!(meta.network, Network::Gnosis);
    }

    #[test]
    fn rejects_filename_without_era_number() {
        assert!(EraMetadata::from_filename("mainnet.era").is_err());
    }
}
