//! Chain registry for the networks the auction platform serves.

/// Ethereum mainnet.
pub const MAINNET: u64 = 1;
/// Goerli testnet.
pub const GOERLI: u64 = 5;
/// Gnosis Chain (formerly xDai).
pub const XDAI: u64 = 100;
/// Polygon PoS mainnet.
pub const POLYGON: u64 = 137;
/// Mumbai testnet.
pub const MUMBAI: u64 = 80001;

/// All chain ids the platform knows about.
pub const SUPPORTED_CHAINS: [u64; 5] = [MAINNET, GOERLI, XDAI, POLYGON, MUMBAI];

/// Map a chain id to the network name understood by the decryption service.
///
/// The mapping is total: unrecognized ids fall back to the primary
/// network's name.
pub fn chain_name(chain_id: u64) -> &'static str {
    match chain_id {
        MAINNET => "ethereum",
        GOERLI => "goerli",
        XDAI => "xdai",
        POLYGON => "polygon",
        MUMBAI => "mumbai",
        _ => "ethereum",
    }
}

/// Whether the platform serves this chain id.
pub fn is_supported(chain_id: u64) -> bool {
    SUPPORTED_CHAINS.contains(&chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_chain_names() {
        assert_eq!(chain_name(1), "ethereum");
        assert_eq!(chain_name(5), "goerli");
        assert_eq!(chain_name(100), "xdai");
        assert_eq!(chain_name(137), "polygon");
        assert_eq!(chain_name(80001), "mumbai");
    }

    #[test]
    fn test_unknown_chain_falls_back_to_ethereum() {
        assert_eq!(chain_name(0), "ethereum");
        assert_eq!(chain_name(42), "ethereum");
        assert_eq!(chain_name(u64::MAX), "ethereum");
    }

    #[test]
    fn test_is_supported() {
        for chain_id in SUPPORTED_CHAINS {
            assert!(is_supported(chain_id));
        }
        assert!(!is_supported(0));
        assert!(!is_supported(42));
    }
}
