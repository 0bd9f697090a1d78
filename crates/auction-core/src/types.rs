//! Core domain types.

use std::fmt;

/// Identifies a specific batch auction on a specific network.
///
/// Immutable for the duration of one resolution cycle; supplied by the
/// caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuctionIdentifier {
    pub auction_id: u64,
    pub chain_id: u64,
}

impl AuctionIdentifier {
    pub fn new(auction_id: u64, chain_id: u64) -> Self {
        Self {
            auction_id,
            chain_id,
        }
    }
}

impl fmt::Display for AuctionIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "auction {} (chain {})", self.auction_id, self.chain_id)
    }
}
