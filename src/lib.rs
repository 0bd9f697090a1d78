//! Auction Client: Batch-Auction Off-Chain Services
//!
//! Root crate re-exporting the workspace members. For actual
//! functionality, use the individual crates directly:
//!
//! - `auction-core`: chain registry, domain types, configuration, and the
//!   additional-services API client
//! - `bid-access`: wallet sessions, sign-in authorization signatures,
//!   access-control conditions, and the decryption gateway client
//! - `signature-resolver`: the gated bid-signature resolution flow

pub use auction_core as core;
pub use bid_access as access;
pub use signature_resolver as resolver;
