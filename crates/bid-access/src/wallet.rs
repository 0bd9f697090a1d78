//! Bidder wallet management for sign-in signatures.
//!
//! Provides wallet loading from environment variables and EIP-191 personal
//! signing for the auction sign-in challenge.

use alloy_primitives::Address;
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::str::FromStr;

/// A connected wallet able to personal-sign text.
///
/// This is the provider handle the signature resolver receives; absence of
/// a session is a missing precondition for resolution, not an error.
#[async_trait]
pub trait WalletSession: Send + Sync {
    /// The wallet's Ethereum address.
    fn address(&self) -> Address;

    /// Sign a text message using EIP-191 personal sign, returning the
    /// 65-byte signature.
    async fn sign_text(&self, message: &str) -> Result<Vec<u8>>;
}

/// Local-key wallet backed by an in-memory secp256k1 signer.
#[derive(Clone)]
pub struct BidderWallet {
    signer: PrivateKeySigner,
    address: Address,
}

impl BidderWallet {
    /// Load the wallet from the `BIDDER_PRIVATE_KEY` environment variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable is not set or the key format is
    /// invalid.
    pub fn from_env() -> Result<Self> {
        let private_key = std::env::var("BIDDER_PRIVATE_KEY")
            .context("BIDDER_PRIVATE_KEY environment variable not set")?;

        Self::from_private_key(&private_key)
    }

    /// Create a wallet from a hex-encoded private key, with or without the
    /// "0x" prefix.
    pub fn from_private_key(key: &str) -> Result<Self> {
        let key_clean = key.trim().trim_start_matches("0x");

        let signer = PrivateKeySigner::from_str(key_clean)
            .context("Invalid private key format - expected 64 hex characters")?;

        let address = signer.address();

        Ok(Self { signer, address })
    }

    /// The wallet's Ethereum address.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The wallet address as a checksummed hex string.
    pub fn address_string(&self) -> String {
        format!("{}", self.address)
    }
}

#[async_trait]
impl WalletSession for BidderWallet {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_text(&self, message: &str) -> Result<Vec<u8>> {
        let signature = self.signer.sign_message(message.as_bytes()).await?;
        Ok(signature.as_bytes().to_vec())
    }
}

impl std::fmt::Debug for BidderWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never expose the private key in debug output
        f.debug_struct("BidderWallet")
            .field("address", &self.address_string())
            .finish()
    }
}
