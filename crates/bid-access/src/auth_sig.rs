//! Sign-in-with-wallet authorization signatures.
//!
//! Builds an EIP-4361 challenge referencing the auction and personal-signs
//! it with the connected wallet. The message must serialize in the standard
//! layout exactly - the decryption service re-parses it and verifies the
//! signature against the embedded address.

use crate::wallet::WalletSession;
use anyhow::{Context, Result};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the signature was produced; fixed by the decryption service.
pub const DERIVATION_METHOD: &str = "web3.eth.personal.sign";

/// Message domain and origin URI embedded in the sign-in challenge.
#[derive(Debug, Clone)]
pub struct SignInSite {
    pub domain: String,
    pub origin: String,
}

impl Default for SignInSite {
    fn default() -> Self {
        Self {
            domain: "gnosisauction".to_string(),
            origin: "https://gnosisauction.eth".to_string(),
        }
    }
}

/// Authorization signature bound to a wallet address.
///
/// Proves control of the address at request time; submitted alongside
/// access-control conditions when asking the gateway to release a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSig {
    /// 0x-prefixed hex signature over `signed_message`.
    pub sig: String,
    /// Always [`DERIVATION_METHOD`].
    pub derived_via: String,
    /// The exact EIP-4361 text that was signed.
    pub signed_message: String,
    /// Checksummed address of the signing wallet.
    pub address: String,
}

fn generate_nonce() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.gen();
    hex::encode(bytes)
}

/// Build and sign the sign-in challenge for one auction.
///
/// The private key never leaves the wallet; only the 65-byte personal-sign
/// signature is embedded in the result.
pub async fn generate_auth_sig(
    wallet: &dyn WalletSession,
    site: &SignInSite,
    chain_id: u64,
    auction_id: u64,
) -> Result<AuthSig> {
    let address = wallet.address();
    let message = format!(
        "{domain} wants you to sign in with your Ethereum account:\n\
        {address}\n\n\
        Sign in to access bidding for auction - {auction_id}\n\n\
        URI: {origin}\n\
        Version: 1\n\
        Chain ID: {chain_id}\n\
        Nonce: {nonce}\n\
        Issued At: {issued_at}",
        domain = site.domain,
        address = address,
        auction_id = auction_id,
        origin = site.origin,
        chain_id = chain_id,
        nonce = generate_nonce(),
        issued_at = Utc::now().to_rfc3339(),
    );

    let signature = wallet
        .sign_text(&message)
        .await
        .context("Wallet refused to sign the sign-in message")?;

    debug!(
        address = %address,
        chain_id,
        auction_id,
        "Generated sign-in authorization signature"
    );

    Ok(AuthSig {
        sig: format!("0x{}", hex::encode(signature)),
        derived_via: DERIVATION_METHOD.to_string(),
        signed_message: message,
        address: address.to_string(),
    })
}
