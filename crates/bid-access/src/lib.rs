//! Bid Access Library
//!
//! Everything involved in proving who is asking for a gated bid signature
//! and recovering the plaintext once access is granted: wallet sessions,
//! sign-in-with-wallet authorization signatures, declarative access-control
//! conditions, the decryption gateway client, and the local symmetric
//! cipher.

pub mod auth_sig;
pub mod cipher;
pub mod conditions;
pub mod gateway;
pub mod wallet;

pub use auth_sig::{generate_auth_sig, AuthSig, SignInSite};
pub use conditions::{AccessControlCondition, ReturnValueTest};
pub use gateway::{DecryptionGateway, EncryptionKeyRequest, HttpDecryptionGateway};
pub use wallet::{BidderWallet, WalletSession};
