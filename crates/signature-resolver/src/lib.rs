//! Signature Resolver
//!
//! Turns an auction identifier and a connected wallet into a usable bid
//! signature, transparently authorizing and decrypting when the signature
//! is gated behind the decryption service. Stale in-flight flows are
//! silently dropped when inputs change or the resolver is closed.

pub mod resolver;

pub use resolver::{ResolveRequest, SignatureResolver};
