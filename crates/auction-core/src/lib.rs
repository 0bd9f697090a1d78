//! Auction Core Library
//!
//! Shared types, chain registry, configuration, and the additional-services
//! API client for the batch-auction platform.

pub mod api;
pub mod chains;
pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};
