//! Threshold distribution of private keys
//!
//! A key pair is generated by a [`provider::CryptoProvider`], the private key
//! is split into shares, one share is retained by the operator and the rest
//! are handed out to custodians, one artifact each. Any threshold of shares
//! recombines the key.

pub mod allocator;
pub mod bundler;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod commands;
pub mod domain;
pub mod error;
pub mod output;
pub mod provider;
pub mod recombiner;
pub mod secret;

pub use error::{Error, ProviderError, Result};
