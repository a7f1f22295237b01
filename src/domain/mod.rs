//! Domain types for key splitting
//!
//! Validated newtypes and key material:
//! - [`Threshold`] - Minimum shares required for reconstruction (1..=255)
//! - [`ShareCount`] - Total number of shares to create (1..=255)
//! - [`NodeCount`] - Custodian nodes in the paired workflow (1..=127)
//! - [`SplitConfig`] - Validated threshold and share count pair
//! - [`Share`] and [`KeyPair`] - Zeroized key material

mod config;
mod node_count;
mod share;
mod share_count;
mod threshold;

pub use config::SplitConfig;
pub use node_count::NodeCount;
pub use share::{KeyPair, Share};
pub use share_count::ShareCount;
pub use threshold::Threshold;
