//! Chooses which share stays with the operator
//!
//! The retained share is picked uniformly at random so that "the operator
//! always keeps share 0" never becomes a convention someone holding only the
//! distributed shares could rely on. Randomness is injected by the caller.

use rand::Rng;

use crate::domain::Share;
use crate::error::{Error, Result};

/// Result of partitioning the shares of one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    /// Share kept by the operator, never written to a custodian artifact
    pub retained: Share,
    /// Remaining shares in their original relative order
    pub distributable: Vec<Share>,
}

/// Partitions `shares` into one randomly chosen retained share and the rest
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `shares` is empty
pub fn allocate<R: Rng + ?Sized>(shares: Vec<Share>, rng: &mut R) -> Result<Allocation> {
    if shares.is_empty() {
        return Err(Error::InvalidInput("no shares to allocate".to_string()));
    }
    let index = rng.random_range(0..shares.len());
    allocate_at(shares, index)
}

/// Partitions `shares`, retaining the share at `index`
///
/// # Errors
/// Returns [`Error::InvalidInput`] if `shares` is empty or `index` is out of range
///
/// # Examples
///
/// ```rust
/// use keyquorum::allocator::allocate_at;
/// use keyquorum::domain::Share;
///
/// let shares: Vec<Share> = [[0u8], [1], [2]].iter().map(|s| Share::from(&s[..])).collect();
/// let allocation = allocate_at(shares, 1).unwrap();
///
/// assert_eq!(allocation.retained.as_bytes(), &[1]);
/// assert_eq!(allocation.distributable.len(), 2);
/// assert_eq!(allocation.distributable[0].as_bytes(), &[0]);
/// assert_eq!(allocation.distributable[1].as_bytes(), &[2]);
/// ```
pub fn allocate_at(mut shares: Vec<Share>, index: usize) -> Result<Allocation> {
    if shares.is_empty() {
        return Err(Error::InvalidInput("no shares to allocate".to_string()));
    }
    if index >= shares.len() {
        return Err(Error::InvalidInput(format!(
            "retained index {index} out of range for {} shares",
            shares.len()
        )));
    }

    let retained = shares.remove(index);
    Ok(Allocation {
        retained,
        distributable: shares,
    })
}
