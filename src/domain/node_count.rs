//! `NodeCount` newtype for the paired-custodian workflow

use crate::error::{Error, Result};

use super::ShareCount;

/// Number of custodian nodes receiving a paired bundle (1..=127)
///
/// Each node takes two shares, and at most 255 shares exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeCount(u8);

impl NodeCount {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 127;

    /// Creates a new node count
    ///
    /// # Errors
    /// Returns a validation error if count is 0 or above 127
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyquorum::domain::NodeCount;
    ///
    /// let nodes = NodeCount::new(3).unwrap();
    /// assert_eq!(*nodes.share_count(), 6);
    ///
    /// assert!(NodeCount::new(0).is_err());
    /// assert!(NodeCount::new(128).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value < Self::MIN {
            return Err(Error::validation("minimum key generated for node is 1 node"));
        }
        if value > Self::MAX {
            return Err(Error::validation(format!(
                "at most {} nodes are supported, got {value}",
                Self::MAX
            )));
        }
        Ok(Self(value))
    }

    /// Total shares handed out: two per node
    #[must_use]
    pub fn share_count(&self) -> ShareCount {
        ShareCount::new(self.0 * 2).unwrap_or_else(|_| unreachable!("1..=127 doubled is non-zero"))
    }
}

impl std::ops::Deref for NodeCount {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
