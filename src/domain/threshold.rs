//! `Threshold` newtype for key splitting

use crate::error::{Error, Result};

/// Minimum number of shares needed to reconstruct a key (1..=255)
///
/// A threshold of 1 is accepted: every share then reconstructs the key alone,
/// which is what an operator asks for when splitting only to hand out copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Threshold(u8);

impl Threshold {
    /// Threshold used by the paired-custodian workflow
    pub const PAIRED: Self = Self(2);

    /// Creates a new threshold
    ///
    /// # Errors
    /// Returns a validation error if the threshold is 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyquorum::domain::Threshold;
    ///
    /// let threshold = Threshold::new(3).unwrap();
    /// assert_eq!(*threshold, 3);
    ///
    /// assert!(Threshold::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value == 0 {
            return Err(Error::validation("threshold must be at least 1"));
        }
        Ok(Self(value))
    }
}

impl std::ops::Deref for Threshold {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
