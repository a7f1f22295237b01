//! `ShareCount` newtype for key splitting

use crate::error::{Error, Result};

/// Number of shares to create (1..=255)
///
/// GF(256) has 255 non-zero evaluation points, one per share, so 0 is the only
/// value a `u8` can carry that is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ShareCount(u8);

impl ShareCount {
    /// Minimum valid share count
    pub const MIN: u8 = 1;

    /// Maximum valid share count
    pub const MAX: u8 = 255;

    /// Creates a new share count
    ///
    /// # Errors
    /// Returns a validation error if count is 0
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyquorum::domain::ShareCount;
    ///
    /// let count = ShareCount::new(5).unwrap();
    /// assert_eq!(*count, 5);
    ///
    /// assert!(ShareCount::new(0).is_err());
    /// ```
    pub fn new(value: u8) -> Result<Self> {
        if value < Self::MIN {
            return Err(Error::validation("share count must be at least 1"));
        }
        Ok(Self(value))
    }
}

impl std::ops::Deref for ShareCount {
    type Target = u8;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
