//! Split parameters for the simple and paired workflows

use crate::error::{Error, Result};

use super::{NodeCount, ShareCount, Threshold};

/// Validated pair of threshold and share count
///
/// Enforces `1 <= threshold <= share_count` at the type level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    threshold: Threshold,
    share_count: ShareCount,
}

impl SplitConfig {
    /// Creates a new split configuration
    ///
    /// # Errors
    /// Returns a validation error if threshold exceeds share count
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyquorum::domain::{ShareCount, SplitConfig, Threshold};
    ///
    /// let config = SplitConfig::new(
    ///     Threshold::new(3).unwrap(),
    ///     ShareCount::new(5).unwrap()
    /// ).unwrap();
    ///
    /// assert_eq!(*config.threshold(), 3);
    /// assert_eq!(*config.share_count(), 5);
    ///
    /// let result = SplitConfig::new(
    ///     Threshold::new(5).unwrap(),
    ///     ShareCount::new(3).unwrap()
    /// );
    /// assert!(result.is_err());
    /// ```
    pub fn new(threshold: Threshold, share_count: ShareCount) -> Result<Self> {
        if *threshold > *share_count {
            return Err(Error::validation(format!(
                "threshold {} cannot exceed share count {}",
                *threshold, *share_count
            )));
        }
        Ok(Self {
            threshold,
            share_count,
        })
    }

    /// Parameters of the paired-custodian workflow: two shares per node, threshold 2
    ///
    /// Every node receives exactly the threshold, so a node's own pair is
    /// sufficient and no pair from another node is needed.
    #[must_use]
    pub fn paired(nodes: NodeCount) -> Self {
        Self {
            threshold: Threshold::PAIRED,
            share_count: nodes.share_count(),
        }
    }

    #[must_use]
    pub fn threshold(&self) -> Threshold {
        self.threshold
    }

    #[must_use]
    pub fn share_count(&self) -> ShareCount {
        self.share_count
    }
}
