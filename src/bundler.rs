//! Groups distributable shares into the artifacts handed to custodians

use crate::codec::{self, Label};
use crate::domain::Share;
use crate::error::{Error, Result};

/// Two shares handed to one custodian as a unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedBundle {
    pub first: Share,
    pub second: Share,
}

impl PairedBundle {
    /// Both shares, in bundling order
    #[must_use]
    pub fn into_shares(self) -> [Share; 2] {
        [self.first, self.second]
    }
}

/// What a custodian receives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bundle {
    Single(Share),
    Paired(PairedBundle),
}

impl Bundle {
    /// Renders the bundle as armored text
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Single(share) => codec::encode(Label::KeyShare, share.as_bytes()),
            Self::Paired(pair) => codec::encode_bundle(&pair.first, &pair.second),
        }
    }
}

/// A named output unit for one custodian
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustodianArtifact {
    /// Zero-based custodian index
    pub index: usize,
    /// File stem and secret name, e.g. `private-0` or `db-private-0`
    pub name: String,
    pub bundle: Bundle,
}

impl CustodianArtifact {
    /// File name of the encoded key artifact
    #[must_use]
    pub fn key_file_name(&self) -> String {
        format!("{}.key", self.name)
    }
}

/// Artifact name for custodian `index`, optionally prefixed by a secret name
#[must_use]
pub fn artifact_name(prefix: Option<&str>, index: usize) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}-private-{index}"),
        None => format!("private-{index}"),
    }
}

/// One artifact per share, in order
#[must_use]
pub fn bundle_simple(shares: Vec<Share>, prefix: Option<&str>) -> Vec<CustodianArtifact> {
    shares
        .into_iter()
        .enumerate()
        .map(|(index, share)| CustodianArtifact {
            index,
            name: artifact_name(prefix, index),
            bundle: Bundle::Single(share),
        })
        .collect()
}

/// Groups an ordered sequence into consecutive pairs
///
/// `[s0, s1, s2, s3]` becomes `[(s0, s1), (s2, s3)]`.
///
/// # Errors
/// Returns [`Error::UnpairedShare`] for an odd-length sequence; the trailing
/// share is never dropped silently
pub fn pair_up(shares: Vec<Share>) -> Result<Vec<PairedBundle>> {
    if shares.len() % 2 != 0 {
        return Err(Error::UnpairedShare {
            count: shares.len(),
        });
    }

    let mut pairs = Vec::with_capacity(shares.len() / 2);
    let mut iter = shares.into_iter();
    while let (Some(first), Some(second)) = (iter.next(), iter.next()) {
        pairs.push(PairedBundle { first, second });
    }
    Ok(pairs)
}

/// One paired artifact per custodian, shares consumed two at a time in order
///
/// # Errors
/// Returns [`Error::UnpairedShare`] for an odd number of shares
pub fn bundle_paired(shares: Vec<Share>) -> Result<Vec<CustodianArtifact>> {
    Ok(pair_up(shares)?
        .into_iter()
        .enumerate()
        .map(|(index, pair)| CustodianArtifact {
            index,
            name: artifact_name(None, index),
            bundle: Bundle::Paired(pair),
        })
        .collect())
}
