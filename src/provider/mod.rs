//! Key generation and secret-sharing capability
//!
//! Everything above this module treats shares as opaque bytes. Two providers
//! ship with the crate and differ only in the key pairs they generate:
//! [`ShamirRsa`] (PKCS#1 DER, any supported RSA size) and [`ShamirEd25519`]
//! (32-byte seeds). Both split the private key with Shamir Secret Sharing
//! over GF(256).
//!
//! # Share layout
//!
//! Each share is
//! `threshold (1 byte) || blahaj share || CRC32 (4 bytes, big endian)`, where
//! the checksum covers everything before it. Carrying the threshold lets
//! [`CryptoProvider::combine`] report [`ProviderError::ThresholdNotMet`]
//! instead of silently producing a wrong key.

use std::collections::HashSet;

use blahaj::Sharks;
use crc::{CRC_32_ISO_HDLC, Crc};
use zeroize::Zeroizing;

use crate::domain::{KeyPair, Share};
use crate::error::ProviderError;

mod ed25519;
mod rsa;

pub use self::ed25519::ShamirEd25519;
pub use self::rsa::ShamirRsa;

/// CRC32 algorithm for share integrity checking
const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Bytes added around a blahaj share: threshold prefix and checksum suffix
const SHARE_OVERHEAD: usize = 1 + 4;

/// Key-pair generation plus split/combine of a private key
///
/// `split` and `combine` default to the Shamir scheme described in the
/// module docs; implementors only have to generate keys.
pub trait CryptoProvider {
    /// Generates a public/private key pair of the requested size
    ///
    /// # Errors
    /// Returns [`ProviderError::KeyGen`] if the size is unsupported or generation fails
    fn generate_key_pair(&self, bits: u32) -> Result<KeyPair, ProviderError>;

    /// Splits a private key into `parts` shares, any `threshold` of which recover it
    ///
    /// # Errors
    /// Returns [`ProviderError::Split`] if `parts < 1` or `parts < threshold`
    fn split(
        &self,
        private: &[u8],
        parts: usize,
        threshold: usize,
    ) -> Result<Vec<Share>, ProviderError> {
        shamir_split(private, parts, threshold)
    }

    /// Recombines shares into the original private key
    ///
    /// # Errors
    /// Returns [`ProviderError::ThresholdNotMet`] when too few distinct shares are
    /// supplied, or [`ProviderError::Combine`] on malformed shares
    fn combine(&self, shares: &[Share]) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
        shamir_combine(shares)
    }
}

/// Key pair family, chosen by name or inferred from the requested size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum KeyAlgorithm {
    #[default]
    Rsa,
    Ed25519,
}

impl KeyAlgorithm {
    /// Ed25519 for 256 bits, RSA for everything else (including the `0` default)
    ///
    /// # Examples
    ///
    /// ```rust
    /// use keyquorum::provider::KeyAlgorithm;
    ///
    /// assert_eq!(KeyAlgorithm::from_bits(0), KeyAlgorithm::Rsa);
    /// assert_eq!(KeyAlgorithm::from_bits(2048), KeyAlgorithm::Rsa);
    /// assert_eq!(KeyAlgorithm::from_bits(256), KeyAlgorithm::Ed25519);
    /// ```
    #[must_use]
    pub fn from_bits(bits: u32) -> Self {
        if bits == ShamirEd25519::KEY_BITS {
            Self::Ed25519
        } else {
            Self::Rsa
        }
    }

    #[must_use]
    pub fn provider(self) -> &'static dyn CryptoProvider {
        match self {
            Self::Rsa => &ShamirRsa,
            Self::Ed25519 => &ShamirEd25519,
        }
    }

    /// Derives the public key belonging to a private key of this family
    ///
    /// # Errors
    /// Returns [`ProviderError::KeyGen`] if `private` is not a key of this family
    pub fn public_key(self, private: &[u8]) -> Result<Vec<u8>, ProviderError> {
        match self {
            Self::Rsa => ShamirRsa::public_key(private),
            Self::Ed25519 => ShamirEd25519::public_key(private),
        }
    }
}

fn shamir_split(
    private: &[u8],
    parts: usize,
    threshold: usize,
) -> Result<Vec<Share>, ProviderError> {
    if parts < 1 {
        return Err(ProviderError::Split("parts must be at least 1".to_string()));
    }
    if threshold < 1 {
        return Err(ProviderError::Split(
            "threshold must be at least 1".to_string(),
        ));
    }
    if parts < threshold {
        return Err(ProviderError::Split(format!(
            "parts {parts} cannot be less than threshold {threshold}"
        )));
    }
    if parts > usize::from(u8::MAX) {
        return Err(ProviderError::Split(format!(
            "parts {parts} exceeds the maximum of {}",
            u8::MAX
        )));
    }
    if private.is_empty() {
        return Err(ProviderError::Split("private key is empty".to_string()));
    }

    let threshold_u8 =
        u8::try_from(threshold).unwrap_or_else(|_| unreachable!("threshold <= parts <= 255"));
    let sharks = Sharks(threshold_u8);
    let dealer = sharks.dealer(private);

    let shares = dealer
        .take(parts)
        .map(|share| {
            let share_bytes = Zeroizing::new(Vec::from(&share));
            let mut encoded = Vec::with_capacity(share_bytes.len() + SHARE_OVERHEAD);
            encoded.push(threshold_u8);
            encoded.extend_from_slice(&share_bytes);
            let checksum = CRC32.checksum(&encoded);
            encoded.extend_from_slice(&checksum.to_be_bytes());
            Share::new(encoded)
        })
        .collect::<Vec<_>>();

    if shares.len() != parts {
        return Err(ProviderError::Split(format!(
            "dealer produced {} shares, expected {parts}",
            shares.len()
        )));
    }

    Ok(shares)
}

fn shamir_combine(shares: &[Share]) -> Result<Zeroizing<Vec<u8>>, ProviderError> {
    if shares.is_empty() {
        return Err(ProviderError::ThresholdNotMet { needed: 1, got: 0 });
    }

    let mut parsed_shares = Vec::with_capacity(shares.len());
    let mut evaluation_points = HashSet::new();
    let mut threshold_from_shares = None;

    for (idx, share) in shares.iter().enumerate() {
        let (threshold, body) = open_share(share.as_bytes())
            .map_err(|reason| ProviderError::Combine(format!("share #{}: {reason}", idx + 1)))?;

        match threshold_from_shares {
            None => threshold_from_shares = Some(threshold),
            Some(t) if t != threshold => {
                return Err(ProviderError::Combine(format!(
                    "share #{} has inconsistent threshold: expected {t}, got {threshold}",
                    idx + 1
                )));
            }
            _ => {}
        }

        let parsed = blahaj::Share::try_from(body).map_err(|e| {
            ProviderError::Combine(format!("share #{}: invalid share data: {e}", idx + 1))
        })?;

        // First byte of a blahaj share is its x coordinate
        evaluation_points.insert(body[0]);
        parsed_shares.push(parsed);
    }

    let threshold = threshold_from_shares.unwrap_or_else(|| unreachable!("shares is non-empty"));

    if evaluation_points.len() < usize::from(threshold) {
        return Err(ProviderError::ThresholdNotMet {
            needed: usize::from(threshold),
            got: evaluation_points.len(),
        });
    }

    let sharks = Sharks(threshold);
    let recovered = sharks
        .recover(&parsed_shares)
        .map_err(|e| ProviderError::Combine(format!("failed to recover secret: {e:?}")))?;

    Ok(Zeroizing::new(recovered))
}

/// Checks the framing of one provider share and returns `(threshold, blahaj share bytes)`
fn open_share(bytes: &[u8]) -> Result<(u8, &[u8]), String> {
    // threshold + x + at least one y byte + checksum
    if bytes.len() < SHARE_OVERHEAD + 2 {
        return Err(format!("share too short: {} bytes", bytes.len()));
    }

    let (content, checksum_bytes) = bytes.split_at(bytes.len() - 4);
    let expected_checksum = CRC32.checksum(content);
    let actual_checksum = u32::from_be_bytes([
        checksum_bytes[0],
        checksum_bytes[1],
        checksum_bytes[2],
        checksum_bytes[3],
    ]);

    if expected_checksum != actual_checksum {
        return Err(format!(
            "checksum verification failed: expected 0x{expected_checksum:08x}, got 0x{actual_checksum:08x}"
        ));
    }

    let threshold = content[0];
    if threshold == 0 {
        return Err("threshold of 0 is invalid".to_string());
    }

    Ok((threshold, &content[1..]))
}
