use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey, EncodeRsaPublicKey};
use rsa::rand_core::OsRng;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::Zeroizing;

use super::CryptoProvider;
use crate::domain::KeyPair;
use crate::error::ProviderError;

/// RSA key pairs split with Shamir Secret Sharing
///
/// Both halves are PKCS#1 DER: the private key is what gets split, the public
/// key is what `public.pem` and the secret annotations carry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShamirRsa;

impl ShamirRsa {
    /// Size used when the caller asks for the default (`bits == 0`)
    pub const DEFAULT_BITS: u32 = 2048;
    pub const MIN_BITS: u32 = 1024;
    pub const MAX_BITS: u32 = 8192;

    /// Derives the PKCS#1 public key belonging to a PKCS#1 private key
    ///
    /// # Errors
    /// Returns [`ProviderError::KeyGen`] if `private` is not a PKCS#1 RSA key
    pub fn public_key(private: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let key = RsaPrivateKey::from_pkcs1_der(private)
            .map_err(|e| ProviderError::KeyGen(format!("invalid rsa private key: {e}")))?;
        public_der(&RsaPublicKey::from(&key))
    }
}

fn public_der(key: &RsaPublicKey) -> Result<Vec<u8>, ProviderError> {
    key.to_pkcs1_der()
        .map(|doc| doc.as_bytes().to_vec())
        .map_err(|e| ProviderError::KeyGen(format!("failed encoding rsa public key: {e}")))
}

impl CryptoProvider for ShamirRsa {
    fn generate_key_pair(&self, bits: u32) -> Result<KeyPair, ProviderError> {
        let bits = if bits == 0 { Self::DEFAULT_BITS } else { bits };
        if !(Self::MIN_BITS..=Self::MAX_BITS).contains(&bits) || bits % 8 != 0 {
            return Err(ProviderError::KeyGen(format!(
                "unsupported key size {bits} bits: rsa keys are a multiple of 8 between {} and {} bits",
                Self::MIN_BITS,
                Self::MAX_BITS
            )));
        }
        let bit_size = usize::try_from(bits)
            .map_err(|_| ProviderError::KeyGen(format!("key size {bits} does not fit usize")))?;

        let key = RsaPrivateKey::new(&mut OsRng, bit_size)
            .map_err(|e| ProviderError::KeyGen(format!("rsa key generation failed: {e}")))?;
        let public = public_der(&RsaPublicKey::from(&key))?;
        let private = key
            .to_pkcs1_der()
            .map_err(|e| ProviderError::KeyGen(format!("failed encoding rsa private key: {e}")))?;

        Ok(KeyPair {
            public,
            private: Zeroizing::new(private.as_bytes().to_vec()),
        })
    }
}
