use ed25519_dalek::SigningKey;
use rand::RngCore;
use zeroize::Zeroizing;

use super::CryptoProvider;
use crate::domain::KeyPair;
use crate::error::ProviderError;

/// Ed25519 key pairs split with Shamir Secret Sharing
///
/// The private key is the 32-byte seed, the public key the 32-byte verifying key.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShamirEd25519;

impl ShamirEd25519 {
    /// The only supported size; `bits == 0` selects it too
    pub const KEY_BITS: u32 = 256;

    /// Derives the public key belonging to a private seed
    ///
    /// # Errors
    /// Returns [`ProviderError::KeyGen`] if `private` is not a 32-byte seed
    pub fn public_key(private: &[u8]) -> Result<Vec<u8>, ProviderError> {
        let seed: &[u8; 32] = private.try_into().map_err(|_| {
            ProviderError::KeyGen(format!(
                "private key must be 32 bytes, got {}",
                private.len()
            ))
        })?;
        let signing_key = SigningKey::from_bytes(seed);
        Ok(signing_key.verifying_key().to_bytes().to_vec())
    }
}

impl CryptoProvider for ShamirEd25519 {
    fn generate_key_pair(&self, bits: u32) -> Result<KeyPair, ProviderError> {
        if bits != 0 && bits != Self::KEY_BITS {
            return Err(ProviderError::KeyGen(format!(
                "unsupported key size {bits} bits: ed25519 keys are {} bits",
                Self::KEY_BITS
            )));
        }

        let mut seed = Zeroizing::new([0u8; 32]);
        rand::rng().fill_bytes(seed.as_mut_slice());

        let signing_key = SigningKey::from_bytes(&seed);
        Ok(KeyPair {
            public: signing_key.verifying_key().to_bytes().to_vec(),
            private: Zeroizing::new(signing_key.to_bytes().to_vec()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_default_and_explicit_bits() {
        let provider = ShamirEd25519;
        let pair = provider.generate_key_pair(0).unwrap();
        assert_eq!(pair.public.len(), 32);
        assert_eq!(pair.private.len(), 32);

        let pair = provider.generate_key_pair(256).unwrap();
        assert_eq!(
            ShamirEd25519::public_key(&pair.private).unwrap(),
            pair.public
        );
    }

    #[test]
    fn test_rsa_sizes_are_not_ed25519_sizes() {
        let result = ShamirEd25519.generate_key_pair(2048);
        assert!(matches!(result, Err(ProviderError::KeyGen(_))));
    }

    #[test]
    fn test_generated_keys_differ() {
        let a = ShamirEd25519.generate_key_pair(0).unwrap();
        let b = ShamirEd25519.generate_key_pair(0).unwrap();
        assert_ne!(*a.private, *b.private);
    }

    #[test]
    fn test_split_then_combine_recovers_seed() {
        let pair = ShamirEd25519.generate_key_pair(0).unwrap();
        let shares = ShamirEd25519.split(&pair.private, 5, 3).unwrap();

        let recovered = ShamirEd25519.combine(&shares[2..]).unwrap();
        assert_eq!(
            ShamirEd25519::public_key(&recovered).unwrap(),
            pair.public
        );
    }
}
