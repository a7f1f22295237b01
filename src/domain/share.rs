//! Key material moved between the provider, allocator and bundler

use zeroize::Zeroizing;

/// One fragment of a split private key
///
/// Opaque bytes produced by a [`CryptoProvider`](crate::provider::CryptoProvider).
/// The buffer is wiped on drop and never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Share(Zeroizing<Vec<u8>>);

impl Share {
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(Zeroizing::new(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Share {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }
}

impl std::fmt::Debug for Share {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Share(<{} bytes>)", self.0.len())
    }
}

/// A freshly generated key pair
pub struct KeyPair {
    pub public: Vec<u8>,
    pub private: Zeroizing<Vec<u8>>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &self.public)
            .field("private", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_does_not_leak_share_bytes() {
        let share = Share::new(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        let printed = format!("{share:?}");
        assert_eq!(printed, "Share(<4 bytes>)");
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let pair = KeyPair {
            public: vec![1, 2],
            private: Zeroizing::new(vec![9, 9, 9]),
        };
        let printed = format!("{pair:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("9, 9"));
    }
}
