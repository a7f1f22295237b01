//! Property tests for split/combine workflows

use keyquorum::ProviderError;
use keyquorum::bundler::{Bundle, bundle_paired};
use keyquorum::provider::{CryptoProvider, ShamirEd25519};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Random non-empty secret, 1 to 64 bytes
#[derive(Clone, Debug)]
struct Secret(Vec<u8>);

impl Arbitrary for Secret {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = (usize::arbitrary(g) % 64) + 1;
        Secret((0..len).map(|_| u8::arbitrary(g)).collect())
    }
}

/// Wrapper for valid threshold and share count pairs
#[derive(Clone, Copy, Debug)]
struct ValidShamirParams {
    threshold: usize,
    parts: usize,
}

impl Arbitrary for ValidShamirParams {
    fn arbitrary(g: &mut Gen) -> Self {
        let parts = (usize::arbitrary(g) % 20) + 1; // 1..=20
        let threshold = (usize::arbitrary(g) % parts) + 1; // 1..=parts
        ValidShamirParams { threshold, parts }
    }
}

/// Any subset of at least `threshold` shares, in any order, recovers the secret
#[quickcheck]
fn prop_threshold_subset_recovers(secret: Secret, params: ValidShamirParams, seed: u64) -> bool {
    let Ok(mut shares) = ShamirEd25519.split(&secret.0, params.parts, params.threshold) else {
        return false;
    };

    let mut rng = StdRng::seed_from_u64(seed);
    shares.shuffle(&mut rng);
    let extra = usize::try_from(seed % 4).unwrap_or(0);
    let take = (params.threshold + extra).min(params.parts);

    matches!(ShamirEd25519.combine(&shares[..take]), Ok(recovered) if *recovered == secret.0)
}

/// Fewer than `threshold` distinct shares never recover anything
#[quickcheck]
fn prop_below_threshold_fails(secret: Secret, params: ValidShamirParams, seed: u64) -> bool {
    if params.threshold < 2 {
        return true;
    }
    let Ok(mut shares) = ShamirEd25519.split(&secret.0, params.parts, params.threshold) else {
        return false;
    };

    shares.shuffle(&mut StdRng::seed_from_u64(seed));
    let take = params.threshold - 1;

    matches!(
        ShamirEd25519.combine(&shares[..take]),
        Err(ProviderError::ThresholdNotMet { needed, got })
            if needed == params.threshold && got == take
    )
}

/// Node `i` receives shares `2i` and `2i + 1`, and either share pair alone recovers
#[quickcheck]
fn prop_paired_bundles_are_consecutive_and_sufficient(secret: Secret, nodes: u8) -> bool {
    let nodes = usize::from(nodes % 12) + 1;
    let Ok(shares) = ShamirEd25519.split(&secret.0, 2 * nodes, 2) else {
        return false;
    };
    let Ok(artifacts) = bundle_paired(shares.clone()) else {
        return false;
    };

    artifacts.len() == nodes
        && artifacts.into_iter().enumerate().all(|(i, artifact)| {
            let Bundle::Paired(pair) = artifact.bundle else {
                return false;
            };
            let pair = pair.into_shares();
            pair[0] == shares[2 * i]
                && pair[1] == shares[2 * i + 1]
                && matches!(ShamirEd25519.combine(&pair), Ok(recovered) if *recovered == secret.0)
        })
}
