//! Property tests for share allocation

use keyquorum::allocator::{allocate, allocate_at};
use keyquorum::domain::Share;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Between 1 and 64 distinguishable shares
#[derive(Clone, Debug)]
struct Shares(Vec<Share>);

impl Arbitrary for Shares {
    fn arbitrary(g: &mut Gen) -> Self {
        let count = (u8::arbitrary(g) % 64) + 1;
        Shares((0..count).map(|i| Share::new(vec![i, u8::arbitrary(g)])).collect())
    }
}

/// Retained plus distributable is exactly the input, nothing lost or duplicated
#[quickcheck]
fn prop_allocation_partitions_input(shares: Shares, seed: u64) -> bool {
    let input = shares.0;
    let Ok(allocation) = allocate(input.clone(), &mut StdRng::seed_from_u64(seed)) else {
        return false;
    };

    let Some(index) = input.iter().position(|s| *s == allocation.retained) else {
        return false;
    };
    let mut expected = input;
    expected.remove(index);
    allocation.distributable == expected
}

#[quickcheck]
fn prop_allocate_at_preserves_order(shares: Shares, index: usize) -> bool {
    let input = shares.0;
    let index = index % input.len();
    let Ok(allocation) = allocate_at(input.clone(), index) else {
        return false;
    };

    allocation.retained == input[index]
        && allocation.distributable.len() == input.len() - 1
        && allocation
            .distributable
            .iter()
            .zip(input.iter().filter(|s| **s != input[index]))
            .all(|(a, b)| a == b)
}

#[quickcheck]
fn prop_allocate_at_out_of_range_fails(shares: Shares, past_end: u8) -> bool {
    let len = shares.0.len();
    allocate_at(shares.0, len + usize::from(past_end)).is_err()
}
