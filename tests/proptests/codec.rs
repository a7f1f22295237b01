//! Property tests for chunking and armor framing

use keyquorum::codec::{self, LINE_WIDTH, Label, chunk};
use keyquorum::domain::Share;
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

/// Non-empty byte payload, up to a few armor lines long
#[derive(Clone, Debug)]
struct Payload(Vec<u8>);

impl Arbitrary for Payload {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = (usize::arbitrary(g) % 256) + 1;
        Payload((0..len).map(|_| u8::arbitrary(g)).collect())
    }
}

#[derive(Clone, Copy, Debug)]
struct AnyLabel(Label);

impl Arbitrary for AnyLabel {
    fn arbitrary(g: &mut Gen) -> Self {
        AnyLabel(
            *g.choose(&[
                Label::PublicKey,
                Label::PrivateKey,
                Label::KeyShare,
            ])
            .unwrap_or(&Label::KeyShare),
        )
    }
}

#[quickcheck]
fn prop_encode_decode_round_trip(payload: Payload, label: AnyLabel) -> bool {
    let text = codec::encode(label.0, &payload.0);
    matches!(codec::decode(&text), Ok(decoded) if *decoded == payload.0)
}

#[quickcheck]
fn prop_armor_lines_fit_line_width(payload: Payload, label: AnyLabel) -> bool {
    let text = codec::encode(label.0, &payload.0);
    text.ends_with('\n')
        && text
            .lines()
            .filter(|line| !line.starts_with("-----"))
            .all(|line| !line.is_empty() && line.chars().count() <= LINE_WIDTH)
}

#[quickcheck]
fn prop_chunks_rejoin_to_input(s: String, size: u8) -> bool {
    let size = usize::from(size % 80) + 1;
    let chunks = chunk(&s, size);

    let rejoined: String = chunks.concat();
    let full_chunks = chunks.len().saturating_sub(1);
    rejoined == s
        && chunks[..full_chunks]
            .iter()
            .all(|c| c.chars().count() == size)
        && chunks
            .last()
            .is_none_or(|c| (1..=size).contains(&c.chars().count()))
}

#[quickcheck]
fn prop_bundle_round_trip(first: Payload, second: Payload) -> bool {
    let pair = [Share::new(first.0), Share::new(second.0)];
    let text = codec::encode_bundle(&pair[0], &pair[1]);

    codec::dearmor(&text)
        .and_then(|armored| codec::decode_shares(&armored))
        .is_ok_and(|shares| shares == pair)
}
