//! Text encoding of keys, shares and paired bundles
//!
//! Every artifact is written as a versioned armor block:
//!
//! ```text
//! -----BEGIN KEYQUORUM V1 KEY SHARE-----
//! <base64, 64 characters per line>
//! -----END KEYQUORUM V1 KEY SHARE-----
//! ```
//!
//! Decoding accepts exactly one block with a known V1 label, or bare base64
//! with no marker lines at all. A paired bundle body is two base64 shares
//! joined by [`BUNDLE_DELIMITER`].
//!
//! # Examples
//!
//! ```rust
//! use keyquorum::codec::{Label, decode, encode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let raw = vec![0xDE, 0xAD, 0xBE, 0xEF];
//! let text = encode(Label::KeyShare, &raw);
//!
//! assert!(text.starts_with("-----BEGIN KEYQUORUM V1 KEY SHARE-----\n"));
//! assert!(text.ends_with("-----END KEYQUORUM V1 KEY SHARE-----\n"));
//! assert_eq!(*decode(&text)?, raw);
//! # Ok(())
//! # }
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;
use zeroize::Zeroizing;

use crate::domain::Share;
use crate::error::{Error, Result};

/// Characters per body line
pub const LINE_WIDTH: usize = 64;

/// Armor format version carried in every label
pub const FRAME_VERSION: &str = "KEYQUORUM V1";

/// Separates the two shares of a paired bundle
pub const BUNDLE_DELIMITER: char = '.';

const BEGIN_PREFIX: &str = "-----BEGIN ";
const END_PREFIX: &str = "-----END ";
const MARKER_SUFFIX: &str = "-----";

/// Kind of content an armor block carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    PublicKey,
    /// An unsplit private key
    PrivateKey,
    KeyShare,
    ShareBundle,
}

impl Label {
    const ALL: [Self; 4] = [
        Self::PublicKey,
        Self::PrivateKey,
        Self::KeyShare,
        Self::ShareBundle,
    ];

    fn kind(self) -> &'static str {
        match self {
            Self::PublicKey => "PUBLIC KEY",
            Self::PrivateKey => "PRIVATE KEY",
            Self::KeyShare => "KEY SHARE",
            Self::ShareBundle => "SHARE BUNDLE",
        }
    }

    /// Full label as it appears between the marker dashes
    #[must_use]
    pub fn armor_label(self) -> String {
        format!("{FRAME_VERSION} {}", self.kind())
    }

    fn from_armor_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.armor_label() == label)
    }
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// A decoded armor block: its label (absent for bare text) and joined body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Armored {
    pub label: Option<Label>,
    pub body: Zeroizing<String>,
}

/// Splits `s` into chunks of `size` characters
///
/// Counts characters, not bytes, so multi-byte input is never cut inside a
/// character. The last chunk may be shorter; empty input yields no chunks.
///
/// # Examples
///
/// ```rust
/// use keyquorum::codec::chunk;
///
/// assert!(chunk("", 64).is_empty());
/// assert_eq!(chunk("abc", 64), vec!["abc"]);
/// assert_eq!(chunk("héllo", 2), vec!["hé", "ll", "o"]);
/// ```
#[must_use]
pub fn chunk(s: &str, size: usize) -> Vec<&str> {
    if s.is_empty() {
        return Vec::new();
    }
    if size == 0 {
        return vec![s];
    }

    let mut chunks = Vec::with_capacity(s.len() / size + 1);
    let mut current_len = 0;
    let mut current_start = 0;
    for (i, _) in s.char_indices() {
        if current_len == size {
            chunks.push(&s[current_start..i]);
            current_len = 0;
            current_start = i;
        }
        current_len += 1;
    }
    chunks.push(&s[current_start..]);
    chunks
}

/// Wraps an already-encoded body in an armor block
#[must_use]
pub fn armor(label: Label, body: &str) -> String {
    let armor_label = label.armor_label();
    let mut out = String::with_capacity(body.len() + body.len() / LINE_WIDTH + 96);
    out.push_str(&format!("{BEGIN_PREFIX}{armor_label}{MARKER_SUFFIX}\n"));
    for line in chunk(body, LINE_WIDTH) {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str(&format!("{END_PREFIX}{armor_label}{MARKER_SUFFIX}\n"));
    out
}

/// Base64-encodes `raw` and wraps it in an armor block
#[must_use]
pub fn encode(label: Label, raw: &[u8]) -> String {
    let body = Zeroizing::new(B64.encode(raw));
    armor(label, &body)
}

/// Encodes two shares as one paired bundle
#[must_use]
pub fn encode_bundle(first: &Share, second: &Share) -> String {
    let body = Zeroizing::new(format!(
        "{}{BUNDLE_DELIMITER}{}",
        B64.encode(first.as_bytes()),
        B64.encode(second.as_bytes())
    ));
    armor(Label::ShareBundle, &body)
}

/// Parses a single armor block, or bare text with no markers
///
/// # Errors
/// Returns [`Error::Decode`] on unknown labels, mismatched markers, or more
/// than one block
pub fn dearmor(text: &str) -> Result<Armored> {
    let mut blocks = dearmor_all(text)?;
    match blocks.len() {
        0 => Err(Error::Decode("no encoded content found".to_string())),
        1 => Ok(blocks.remove(0)),
        n => Err(Error::Decode(format!("expected one encoded block, found {n}"))),
    }
}

/// Parses a concatenation of armor blocks, or one bare body
///
/// Bare text is every non-empty line joined together.
///
/// # Errors
/// Returns [`Error::Decode`] on unknown labels, mismatched markers, text
/// outside blocks, or a block without an end marker
pub fn dearmor_all(text: &str) -> Result<Vec<Armored>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if !lines.iter().any(|line| is_marker(line)) {
        if lines.is_empty() {
            return Ok(Vec::new());
        }
        return Ok(vec![Armored {
            label: None,
            body: Zeroizing::new(lines.concat()),
        }]);
    }

    let mut blocks = Vec::new();
    let mut open: Option<(Label, String)> = None;

    for line in lines {
        if let Some(label) = marker_label(line, BEGIN_PREFIX) {
            if open.is_some() {
                return Err(Error::Decode(
                    "begin marker found inside an open block".to_string(),
                ));
            }
            let label = parse_label(label)?;
            open = Some((label, String::new()));
        } else if let Some(label) = marker_label(line, END_PREFIX) {
            let Some((open_label, body)) = open.take() else {
                return Err(Error::Decode("end marker without begin marker".to_string()));
            };
            if parse_label(label)? != open_label {
                return Err(Error::Decode(format!(
                    "end marker '{label}' does not match begin marker '{}'",
                    open_label.armor_label()
                )));
            }
            blocks.push(Armored {
                label: Some(open_label),
                body: Zeroizing::new(body),
            });
        } else if let Some((_, body)) = open.as_mut() {
            body.push_str(line);
        } else {
            return Err(Error::Decode(
                "unexpected content outside an encoded block".to_string(),
            ));
        }
    }

    if let Some((label, _)) = open {
        return Err(Error::Decode(format!(
            "missing end marker for '{}'",
            label.armor_label()
        )));
    }

    Ok(blocks)
}

/// Decodes an armored or bare single block back into raw bytes
///
/// # Errors
/// Returns [`Error::Decode`] on framing errors, invalid base64, or a bundle
/// (use [`decode_shares`] for those)
pub fn decode(text: &str) -> Result<Zeroizing<Vec<u8>>> {
    let armored = dearmor(text)?;
    if armored.label == Some(Label::ShareBundle) {
        return Err(Error::Decode(
            "paired bundle holds two shares, not a single value".to_string(),
        ));
    }
    // An armored empty value round-trips; bare text always needs content
    if armored.label.is_some() && armored.body.is_empty() {
        return Ok(Zeroizing::new(Vec::new()));
    }
    decode_base64(&armored.body)
}

/// Decodes a share-bearing body into its shares
///
/// A body holds either one base64 share or, for a paired bundle, two joined by
/// [`BUNDLE_DELIMITER`]. Whole keys are rejected so a private or public key is
/// never passed to recombination by mistake.
///
/// # Errors
/// Returns [`Error::Decode`] on a non-share label, a malformed bundle, or invalid base64
pub fn decode_shares(armored: &Armored) -> Result<Vec<Share>> {
    let parts: Vec<&str> = armored.body.split(BUNDLE_DELIMITER).collect();

    match (armored.label, parts.as_slice()) {
        (Some(label @ (Label::PublicKey | Label::PrivateKey)), _) => Err(Error::Decode(format!(
            "expected a key share or share bundle, found {label}"
        ))),
        (Some(Label::KeyShare), [single]) | (None, [single]) => {
            Ok(vec![Share::new(decode_base64(single)?.to_vec())])
        }
        (Some(Label::ShareBundle), [first, second]) | (None, [first, second]) => Ok(vec![
            Share::new(decode_base64(first)?.to_vec()),
            Share::new(decode_base64(second)?.to_vec()),
        ]),
        (Some(Label::ShareBundle), parts) => Err(Error::Decode(format!(
            "share bundle must hold exactly 2 shares, found {}",
            parts.len()
        ))),
        (_, parts) => Err(Error::Decode(format!(
            "expected 1 share or a bundle of 2, found {} delimited parts",
            parts.len()
        ))),
    }
}

fn decode_base64(body: &str) -> Result<Zeroizing<Vec<u8>>> {
    if body.is_empty() {
        return Err(Error::Decode("empty encoded value".to_string()));
    }
    B64.decode(body)
        .map(Zeroizing::new)
        .map_err(|e| Error::Decode(format!("invalid base64: {e}")))
}

fn is_marker(line: &str) -> bool {
    marker_label(line, BEGIN_PREFIX).is_some() || marker_label(line, END_PREFIX).is_some()
}

fn marker_label<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.strip_prefix(prefix)?.strip_suffix(MARKER_SUFFIX)
}

fn parse_label(label: &str) -> Result<Label> {
    Label::from_armor_label(label)
        .ok_or_else(|| Error::Decode(format!("unsupported armor label '{label}'")))
}
