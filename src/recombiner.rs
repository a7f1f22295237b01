//! Collects shares from disk and recombines them into the private key
//!
//! Two addressing modes:
//! - a single file holding one encoded share per line (or a concatenation of
//!   armored blocks, e.g. `cat private-*.key > all.keys`)
//! - a comma-separated list of files, each holding exactly one artifact
//!
//! Paired bundles are expanded into their two shares. Shares reach the
//! provider in the order they were collected; nothing is sorted or deduplicated.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use zeroize::Zeroizing;

use crate::codec;
use crate::domain::Share;
use crate::error::{Error, Result};
use crate::provider::CryptoProvider;

/// Where shares are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareSource {
    /// One file, one encoded share per line
    Lines(PathBuf),
    /// Several files, each read in full as one artifact
    Files(Vec<PathBuf>),
}

impl ShareSource {
    /// Interprets a file argument: a comma-separated list selects [`ShareSource::Files`]
    ///
    /// # Errors
    /// Returns a validation error for an empty argument or an empty list entry
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::path::PathBuf;
    /// use keyquorum::recombiner::ShareSource;
    ///
    /// assert_eq!(
    ///     ShareSource::parse("shares.txt").unwrap(),
    ///     ShareSource::Lines(PathBuf::from("shares.txt"))
    /// );
    /// assert_eq!(
    ///     ShareSource::parse("a.key, b.key").unwrap(),
    ///     ShareSource::Files(vec![PathBuf::from("a.key"), PathBuf::from("b.key")])
    /// );
    /// assert!(ShareSource::parse("a.key,,b.key").is_err());
    /// ```
    pub fn parse(arg: &str) -> Result<Self> {
        if arg.trim().is_empty() {
            return Err(Error::validation("input file can't be empty"));
        }

        let entries: Vec<&str> = arg.split(',').map(str::trim).collect();
        if entries.iter().any(|entry| entry.is_empty()) {
            return Err(Error::validation(format!(
                "input file list '{arg}' contains an empty entry"
            )));
        }

        match entries.as_slice() {
            [single] => Ok(Self::Lines(PathBuf::from(single))),
            _ => Ok(Self::Files(entries.into_iter().map(PathBuf::from).collect())),
        }
    }
}

/// Reads and decodes every share from `source`
///
/// # Errors
/// Returns [`Error::NotFound`] if any referenced file is missing (checked for
/// every file before anything is decoded), [`Error::Decode`] if a share cannot
/// be decoded, or [`Error::Io`] on read failure
pub fn collect_shares(source: &ShareSource) -> Result<Vec<Share>> {
    match source {
        ShareSource::Lines(path) => {
            ensure_exists(path)?;
            read_lines(path)
        }
        ShareSource::Files(paths) => {
            for path in paths {
                ensure_exists(path)?;
            }
            let mut shares = Vec::new();
            for path in paths {
                let text = read_text(path)?;
                let armored = codec::dearmor(&text).map_err(|e| in_file(path, e))?;
                shares.extend(codec::decode_shares(&armored).map_err(|e| in_file(path, e))?);
            }
            Ok(shares)
        }
    }
}

/// Collects shares from `source` and recombines them with `provider`
///
/// # Errors
/// Propagates [`collect_shares`] failures and provider errors, including
/// [`ProviderError::ThresholdNotMet`](crate::error::ProviderError::ThresholdNotMet)
pub fn combine<P: CryptoProvider + ?Sized>(
    provider: &P,
    source: &ShareSource,
) -> Result<Zeroizing<Vec<u8>>> {
    let shares = collect_shares(source)?;
    debug!(shares = shares.len(), "collected shares for recombination");
    Ok(provider.combine(&shares)?)
}

fn read_lines(path: &Path) -> Result<Vec<Share>> {
    let text = read_text(path)?;

    // A file starting with an armor marker is a concatenation of artifacts
    if text.trim_start().starts_with("-----") {
        let mut shares = Vec::new();
        for armored in codec::dearmor_all(&text).map_err(|e| in_file(path, e))? {
            shares.extend(codec::decode_shares(&armored).map_err(|e| in_file(path, e))?);
        }
        return Ok(shares);
    }

    let mut shares = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let armored = codec::Armored {
            label: None,
            body: Zeroizing::new(line.to_string()),
        };
        let decoded = codec::decode_shares(&armored).map_err(|e| match e {
            Error::Decode(reason) => Error::Decode(format!(
                "{} line {}: {reason}",
                path.display(),
                idx + 1
            )),
            other => other,
        })?;
        shares.extend(decoded);
    }
    Ok(shares)
}

fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::NotFound(path.to_path_buf()))
    }
}

fn read_text(path: &Path) -> Result<Zeroizing<String>> {
    fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| Error::io(path, e))
}

fn in_file(path: &Path, err: Error) -> Error {
    match err {
        Error::Decode(reason) => Error::Decode(format!("{}: {reason}", path.display())),
        other => other,
    }
}
