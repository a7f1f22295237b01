//! Key distribution and recombination workflows
//!
//! Each workflow validates its options before touching the filesystem, runs
//! the provider, then writes every artifact into one output directory. If a
//! write fails, a directory created by this invocation is removed again.

use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::{debug, info, warn};

use crate::allocator::allocate;
use crate::bundler::{artifact_name, bundle_paired, bundle_simple};
use crate::codec::{self, Label};
use crate::domain::{NodeCount, Share, SplitConfig};
use crate::error::{Error, Result};
use crate::output::OutputDir;
use crate::provider::CryptoProvider;
use crate::recombiner::{self, ShareSource};
use crate::secret::{self, Secret};

/// Encoded public key
pub const PUBLIC_KEY_FILE: &str = "public.pem";

/// Retained share, whole key, or recombined key
pub const PRIVATE_KEY_FILE: &str = "private.key";

/// Options of the `create` workflow
#[derive(Debug, Clone)]
pub struct CreateOptions {
    pub secret_name: String,
    /// `KEY=value` file whose entries become the secret's data
    pub env_file: PathBuf,
    pub bits: u32,
    /// `None` keeps the private key whole
    pub split: Option<SplitConfig>,
    pub output: PathBuf,
}

/// Options of the `generate` workflow
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub bits: u32,
    pub split: Option<SplitConfig>,
    pub output: PathBuf,
}

/// Options of the `custom-generate` workflow
#[derive(Debug, Clone)]
pub struct CustomGenerateOptions {
    pub nodes: NodeCount,
    pub bits: u32,
    pub output: PathBuf,
}

/// Options of the `combine` workflow
#[derive(Debug, Clone)]
pub struct CombineOptions {
    /// One file with a share per line, or a comma-separated list of files
    pub input: String,
    pub output: PathBuf,
}

/// Generates a key pair, renders the Kubernetes secrets and distributes the private key
///
/// Writes `<name>.secret.yaml`, `public.pem`, one `<name>-private-<i>.secret.yaml`
/// and `<name>-private-<i>.key` per distributed share, and `private.key` holding
/// the retained share (or the whole key when not splitting).
///
/// # Errors
/// Returns a validation error for missing options, [`Error::NotFound`] for a
/// missing env file, provider errors, or I/O errors while writing
pub fn create_secrets<P, R>(provider: &P, rng: &mut R, opts: &CreateOptions) -> Result<Vec<PathBuf>>
where
    P: CryptoProvider + ?Sized,
    R: Rng + ?Sized,
{
    if opts.secret_name.trim().is_empty() || opts.env_file.as_os_str().is_empty() {
        return Err(Error::validation(
            "secret name or secret file name can't be empty",
        ));
    }
    secret::validate_name(&opts.secret_name)?;
    require_output(&opts.output)?;

    let env = secret::load_env_file(&opts.env_file)?;
    let pair = provider.generate_key_pair(opts.bits)?;
    let (shares, retained_label) = split_private_key(provider, &pair.private, opts.split)?;
    let allocation = allocate(shares, rng)?;
    debug!(
        distributed = allocation.distributable.len(),
        "allocated private key shares"
    );

    let primary = Secret::primary(
        &opts.secret_name,
        &pair.public,
        env.iter().map(|(k, v)| (k.as_str(), v.as_str())),
    );
    let share_secrets: Vec<Secret> = allocation
        .distributable
        .iter()
        .enumerate()
        .map(|(i, share)| {
            Secret::private_key(&artifact_name(Some(&opts.secret_name), i), share.as_bytes())
        })
        .collect();
    let artifacts = bundle_simple(allocation.distributable, Some(&opts.secret_name));

    let written = with_output_dir(&opts.output, |dir| {
        dir.write(&primary.file_name(), &primary.to_yaml()?)?;
        dir.write(
            PUBLIC_KEY_FILE,
            &codec::encode(Label::PublicKey, &pair.public),
        )?;

        for (artifact, share_secret) in artifacts.iter().zip(&share_secrets) {
            dir.write(&share_secret.file_name(), &share_secret.to_yaml()?)?;
            dir.write(&artifact.key_file_name(), &artifact.bundle.encode())?;
        }

        dir.write(
            PRIVATE_KEY_FILE,
            &codec::encode(retained_label, allocation.retained.as_bytes()),
        )?;
        Ok(())
    })?;

    info!(
        secret = %opts.secret_name,
        dir = %opts.output.display(),
        custodians = artifacts.len(),
        "secrets created"
    );
    Ok(written)
}

/// Generates a key pair and optionally splits the private key
///
/// Without splitting, `private.key` holds the whole key. With splitting, one
/// random share is kept in `private.key` and the rest go to `private-<i>.key`.
///
/// # Errors
/// Returns a validation error for a missing output directory, provider errors,
/// or I/O errors while writing
pub fn generate_keys<P, R>(provider: &P, rng: &mut R, opts: &GenerateOptions) -> Result<Vec<PathBuf>>
where
    P: CryptoProvider + ?Sized,
    R: Rng + ?Sized,
{
    require_output(&opts.output)?;

    let pair = provider.generate_key_pair(opts.bits)?;
    let (shares, retained_label) = split_private_key(provider, &pair.private, opts.split)?;
    let allocation = allocate(shares, rng)?;
    let artifacts = bundle_simple(allocation.distributable, None);

    let written = with_output_dir(&opts.output, |dir| {
        dir.write(
            PUBLIC_KEY_FILE,
            &codec::encode(Label::PublicKey, &pair.public),
        )?;
        dir.write(
            PRIVATE_KEY_FILE,
            &codec::encode(retained_label, allocation.retained.as_bytes()),
        )?;
        for artifact in &artifacts {
            dir.write(&artifact.key_file_name(), &artifact.bundle.encode())?;
        }
        Ok(())
    })?;

    info!(
        dir = %opts.output.display(),
        custodians = artifacts.len(),
        "keys created"
    );
    Ok(written)
}

/// Generates a key pair and hands every node a bundle of two shares
///
/// The key is split into `2 * nodes` shares with threshold 2; node `i` receives
/// shares `2i` and `2i + 1` in `private-<i>.key`. The unsplit key is not written.
///
/// # Errors
/// Returns a validation error for a missing output directory, provider errors,
/// or I/O errors while writing
pub fn custom_generate_keys<P>(provider: &P, opts: &CustomGenerateOptions) -> Result<Vec<PathBuf>>
where
    P: CryptoProvider + ?Sized,
{
    require_output(&opts.output)?;

    let pair = provider.generate_key_pair(opts.bits)?;
    let config = SplitConfig::paired(opts.nodes);
    let shares = provider.split(
        &pair.private,
        usize::from(*config.share_count()),
        usize::from(*config.threshold()),
    )?;
    let artifacts = bundle_paired(shares)?;

    let written = with_output_dir(&opts.output, |dir| {
        dir.write(
            PUBLIC_KEY_FILE,
            &codec::encode(Label::PublicKey, &pair.public),
        )?;
        for artifact in &artifacts {
            dir.write(&artifact.key_file_name(), &artifact.bundle.encode())?;
        }
        Ok(())
    })?;

    info!(
        dir = %opts.output.display(),
        nodes = *opts.nodes,
        "paired keys created"
    );
    Ok(written)
}

/// Recombines shares read from disk and writes the private key to `private.key`
///
/// # Errors
/// Returns a validation error for missing options, [`Error::NotFound`] if an
/// input file is missing, decode or provider errors, or I/O errors while writing
pub fn combine_secrets<P>(provider: &P, opts: &CombineOptions) -> Result<Vec<PathBuf>>
where
    P: CryptoProvider + ?Sized,
{
    let source = ShareSource::parse(&opts.input)?;
    require_output(&opts.output)?;

    let private = recombiner::combine(provider, &source)?;

    let written = with_output_dir(&opts.output, |dir| {
        dir.write(PRIVATE_KEY_FILE, &codec::encode(Label::PrivateKey, &private))?;
        Ok(())
    })?;

    info!(dir = %opts.output.display(), "secrets combined");
    Ok(written)
}

fn require_output(output: &Path) -> Result<()> {
    if output.as_os_str().is_empty() {
        return Err(Error::validation("output dir can't be empty"));
    }
    Ok(())
}

/// Shares to allocate, and the label the retained one is written under
fn split_private_key<P>(
    provider: &P,
    private: &[u8],
    split: Option<SplitConfig>,
) -> Result<(Vec<Share>, Label)>
where
    P: CryptoProvider + ?Sized,
{
    match split {
        None => Ok((vec![Share::from(private)], Label::PrivateKey)),
        Some(config) => {
            let shares = provider.split(
                private,
                usize::from(*config.share_count()),
                usize::from(*config.threshold()),
            )?;
            Ok((shares, Label::KeyShare))
        }
    }
}

fn with_output_dir<F>(path: &Path, write: F) -> Result<Vec<PathBuf>>
where
    F: FnOnce(&mut OutputDir) -> Result<()>,
{
    let mut dir = OutputDir::prepare(path)?;
    match write(&mut dir) {
        Ok(()) => Ok(dir.into_written()),
        Err(err) => {
            warn!(
                dir = %path.display(),
                written = dir.written().len(),
                discarding = dir.created(),
                error = %err,
                "writing artifacts failed"
            );
            if let Err(cleanup) = dir.discard() {
                warn!(error = %cleanup, "failed to discard output directory");
            }
            Err(err)
        }
    }
}
