use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::commands::{CombineOptions, CreateOptions, CustomGenerateOptions, GenerateOptions};
use crate::domain::{NodeCount, ShareCount, SplitConfig, Threshold};
use crate::error::Result;
use crate::provider::KeyAlgorithm;

#[derive(Parser)]
#[command(name = "keyquorum", version)]
#[command(about = "Generate key pairs and distribute the private key as threshold shares")]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, global = true, env = "KEYQUORUM_LOG", default_value = "warn")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create Kubernetes secrets from an env file and distribute the private key
    #[command(alias = "update")]
    Create {
        /// Secret name
        #[arg(short, long)]
        name: String,

        /// Env file with KEY=value lines
        #[arg(short, long)]
        filename: PathBuf,

        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        split: SplitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate a key pair, optionally splitting the private key
    Generate {
        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        split: SplitArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Generate a key pair and give every node a bundle of two shares
    CustomGenerate {
        /// Number of nodes (each receives two shares, threshold is 2)
        #[arg(long, default_value_t = 1)]
        node: u8,

        #[command(flatten)]
        key: KeyArgs,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Recombine shares into the private key
    Combine {
        /// Share file (one share per line) or comma-separated list of key files
        #[arg(short, long)]
        filename: String,

        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Args)]
pub struct KeyArgs {
    /// Key size in bits (0 selects the algorithm's default)
    #[arg(short, long, default_value_t = 0)]
    pub bits: u32,

    /// Key algorithm; inferred from --bits when omitted (256 is ed25519, anything else rsa)
    #[arg(long, value_enum)]
    pub algorithm: Option<KeyAlgorithm>,
}

impl KeyArgs {
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
            .unwrap_or_else(|| KeyAlgorithm::from_bits(self.bits))
    }
}

impl Commands {
    /// Algorithm of the keys this command generates
    ///
    /// `combine` generates nothing; any provider recombines shares.
    #[must_use]
    pub fn algorithm(&self) -> KeyAlgorithm {
        match self {
            Self::Create { key, .. }
            | Self::Generate { key, .. }
            | Self::CustomGenerate { key, .. } => key.algorithm(),
            Self::Combine { .. } => KeyAlgorithm::default(),
        }
    }
}

#[derive(Args)]
pub struct SplitArgs {
    /// Split the private key into shares
    #[arg(long)]
    pub split: bool,

    /// Number of shares to create
    #[arg(long, default_value_t = 1)]
    pub parts: u8,

    /// Minimum number of shares needed to reconstruct
    #[arg(long, default_value_t = 1)]
    pub threshold: u8,
}

impl SplitArgs {
    /// Validated split parameters, `None` when not splitting
    ///
    /// # Errors
    /// Returns a validation error for a zero share count or threshold, or a
    /// threshold above the share count
    pub fn config(&self) -> Result<Option<SplitConfig>> {
        if !self.split {
            return Ok(None);
        }
        let threshold = Threshold::new(self.threshold)?;
        let share_count = ShareCount::new(self.parts)?;
        SplitConfig::new(threshold, share_count).map(Some)
    }
}

#[derive(Args)]
pub struct OutputArgs {
    /// Output directory, created if missing
    #[arg(short, long, env = "KEYQUORUM_OUTPUT")]
    pub output: Option<PathBuf>,
}

impl OutputArgs {
    /// The output directory, empty when not given so the workflow reports it
    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.output.unwrap_or_default()
    }
}

/// A parsed command with its options validated
pub enum Workflow {
    Create(CreateOptions),
    Generate(GenerateOptions),
    CustomGenerate(CustomGenerateOptions),
    Combine(CombineOptions),
}

impl TryFrom<Commands> for Workflow {
    type Error = crate::error::Error;

    fn try_from(command: Commands) -> Result<Self> {
        Ok(match command {
            Commands::Create {
                name,
                filename,
                key,
                split,
                output,
            } => Self::Create(CreateOptions {
                secret_name: name,
                env_file: filename,
                bits: key.bits,
                split: split.config()?,
                output: output.into_path(),
            }),
            Commands::Generate { key, split, output } => Self::Generate(GenerateOptions {
                bits: key.bits,
                split: split.config()?,
                output: output.into_path(),
            }),
            Commands::CustomGenerate { node, key, output } => {
                Self::CustomGenerate(CustomGenerateOptions {
                    nodes: NodeCount::new(node)?,
                    bits: key.bits,
                    output: output.into_path(),
                })
            }
            Commands::Combine { filename, output } => Self::Combine(CombineOptions {
                input: filename,
                output: output.into_path(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    fn parse(args: &[&str]) -> Workflow {
        let cli = Cli::try_parse_from(args).unwrap();
        Workflow::try_from(cli.command).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_generate_defaults_do_not_split() {
        let Workflow::Generate(opts) = parse(&["keyquorum", "generate", "-o", "out"]) else {
            panic!("expected generate");
        };
        assert_eq!(opts.bits, 0);
        assert!(opts.split.is_none());
        assert_eq!(opts.output, PathBuf::from("out"));
    }

    #[test]
    fn test_generate_with_split() {
        let Workflow::Generate(opts) = parse(&[
            "keyquorum",
            "generate",
            "--split",
            "--parts",
            "5",
            "--threshold",
            "3",
            "-o",
            "out",
        ]) else {
            panic!("expected generate");
        };
        let config = opts.split.unwrap();
        assert_eq!(*config.share_count(), 5);
        assert_eq!(*config.threshold(), 3);
    }

    #[test]
    fn test_threshold_above_parts_is_validation_error() {
        let cli = Cli::try_parse_from([
            "keyquorum",
            "generate",
            "--split",
            "--parts",
            "2",
            "--threshold",
            "3",
        ])
        .unwrap();
        let err = Workflow::try_from(cli.command).err().unwrap();
        assert!(err.is_validation());
    }

    #[test]
    fn test_update_is_alias_of_create() {
        let Workflow::Create(opts) = parse(&[
            "keyquorum", "update", "--name", "app", "--filename", ".env", "-o", "out",
        ]) else {
            panic!("expected create");
        };
        assert_eq!(opts.secret_name, "app");
        assert_eq!(opts.env_file, PathBuf::from(".env"));
    }

    #[test]
    fn test_custom_generate_zero_nodes_is_validation_error() {
        let cli = Cli::try_parse_from(["keyquorum", "custom-generate", "--node", "0"]).unwrap();
        assert!(Workflow::try_from(cli.command).err().unwrap().is_validation());
    }

    #[test]
    fn test_combine_keeps_file_list_verbatim() {
        let Workflow::Combine(opts) =
            parse(&["keyquorum", "combine", "-f", "a.key,b.key", "-o", "out"])
        else {
            panic!("expected combine");
        };
        assert_eq!(opts.input, "a.key,b.key");
    }

    #[test]
    fn test_algorithm_inferred_from_bits() {
        let cli = Cli::try_parse_from(["keyquorum", "generate", "--bits", "2048"]).unwrap();
        assert_eq!(cli.command.algorithm(), KeyAlgorithm::Rsa);

        let cli = Cli::try_parse_from(["keyquorum", "generate"]).unwrap();
        assert_eq!(cli.command.algorithm(), KeyAlgorithm::Rsa);

        let cli = Cli::try_parse_from(["keyquorum", "custom-generate", "--bits", "256"]).unwrap();
        assert_eq!(cli.command.algorithm(), KeyAlgorithm::Ed25519);
    }

    #[test]
    fn test_algorithm_by_name() {
        let cli =
            Cli::try_parse_from(["keyquorum", "generate", "--algorithm", "ed25519"]).unwrap();
        assert_eq!(cli.command.algorithm(), KeyAlgorithm::Ed25519);

        let Workflow::Generate(opts) = Workflow::try_from(cli.command).unwrap() else {
            panic!("expected generate");
        };
        assert_eq!(opts.bits, 0);
    }

    #[test]
    fn test_log_level_parsed_by_clap() {
        let cli = Cli::try_parse_from(["keyquorum", "--log-level", "debug", "generate"]).unwrap();
        assert_eq!(cli.log_level, tracing::Level::DEBUG);

        let err = Cli::try_parse_from(["keyquorum", "--log-level", "verbose", "generate"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
