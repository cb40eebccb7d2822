//! Configuration conversion utilities for CLI arguments

use crate::cli::main_impl::{CliLogFormat, EvaluateArgs, PrepareArgs, TripletArgs};
use crate::config::{EvalConfig, LoaderConfig, PrepareConfig};
use crate::tracing_config::TracingFormat;
use anyhow::Result;
use std::path::PathBuf;

/// Convert CLI arguments to library configuration
pub(crate) struct CliConfigBuilder;

impl CliConfigBuilder {
    /// Build a validated `PrepareConfig`, expanding `~` in every path
    pub(crate) fn prepare_config(args: &PrepareArgs) -> Result<PrepareConfig> {
        let config = PrepareConfig::builder()
            .source_photo_root(Self::expand_tilde(&args.source_photo_root))
            .source_sketch_root(Self::expand_tilde(&args.source_sketch_root))
            .target(Self::expand_tilde(&args.target))
            .clean_target(args.clean_target)
            .test_image_files(Self::expand_tilde(&args.test_image_files))
            .test_sketch_files(Self::expand_tilde(&args.test_sketch_files))
            .file_pattern(args.pattern.clone())
            .skip_hidden(args.skip_hidden)
            .build()?;
        Ok(config)
    }

    pub(crate) fn loader_config(args: &TripletArgs) -> Result<LoaderConfig> {
        let config = LoaderConfig {
            batch_size: args.batch_size,
            shuffle: !args.no_shuffle,
            drop_last: !args.keep_last,
            seed: args.seed,
        };
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn eval_config(args: &EvaluateArgs) -> Result<EvalConfig> {
        let config = EvalConfig {
            top_k: args.top_k.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Map the CLI log format; JSON falls back to compact without `tracing-json`
    pub(crate) fn tracing_format(format: CliLogFormat) -> TracingFormat {
        match format {
            CliLogFormat::Console => TracingFormat::Console,
            CliLogFormat::Compact => TracingFormat::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => TracingFormat::Json,
            #[cfg(not(feature = "tracing-json"))]
            CliLogFormat::Json => TracingFormat::Compact,
        }
    }

    /// Expand a leading `~` to the home directory
    pub(crate) fn expand_tilde(path: &str) -> PathBuf {
        let rest = if path == "~" {
            Some("")
        } else {
            path.strip_prefix("~/")
        };
        match (rest, dirs::home_dir()) {
            (Some(""), Some(home)) => home,
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::main_impl::{Cli, Command};
    use clap::Parser;

    fn prepare_args(extra: &[&str]) -> PrepareArgs {
        let mut argv = vec!["sketchy-dataset", "prepare"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Prepare(args) => args,
            _ => panic!("expected prepare"),
        }
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(
            CliConfigBuilder::expand_tilde("dataset/"),
            PathBuf::from("dataset/")
        );
        assert_eq!(
            CliConfigBuilder::expand_tilde("/abs/~/x"),
            PathBuf::from("/abs/~/x")
        );
        if let Some(home) = dirs::home_dir() {
            assert_eq!(CliConfigBuilder::expand_tilde("~"), home);
            assert_eq!(
                CliConfigBuilder::expand_tilde("~/train_data/photo"),
                home.join("train_data/photo")
            );
        }
    }

    #[test]
    fn test_prepare_config_from_args() {
        let args = prepare_args(&[
            "--source-photo-root",
            "/data/photo",
            "--source-sketch-root",
            "/data/sketch",
            "--target",
            "/tmp/out",
            "--clean-target",
            "--pattern",
            "*.jpg",
            "--skip-hidden",
        ]);
        let config = CliConfigBuilder::prepare_config(&args).unwrap();

        assert_eq!(config.source_photo_root, PathBuf::from("/data/photo"));
        assert_eq!(config.target, PathBuf::from("/tmp/out"));
        assert!(config.clean_target);
        assert!(config.skip_hidden);
        assert_eq!(config.file_pattern.as_deref(), Some("*.jpg"));
    }

    #[test]
    fn test_prepare_config_rejects_nested_target() {
        let args = prepare_args(&[
            "--source-photo-root",
            "/data/photo",
            "--source-sketch-root",
            "/data/sketch",
            "--target",
            "/data/photo/dataset",
        ]);
        assert!(CliConfigBuilder::prepare_config(&args).is_err());
    }

    #[test]
    fn test_loader_and_eval_config() {
        let cli = Cli::try_parse_from([
            "sketchy-dataset",
            "triplets",
            "--photo-root",
            "p",
            "--sketch-root",
            "s",
            "--batch-size",
            "0",
        ])
        .unwrap();
        let Command::Triplets(args) = cli.command else {
            panic!("expected triplets");
        };
        assert!(CliConfigBuilder::loader_config(&args).is_err());

        let cli = Cli::try_parse_from([
            "sketchy-dataset",
            "evaluate",
            "--sketch-features",
            "s.json",
            "--photo-features",
            "p.json",
            "--top-k",
            "0",
        ])
        .unwrap();
        let Command::Evaluate(args) = cli.command else {
            panic!("expected evaluate");
        };
        assert!(CliConfigBuilder::eval_config(&args).is_err());
    }

    #[test]
    fn test_tracing_format_mapping() {
        assert_eq!(
            CliConfigBuilder::tracing_format(CliLogFormat::Console),
            TracingFormat::Console
        );
        assert_eq!(
            CliConfigBuilder::tracing_format(CliLogFormat::Compact),
            TracingFormat::Compact
        );
    }
}
