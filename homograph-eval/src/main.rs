//! Treina e avalia um classificador de homógrafos por arquivo de corpus
//!
//! Para cada arquivo de treino encontrado pelo padrão glob, usa o arquivo
//! correspondente em `eval/` e reporta as acurácias micro e macro.
//!
//! Uso:
//!   homograph-eval
//!   homograph-eval 'WikipediaHomographData/data/train/*.tsv' --learner perceptron
//!   homograph-eval --feature-set corrected --penalty l2 -C 10 --verbose

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use homograph_core::{
    Evaluator, FeatureExtractor, FeatureSet, Learner, LearnerKind, MaxEntConfig, Penalty,
    TokenizerMode, WordTokenizer,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

const TRAIN_TSV: &str = "WikipediaHomographData/data/train/*.tsv";

#[derive(Parser, Debug)]
#[command(name = "homograph-eval", about = "Per-corpus homograph disambiguation evaluation")]
struct Args {
    /// Glob pattern for the training files; each must have a sibling `eval` directory.
    #[arg(default_value = TRAIN_TSV)]
    train_pattern: String,

    /// Word tokenizer: treebank or whitespace.
    #[arg(long, default_value = "treebank")]
    tokenizer: TokenizerMode,

    /// Feature set: legacy (t-2^t+1 joins t-2 with itself) or corrected.
    #[arg(long, default_value = "legacy")]
    feature_set: FeatureSet,

    /// Classifier: maxent or perceptron.
    #[arg(long, default_value = "maxent")]
    learner: LearnerKind,

    /// Training epochs (iterations for the perceptron).
    #[arg(long, default_value_t = 20)]
    epochs: usize,

    /// SGD learning rate for maxent.
    #[arg(long, default_value_t = 0.1)]
    learning_rate: f64,

    /// Regularization penalty for maxent: l1 or l2.
    #[arg(long, default_value = "l1")]
    penalty: Penalty,

    /// Inverse regularization strength for maxent.
    #[arg(short = 'C', long, default_value_t = 100.0)]
    inverse_regularization: f64,

    /// Log per-file and per-epoch details.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn learner(&self) -> Learner {
        match self.learner {
            LearnerKind::MaxEnt => Learner::MaxEnt(MaxEntConfig {
                epochs: self.epochs,
                learning_rate: self.learning_rate,
                penalty: self.penalty,
                c: self.inverse_regularization,
            }),
            LearnerKind::Perceptron => Learner::Perceptron {
                iterations: self.epochs,
            },
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let learner = args.learner();
    if let Learner::MaxEnt(config) = &learner {
        config.validate()?;
    }

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    let mut train_paths: Vec<PathBuf> = glob::glob(&args.train_pattern)
        .with_context(|| format!("invalid glob pattern {:?}", args.train_pattern))?
        .collect::<Result<_, _>>()
        .context("failed to list training files")?;
    train_paths.sort();
    info!("{} arquivos de treino em {}", train_paths.len(), args.train_pattern);

    let extractor = FeatureExtractor::with_feature_set(
        WordTokenizer::new(args.tokenizer),
        args.feature_set,
    );
    let evaluator = Evaluator::new(extractor, learner);
    let summary = evaluator.evaluate(&train_paths)?;

    info!("Micro-average accuracy:\t{:.4}", summary.micro);
    info!("Macro-average accuracy:\t{:.4}", summary.macro_avg);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args() {
        let args = Args::parse_from(["homograph-eval"]);
        assert_eq!(args.train_pattern, TRAIN_TSV);
        assert_eq!(args.tokenizer, TokenizerMode::Treebank);
        assert_eq!(args.feature_set, FeatureSet::Legacy);
        assert_eq!(args.learner(), Learner::MaxEnt(MaxEntConfig::default()));
    }

    #[test]
    fn test_perceptron_args() {
        let args = Args::parse_from([
            "homograph-eval",
            "corpus/train/*.tsv",
            "--learner",
            "perceptron",
            "--epochs",
            "7",
            "--feature-set",
            "corrected",
        ]);
        assert_eq!(args.train_pattern, "corpus/train/*.tsv");
        assert_eq!(args.feature_set, FeatureSet::Corrected);
        assert_eq!(args.learner(), Learner::Perceptron { iterations: 7 });
    }

    #[test]
    fn test_zero_regularization_is_invalid() {
        let args = Args::parse_from(["homograph-eval", "-C", "0"]);
        match args.learner() {
            Learner::MaxEnt(config) => assert!(config.validate().is_err()),
            other => panic!("unexpected learner: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_unknown_penalty() {
        assert!(Args::try_parse_from(["homograph-eval", "--penalty", "l3"]).is_err());
    }
}
