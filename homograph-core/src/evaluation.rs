//! # Avaliação por Arquivo de Corpus
//!
//! Cada arquivo de treino tem um arquivo de avaliação correspondente (mesmo
//! nome, diretório `eval` irmão de `train`). Para cada par:
//!
//! 1. Extrai features do treino, ajusta um vetorizador e um classificador **novos**.
//! 2. Extrai features da avaliação e vetoriza com o **mesmo** vetorizador.
//! 3. Compara predições e rótulos de referência.
//!
//! Ao final, a acurácia é agregada de duas formas:
//!
//! - **Micro**: $\sum acertos / \sum tamanhos$ (arquivos grandes pesam mais).
//! - **Macro**: média das acurácias por arquivo (todos os arquivos pesam igual).
//!
//! Os arquivos são processados em sequência e o primeiro erro aborta tudo:
//! estatísticas parciais seriam enganosas.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corpus::extract_features_file;
use crate::error::{HomographError, Result};
use crate::features::FeatureExtractor;
use crate::model::{Classifier, Learner};
use crate::tokenizer::Tokenizer;
use crate::vectorizer::DictVectorizer;

/// Acertos e total de um arquivo de avaliação.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResult {
    /// Caminho do split de avaliação.
    pub path: PathBuf,
    pub correct: usize,
    pub size: usize,
}

impl FileResult {
    pub fn accuracy(&self) -> f64 {
        self.correct as f64 / self.size as f64
    }
}

/// Acurácias agregadas sobre todos os arquivos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracySummary {
    pub micro: f64,
    pub macro_avg: f64,
    pub files: Vec<FileResult>,
}

/// Acumula resultados por arquivo até todos terem sido processados.
#[derive(Debug, Clone, Default)]
pub struct AccuracyAccumulator {
    results: Vec<FileResult>,
}

impl AccuracyAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn finalize(self) -> Result<AccuracySummary> {
        if self.results.is_empty() {
            return Err(HomographError::NoCorpusFiles);
        }
        let correct: usize = self.results.iter().map(|r| r.correct).sum();
        let size: usize = self.results.iter().map(|r| r.size).sum();
        let micro = correct as f64 / size as f64;
        let macro_avg = self.results.iter().map(FileResult::accuracy).sum::<f64>()
            / self.results.len() as f64;
        Ok(AccuracySummary {
            micro,
            macro_avg,
            files: self.results,
        })
    }
}

/// Conta os acertos de um split. Os tamanhos precisam coincidir exatamente.
pub fn score(path: &Path, predicted: &[String], gold: &[String]) -> Result<FileResult> {
    if predicted.len() != gold.len() {
        return Err(HomographError::LengthMismatch {
            predicted: predicted.len(),
            gold: gold.len(),
        });
    }
    if gold.is_empty() {
        return Err(HomographError::EmptySplit(path.to_path_buf()));
    }
    let correct = predicted.iter().zip(gold).filter(|(p, g)| p == g).count();
    Ok(FileResult {
        path: path.to_path_buf(),
        correct,
        size: gold.len(),
    })
}

/// Caminho do split de avaliação: troca o diretório `train` mais próximo do arquivo por `eval`.
pub fn eval_path_for(train_path: &Path) -> Result<PathBuf> {
    let components: Vec<_> = train_path.components().collect();
    let dirs = &components[..components.len().saturating_sub(1)];
    let pos = dirs
        .iter()
        .rposition(|c| c.as_os_str() == "train")
        .ok_or_else(|| HomographError::MissingEvalSplit(train_path.to_path_buf()))?;

    let mut eval_path = PathBuf::new();
    for (i, component) in components.iter().enumerate() {
        if i == pos {
            eval_path.push("eval");
        } else {
            eval_path.push(component.as_os_str());
        }
    }
    Ok(eval_path)
}

/// Driver de avaliação: um modelo por arquivo, sem estado compartilhado entre arquivos.
#[derive(Debug, Clone)]
pub struct Evaluator<T> {
    extractor: FeatureExtractor<T>,
    learner: Learner,
}

impl<T: Tokenizer> Evaluator<T> {
    pub fn new(extractor: FeatureExtractor<T>, learner: Learner) -> Self {
        Self { extractor, learner }
    }

    /// Avalia todos os arquivos de treino, em ordem, e agrega as acurácias.
    pub fn evaluate<I, P>(&self, train_paths: I) -> Result<AccuracySummary>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut accumulator = AccuracyAccumulator::new();
        for train_path in train_paths {
            accumulator.record(self.evaluate_file(train_path.as_ref())?);
        }
        info!("{} arquivos avaliados", accumulator.len());
        accumulator.finalize()
    }

    /// Treina e avalia um único arquivo com um classificador recém-construído.
    pub fn evaluate_file(&self, train_path: &Path) -> Result<FileResult> {
        let eval_path = eval_path_for(train_path)?;
        let mut classifier = self.learner.build();
        self.evaluate_split(train_path, &eval_path, classifier.as_mut())
    }

    /// Treina `classifier` em `train_path` e mede a acurácia em `eval_path`.
    pub fn evaluate_split(
        &self,
        train_path: &Path,
        eval_path: &Path,
        classifier: &mut dyn Classifier,
    ) -> Result<FileResult> {
        // Treino
        let (features, y) = extract_features_file(&self.extractor, train_path)?;
        let mut vectorizer = DictVectorizer::new();
        let x = vectorizer.fit_transform(&features);
        classifier.fit(&x, &y)?;

        // Avaliação
        let (features, y) = extract_features_file(&self.extractor, eval_path)?;
        let x = vectorizer.transform(&features);
        let yhat = classifier.predict(&x);
        let result = score(eval_path, &yhat, &y)?;

        info!(
            "{}: {}/{} corretos ({:.4}), {} features, modelo {}",
            train_path.display(),
            result.correct,
            result.size,
            result.accuracy(),
            vectorizer.dim(),
            self.learner.name()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::tokenizer::WordTokenizer;
    use crate::vectorizer::SparseVector;

    fn result(correct: usize, size: usize) -> FileResult {
        FileResult {
            path: PathBuf::from("eval/x.tsv"),
            correct,
            size,
        }
    }

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_micro_and_macro_differ_with_unequal_sizes() {
        let mut acc = AccuracyAccumulator::new();
        acc.record(result(8, 10));
        acc.record(result(1, 2));
        let summary = acc.finalize().unwrap();

        assert!((summary.micro - 0.75).abs() < 1e-12);
        assert!((summary.macro_avg - 0.65).abs() < 1e-12);
        assert_eq!(summary.files.len(), 2);
    }

    #[test]
    fn test_micro_equals_macro_with_equal_sizes() {
        let mut acc = AccuracyAccumulator::new();
        acc.record(result(3, 4));
        acc.record(result(1, 4));
        let summary = acc.finalize().unwrap();
        assert!((summary.micro - summary.macro_avg).abs() < 1e-12);
    }

    #[test]
    fn test_finalize_without_files() {
        assert!(matches!(
            AccuracyAccumulator::new().finalize(),
            Err(HomographError::NoCorpusFiles)
        ));
    }

    #[test]
    fn test_score() {
        let r = score(Path::new("eval/a.tsv"), &labels(&["x", "y", "x"]), &labels(&["x", "x", "x"])).unwrap();
        assert_eq!((r.correct, r.size), (2, 3));
    }

    #[test]
    fn test_score_length_mismatch() {
        let err = score(Path::new("eval/a.tsv"), &labels(&["x"]), &labels(&["x", "y"])).unwrap_err();
        assert!(matches!(err, HomographError::LengthMismatch { predicted: 1, gold: 2 }));
    }

    #[test]
    fn test_score_empty_split() {
        let err = score(Path::new("eval/a.tsv"), &[], &[]).unwrap_err();
        assert!(matches!(err, HomographError::EmptySplit(_)));
    }

    #[test]
    fn test_eval_path_for() {
        assert_eq!(
            eval_path_for(Path::new("WikipediaHomographData/data/train/bass.tsv")).unwrap(),
            PathBuf::from("WikipediaHomographData/data/eval/bass.tsv")
        );
        assert_eq!(
            eval_path_for(Path::new("/data/train/lead/train/lead.tsv")).unwrap(),
            PathBuf::from("/data/train/lead/eval/lead.tsv")
        );
        // Um arquivo chamado "train" não conta como diretório
        assert!(matches!(
            eval_path_for(Path::new("data/train")),
            Err(HomographError::MissingEvalSplit(_))
        ));
    }

    /// Classificador que "perde" a primeira predição.
    struct Truncating;

    impl Classifier for Truncating {
        fn fit(&mut self, _x: &[SparseVector], _y: &[String]) -> Result<()> {
            Ok(())
        }

        fn predict(&self, x: &[SparseVector]) -> Vec<String> {
            x.iter().skip(1).map(|_| "bass_fish".to_string()).collect()
        }
    }

    #[test]
    fn test_evaluate_split_rejects_truncated_predictions() {
        let dir = tempfile::tempdir().unwrap();
        let tsv = "sentence\thomograph\tstart\tend\twordid\n\
            He caught a bass today.\tbass\t12\t16\tbass_fish\n\
            She plays bass well.\tbass\t10\t14\tbass_music\n";
        let train = dir.path().join("train.tsv");
        let eval = dir.path().join("eval.tsv");
        fs::write(&train, tsv).unwrap();
        fs::write(&eval, tsv).unwrap();

        let evaluator = Evaluator::new(FeatureExtractor::new(WordTokenizer::default()), Learner::default());
        let err = evaluator.evaluate_split(&train, &eval, &mut Truncating).unwrap_err();
        assert!(matches!(err, HomographError::LengthMismatch { predicted: 1, gold: 2 }));
    }
}
