//! # Erros do Sistema de Desambiguação
//!
//! Toda falha aqui é estrutural (dados ou tokenização incompatíveis), nunca
//! transitória: nada é re-tentado e qualquer erro aborta a execução inteira.

use std::path::PathBuf;

use thiserror::Error;

/// Result com [`HomographError`] como erro padrão.
pub type Result<T, E = HomographError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum HomographError {
    /// Após inserir os marcadores e tokenizar, nenhum token único contém os dois marcadores.
    #[error("target homograph not found in {sentence:?} (span {start}..{end}, {candidates} candidate tokens)")]
    TargetNotFound {
        sentence: String,
        start: usize,
        end: usize,
        candidates: usize,
    },

    /// O span não respeita `start < end <= len` ou corta um caractere UTF-8 ao meio.
    #[error("invalid span {start}..{end} for sentence of {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// Falha de extração numa linha específica de um arquivo de corpus.
    #[error("{path}:{line}: homograph {homograph:?}: {source}")]
    Row {
        path: PathBuf,
        line: u64,
        homograph: String,
        #[source]
        source: Box<HomographError>,
    },

    /// Predições e rótulos de referência com tamanhos diferentes.
    #[error("mismatched lengths: {predicted} predictions for {gold} gold labels")]
    LengthMismatch { predicted: usize, gold: usize },

    #[error("evaluation split {0} has no rows")]
    EmptySplit(PathBuf),

    /// Hiperparâmetro fora do domínio válido (ex.: `C <= 0`).
    #[error("invalid {name}: {value} (must be positive and finite)")]
    InvalidConfig { name: &'static str, value: f64 },

    #[error("cannot fit a classifier on an empty training set")]
    EmptyTrainingSet,

    /// O caminho de treino não tem um diretório `train` para trocar por `eval`.
    #[error("no `train` directory in {0}, cannot locate its evaluation split")]
    MissingEvalSplit(PathBuf),

    #[error("no corpus files were evaluated")]
    NoCorpusFiles,

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
