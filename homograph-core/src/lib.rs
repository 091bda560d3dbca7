//! # homograph-core — Desambiguação de Homógrafos por Contexto
//!
//! Homógrafos são palavras com a mesma grafia e pronúncias ou sentidos
//! diferentes ("record" substantivo vs. verbo). Este crate prediz o sentido
//! de uma ocorrência a partir da sentença em volta dela.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: arquivos TSV com sentença, span de bytes do homógrafo e rótulo ([`corpus`]).
//! 2.  **Tokenização** ([`tokenizer`]): capacidade injetada, texto → tokens.
//! 3.  **Extração de Features** ([`features`]): marca o span, acha o token alvo e gera
//!     features categóricas dos vizinhos.
//! 4.  **Vetorização** ([`vectorizer`]): one-hot dos pares `nome=valor`.
//! 5.  **Classificação** ([`model`], [`maxent`], [`perceptron`]).
//! 6.  **Avaliação** ([`evaluation`]): um modelo por arquivo, acurácias micro e macro.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use homograph_core::{FeatureExtractor, WordTokenizer};
//!
//! let extractor = FeatureExtractor::new(WordTokenizer::default());
//! let sentence = "I need to record the record.";
//! let features = extractor.extract(sentence, 21, 27).unwrap();
//!
//! assert_eq!(features.get("t-1"), Some("the"));
//! assert_eq!(features.get("t+1"), Some("."));
//! assert_eq!(features.get("cap(t)"), Some("lower"));
//! ```

pub mod corpus;
pub mod error;
pub mod evaluation;
pub mod features;
pub mod maxent;
pub mod model;
pub mod perceptron;
pub mod tokenizer;
pub mod vectorizer;

pub use error::{HomographError, Result};
pub use evaluation::{AccuracySummary, Evaluator, FileResult};
pub use features::{FeatureExtractor, FeatureSet, FeatureVector};
pub use maxent::{MaxEntConfig, Penalty};
pub use model::{Classifier, Learner, LearnerKind};
pub use tokenizer::{Tokenizer, TokenizerMode, WordTokenizer};
