//! # Features de Contexto para Homógrafos
//!
//! Para cada ocorrência de um homógrafo, extrai um vetor de features
//! **categóricas** (nome → valor textual) a partir dos tokens vizinhos.
//!
//! ## Algoritmo
//!
//! 1. Insere o marcador `^` antes e depois do span do homógrafo. Os offsets
//!    são em **bytes** UTF-8, então a inserção é feita sobre os bytes da sentença.
//! 2. Tokeniza a sentença marcada com o [`Tokenizer`] injetado.
//! 3. O token alvo é o único token com exatamente dois marcadores.
//! 4. Gera as features posicionais e combinadas em torno do alvo.
//!
//! ## Features
//!
//! | Chave      | Valor                                       |
//! |------------|---------------------------------------------|
//! | `t-1`, `t-2`, `t+1`, `t+2` | token vizinho (case folding Unicode), `[$]`, `[^]` ou `[NUMERIC]` |
//! | `t-2^t+1`  | combinação (ver [`FeatureSet`])            |
//! | `t+1^t+2`  | `t+1` `^` `t+2`                             |
//! | `t-1^t+1`  | `t-1` `^` `t+1`                             |
//! | `cap(t)`   | `upper`, `lower`, `title` ou `na`           |

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HomographError, Result};
use crate::tokenizer::Tokenizer;

/// Marcador inserido em volta do homógrafo; também separa as features combinadas.
pub const MARKER: char = '^';

/// Valor para posições antes do início da sentença.
pub const BOS: &str = "[$]";
/// Valor para posições depois do fim da sentença.
pub const EOS: &str = "[^]";
/// Valor para tokens puramente numéricos.
pub const NUMERIC: &str = "[NUMERIC]";

/// As chaves emitidas em toda extração, sempre as mesmas.
pub const FEATURE_NAMES: [&str; 8] = [
    "t-1", "t-2", "t+1", "t+2", "t-2^t+1", "t+1^t+2", "t-1^t+1", "cap(t)",
];

/// Vetor de features categóricas de uma ocorrência.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: HashMap<String, String>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self {
            features: HashMap::with_capacity(FEATURE_NAMES.len()),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.features.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.features.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.features.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

/// Qual combinação é emitida na chave `t-2^t+1`.
///
/// O conjunto histórico (`Legacy`) junta `t-2` com ele mesmo, e não com `t+1`.
/// Modelos treinados com ele dependem desse valor, por isso continua sendo o padrão;
/// `Corrected` emite a combinação que o nome da chave descreve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureSet {
    #[default]
    Legacy,
    Corrected,
}

impl FromStr for FeatureSet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" => Ok(FeatureSet::Legacy),
            "corrected" => Ok(FeatureSet::Corrected),
            other => Err(format!("unknown feature set {other:?} (expected legacy or corrected)")),
        }
    }
}

/// Extrator de features com o tokenizador injetado.
///
/// Não guarda estado mutável: chamadas repetidas com a mesma entrada
/// produzem o mesmo vetor.
#[derive(Debug, Clone)]
pub struct FeatureExtractor<T> {
    tokenizer: T,
    feature_set: FeatureSet,
}

impl<T: Tokenizer> FeatureExtractor<T> {
    pub fn new(tokenizer: T) -> Self {
        Self::with_feature_set(tokenizer, FeatureSet::default())
    }

    pub fn with_feature_set(tokenizer: T, feature_set: FeatureSet) -> Self {
        Self {
            tokenizer,
            feature_set,
        }
    }

    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Extrai as features do homógrafo no span de bytes `start..end` de `sentence`.
    ///
    /// # Erros
    /// - [`HomographError::InvalidSpan`] se o span estiver fora da sentença ou
    ///   cortar um caractere multibyte.
    /// - [`HomographError::TargetNotFound`] se, após a tokenização, não houver
    ///   exatamente um token com os dois marcadores.
    pub fn extract(&self, sentence: &str, start: usize, end: usize) -> Result<FeatureVector> {
        let marked = mark_span(sentence, start, end)?;
        let tokens = self.tokenizer.tokenize(&marked);

        let candidates: Vec<usize> = tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| token.matches(MARKER).count() == 2)
            .map(|(i, _)| i)
            .collect();
        let t = match candidates.as_slice() {
            [t] => *t,
            _ => {
                return Err(HomographError::TargetNotFound {
                    sentence: sentence.to_string(),
                    start,
                    end,
                    candidates: candidates.len(),
                });
            }
        };

        // Remove marcadores e os "_" que alguns tokenizadores usam para juntar subtokens
        let target: String = tokens[t]
            .chars()
            .filter(|&c| c != MARKER && c != '_')
            .collect();

        let t = t as isize;
        let mut fv = FeatureVector::new();
        let prev1 = token_feature(&tokens, t - 1);
        let prev2 = token_feature(&tokens, t - 2);
        let next1 = token_feature(&tokens, t + 1);
        let next2 = token_feature(&tokens, t + 2);

        let prev2_next1 = match self.feature_set {
            FeatureSet::Legacy => join(&prev2, &prev2),
            FeatureSet::Corrected => join(&prev2, &next1),
        };
        fv.insert("t-2^t+1", prev2_next1);
        fv.insert("t+1^t+2", join(&next1, &next2));
        fv.insert("t-1^t+1", join(&prev1, &next1));
        fv.insert("cap(t)", capitalization(&target));
        fv.insert("t-1", prev1);
        fv.insert("t-2", prev2);
        fv.insert("t+1", next1);
        fv.insert("t+2", next2);

        Ok(fv)
    }
}

/// Insere [`MARKER`] em volta do span, trabalhando sobre os bytes UTF-8.
fn mark_span(sentence: &str, start: usize, end: usize) -> Result<String> {
    let bytes = sentence.as_bytes();
    let invalid = || HomographError::InvalidSpan {
        start,
        end,
        len: bytes.len(),
    };
    if start >= end || end > bytes.len() {
        return Err(invalid());
    }

    let mut marked = Vec::with_capacity(bytes.len() + 2);
    marked.extend_from_slice(&bytes[..start]);
    marked.push(MARKER as u8);
    marked.extend_from_slice(&bytes[start..end]);
    marked.push(MARKER as u8);
    marked.extend_from_slice(&bytes[end..]);

    String::from_utf8(marked).map_err(|_| invalid())
}

/// Valor da feature para o token na posição `index` (pode estar fora da sequência).
fn token_feature(tokens: &[String], index: isize) -> String {
    if index < 0 {
        return BOS.to_string();
    }
    match tokens.get(index as usize) {
        None => EOS.to_string(),
        Some(token) if is_numeric(token) => NUMERIC.to_string(),
        Some(token) => caseless::default_case_fold_str(token),
    }
}

fn join(left: &str, right: &str) -> String {
    format!("{left}{MARKER}{right}")
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_numeric)
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Classe de capitalização da forma superficial do alvo.
fn capitalization(word: &str) -> &'static str {
    if is_upper(word) {
        "upper"
    } else if is_lower(word) {
        "lower"
    } else if is_title(word) {
        "title"
    } else {
        "na"
    }
}

/// Ao menos um caractere com caixa e nenhum minúsculo.
fn is_upper(word: &str) -> bool {
    word.chars().any(is_cased) && !word.chars().any(char::is_lowercase)
}

fn is_lower(word: &str) -> bool {
    word.chars().any(is_cased) && !word.chars().any(char::is_uppercase)
}

/// Maiúsculas só depois de caracteres sem caixa; minúsculas só depois de caracteres com caixa.
fn is_title(word: &str) -> bool {
    let mut previous_cased = false;
    let mut seen_cased = false;
    for c in word.chars() {
        if c.is_uppercase() {
            if previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else if c.is_lowercase() {
            if !previous_cased {
                return false;
            }
            previous_cased = true;
            seen_cased = true;
        } else {
            previous_cased = false;
        }
    }
    seen_cased
}
