//! # Vetorização Categórica (one-hot)
//!
//! Converte cada par `nome=valor` de um [`FeatureVector`] em uma dimensão
//! binária. O vocabulário é aprendido no treino (`fit`) e congelado: na
//! avaliação, pares nunca vistos simplesmente não ativam nenhuma dimensão.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// Vetor esparso binário: índices ativos (ordenados) e a dimensão total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub dim: usize,
}

impl SparseVector {
    /// Produto escalar com um bloco de pesos densos.
    ///
    /// Índices além do tamanho do bloco são ignorados.
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.indices.iter().filter_map(|&i| weights.get(i)).sum()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DictVectorizer {
    vocabulary: HashMap<String, usize>,
    feature_names: Vec<String>,
}

impl DictVectorizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aprende o vocabulário, em ordem lexicográfica dos nomes `nome=valor`.
    pub fn fit(&mut self, vectors: &[FeatureVector]) -> &mut Self {
        let names: BTreeSet<String> = vectors
            .iter()
            .flat_map(|fv| fv.iter().map(|(k, v)| feature_name(k, v)))
            .collect();
        self.feature_names = names.into_iter().collect();
        self.vocabulary = self
            .feature_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        self
    }

    pub fn transform(&self, vectors: &[FeatureVector]) -> Vec<SparseVector> {
        vectors.iter().map(|fv| self.transform_one(fv)).collect()
    }

    pub fn fit_transform(&mut self, vectors: &[FeatureVector]) -> Vec<SparseVector> {
        self.fit(vectors);
        self.transform(vectors)
    }

    fn transform_one(&self, fv: &FeatureVector) -> SparseVector {
        let mut indices: Vec<usize> = fv
            .iter()
            .filter_map(|(k, v)| self.vocabulary.get(&feature_name(k, v)).copied())
            .collect();
        indices.sort_unstable();
        SparseVector {
            indices,
            dim: self.feature_names.len(),
        }
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }
}

fn feature_name(key: &str, value: &str) -> String {
    format!("{key}={value}")
}
