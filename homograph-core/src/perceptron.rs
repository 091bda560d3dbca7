//! # Averaged Perceptron
//!
//! Algoritmo online simples, alternativa ao MaxEnt quando se quer treinar rápido.
//! Utiliza "Lazy Averaging" para evitar custo O(N*T) na atualização dos pesos médios.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HomographError, Result};
use crate::maxent::argmax;
use crate::model::Classifier;
use crate::vectorizer::SparseVector;

/// Modelo Perceptron Médio (Averaged Perceptron).
///
/// Processa um exemplo por vez e só atualiza os pesos quando erra
/// (promove o rótulo correto, penaliza o predito). O modelo final usa a
/// **média** dos pesos ao longo de todos os passos.
///
/// # Lazy Averaging
/// A média de um peso só é atualizada quando ele muda, acumulando
/// `passos_desde_a_última_mudança * peso_antigo`.
///
/// Cada rótulo tem um bloco de `dim + 1` pesos; a última posição é o bias.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptronModel {
    iterations: usize,
    labels: Vec<String>,
    dim: usize,
    /// Pesos atuais $w$ (médios depois do treino).
    weights: Vec<f64>,
    /// Soma acumulada dos pesos: $\sum w_t$.
    total_weights: Vec<f64>,
    /// Último passo em que cada peso foi atualizado.
    last_update: Vec<usize>,
    /// Número total de passos de treino (exemplos processados).
    steps: usize,
}

impl PerceptronModel {
    pub fn new(iterations: usize) -> Self {
        Self {
            iterations,
            labels: Vec::new(),
            dim: 0,
            weights: Vec::new(),
            total_weights: Vec::new(),
            last_update: Vec::new(),
            steps: 0,
        }
    }

    fn row_width(&self) -> usize {
        self.dim + 1
    }

    fn score(&self, x: &SparseVector, label: usize) -> f64 {
        let row = &self.weights[label * self.row_width()..(label + 1) * self.row_width()];
        row[self.dim] + x.dot(&row[..self.dim])
    }

    fn predict_index(&self, x: &SparseVector) -> usize {
        let scores: Vec<f64> = (0..self.labels.len()).map(|k| self.score(x, k)).collect();
        argmax(&scores)
    }

    /// $w_{correto} \leftarrow w_{correto} + \phi(x)$, $w_{errado} \leftarrow w_{errado} - \phi(x)$
    fn update(&mut self, x: &SparseVector, gold: usize, predicted: usize) {
        let features: Vec<usize> = x
            .indices
            .iter()
            .copied()
            .filter(|&f| f < self.dim)
            .chain(std::iter::once(self.dim))
            .collect();
        for f in features {
            self.update_feature(gold * self.row_width() + f, 1.0);
            self.update_feature(predicted * self.row_width() + f, -1.0);
        }
    }

    /// Atualiza um peso aplicando Lazy Averaging.
    fn update_feature(&mut self, key: usize, delta: f64) {
        // Acumula o peso ANTIGO pelos passos em que ficou constante
        let since = (self.steps - self.last_update[key]) as f64;
        self.total_weights[key] += since * self.weights[key];
        self.last_update[key] = self.steps;
        self.weights[key] += delta;
    }

    /// Substitui os pesos pelas médias ($\sum w_t / T$).
    fn finalize_weights(&mut self) {
        if self.steps == 0 {
            return;
        }
        let steps = self.steps as f64;
        for key in 0..self.weights.len() {
            let since = (self.steps - self.last_update[key]) as f64;
            self.total_weights[key] += since * self.weights[key];
            self.weights[key] = self.total_weights[key] / steps;
        }
        self.total_weights.clear();
        self.last_update.clear();
    }
}

impl Classifier for PerceptronModel {
    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> Result<()> {
        if x.is_empty() {
            return Err(HomographError::EmptyTrainingSet);
        }
        if x.len() != y.len() {
            return Err(HomographError::LengthMismatch {
                predicted: x.len(),
                gold: y.len(),
            });
        }

        let label_set: BTreeSet<&String> = y.iter().collect();
        self.labels = label_set.into_iter().cloned().collect();
        let label_index: HashMap<&str, usize> = self
            .labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.as_str(), i))
            .collect();
        let golds: Vec<usize> = y.iter().map(|l| label_index[l.as_str()]).collect();

        self.dim = x.iter().map(|v| v.dim).max().unwrap_or(0);
        let size = self.labels.len() * self.row_width();
        self.weights = vec![0.0; size];
        self.total_weights = vec![0.0; size];
        self.last_update = vec![0; size];
        self.steps = 0;

        for iteration in 0..self.iterations {
            let mut mistakes = 0;
            for (xi, &gold) in x.iter().zip(&golds) {
                // Predição com os pesos REAIS (não médios) durante o treino
                let predicted = self.predict_index(xi);
                if predicted != gold {
                    self.update(xi, gold, predicted);
                    mistakes += 1;
                }
                self.steps += 1;
            }
            debug!("perceptron iteração {iteration}: {mistakes} erros");
        }

        self.finalize_weights();
        Ok(())
    }

    fn predict(&self, x: &[SparseVector]) -> Vec<String> {
        if self.labels.is_empty() {
            return Vec::new();
        }
        x.iter()
            .map(|xi| self.labels[self.predict_index(xi)].clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sv(indices: &[usize], dim: usize) -> SparseVector {
        SparseVector {
            indices: indices.to_vec(),
            dim,
        }
    }

    #[test]
    fn test_perceptron_learning_lazy() {
        let x = vec![sv(&[0], 2), sv(&[1], 2)];
        let y = vec!["lead_metal".to_string(), "lead_verb".to_string()];

        let mut model = PerceptronModel::new(5);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.predict(&x), ["lead_metal", "lead_verb"]);
    }

    #[test]
    fn test_averaged_weights() {
        let x = vec![sv(&[0], 2), sv(&[1], 2)];
        let y = vec!["a".to_string(), "b".to_string()];

        let mut model = PerceptronModel::new(5);
        model.fit(&x, &y).unwrap();

        // Erros nos passos 1 e 2, depois converge; 10 passos no total
        let w = model.row_width();
        assert!((model.weights[0] - 0.8).abs() < 1e-12);
        assert!((model.weights[w + 1] - 0.9).abs() < 1e-12);
        assert!((model.weights[2] + 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_three_labels() {
        let x = vec![sv(&[0], 3), sv(&[1], 3), sv(&[2], 3)];
        let y = vec!["a".to_string(), "b".to_string(), "c".to_string()];

        let mut model = PerceptronModel::new(5);
        model.fit(&x, &y).unwrap();

        assert_eq!(model.labels, ["a", "b", "c"]);
        assert_eq!(model.predict(&x), ["a", "b", "c"]);
    }

    #[test]
    fn test_empty_training_set() {
        let mut model = PerceptronModel::new(3);
        assert!(matches!(model.fit(&[], &[]), Err(HomographError::EmptyTrainingSet)));
    }
}
