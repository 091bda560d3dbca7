//! # Maximum Entropy (Regressão Logística Multinomial)
//!
//! Classificador discriminativo log-linear sobre vetores esparsos binários.
//!
//! ## Algoritmo
//! - **Treinamento**: Stochastic Gradient Descent (SGD), com penalidade L1
//!   (gradiente truncado) ou L2. A força da penalidade por passo é
//!   $\lambda = 1 / (C \cdot n)$, onde `n` é o número de exemplos: `C` grande
//!   significa pouca regularização.
//! - **Predição**: o rótulo com maior score; empates vão para o primeiro rótulo
//!   em ordem lexicográfica.
//!
//! O modelo calcula: P(rótulo | x) ~ exp(bias + dot(pesos, x))

use std::collections::{BTreeSet, HashMap};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HomographError, Result};
use crate::model::Classifier;
use crate::vectorizer::SparseVector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Penalty {
    /// Lasso: zera pesos pouco úteis (modelo esparso).
    #[default]
    L1,
    /// Ridge: encolhe pesos proporcionalmente.
    L2,
}

impl FromStr for Penalty {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l1" => Ok(Penalty::L1),
            "l2" => Ok(Penalty::L2),
            other => Err(format!("unknown penalty {other:?} (expected l1 or l2)")),
        }
    }
}

/// Hiperparâmetros do treino por SGD.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxEntConfig {
    /// Número de passadas completas pelos dados.
    pub epochs: usize,
    /// Taxa de aprendizado ($\eta$).
    pub learning_rate: f64,
    pub penalty: Penalty,
    /// Inverso da força de regularização.
    pub c: f64,
}

impl Default for MaxEntConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            learning_rate: 0.1,
            penalty: Penalty::L1,
            c: 100.0,
        }
    }
}

/// Modelo de Entropia Máxima.
///
/// Os pesos ficam num bloco denso por rótulo: `weights[k * dim + f]` é o peso
/// da feature `f` para o rótulo `k`. O bias de cada rótulo não é regularizado.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxEntModel {
    config: MaxEntConfig,
    /// Rótulos conhecidos, ordenados.
    labels: Vec<String>,
    weights: Vec<f64>,
    bias: Vec<f64>,
    dim: usize,
}

impl MaxEntConfig {
    /// `c` e `learning_rate` precisam ser positivos e finitos.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("C", self.c), ("learning rate", self.learning_rate)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(HomographError::InvalidConfig { name, value });
            }
        }
        Ok(())
    }
}

impl MaxEntModel {
    pub fn new(config: MaxEntConfig) -> Self {
        Self {
            config,
            labels: Vec::new(),
            weights: Vec::new(),
            bias: Vec::new(),
            dim: 0,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn compute_scores(&self, x: &SparseVector) -> Vec<f64> {
        (0..self.labels.len())
            .map(|k| self.bias[k] + x.dot(&self.weights[k * self.dim..(k + 1) * self.dim]))
            .collect()
    }
}

impl Classifier for MaxEntModel {
    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> Result<()> {
        self.config.validate()?;
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
        let gold: Vec<usize> = y.iter().map(|l| label_index[l.as_str()]).collect();

        self.dim = x.iter().map(|v| v.dim).max().unwrap_or(0);
        self.weights = vec![0.0; self.labels.len() * self.dim];
        self.bias = vec![0.0; self.labels.len()];

        let rate = self.config.learning_rate;
        let lambda = 1.0 / (self.config.c * x.len() as f64);

        for epoch in 0..self.config.epochs {
            let mut correct = 0;

            for (xi, &gi) in x.iter().zip(&gold) {
                // 1. Forward
                let scores = self.compute_scores(xi);
                if argmax(&scores) == gi {
                    correct += 1;
                }
                let probs = softmax(&scores);

                // 2. Atualização: w = w + rate * (indicador_rótulo_correto - prob)
                for (k, prob) in probs.into_iter().enumerate() {
                    let indicator = if k == gi { 1.0 } else { 0.0 };
                    let error = indicator - prob;
                    if error.abs() <= 1e-9 {
                        continue;
                    }
                    self.bias[k] += rate * error;

                    let row = &mut self.weights[k * self.dim..(k + 1) * self.dim];
                    for &f in &xi.indices {
                        let Some(w) = row.get_mut(f) else { continue };
                        *w = match self.config.penalty {
                            Penalty::L2 => *w + rate * (error - lambda * *w),
                            Penalty::L1 => shrink(*w + rate * error, rate * lambda),
                        };
                    }
                }
            }

            debug!(
                "maxent epoch {epoch}: acurácia de treino {:.2}%",
                correct as f64 / x.len() as f64 * 100.0
            );
        }

        Ok(())
    }

    fn predict(&self, x: &[SparseVector]) -> Vec<String> {
        if self.labels.is_empty() {
            return Vec::new();
        }
        x.iter()
            .map(|xi| self.labels[argmax(&self.compute_scores(xi))].clone())
            .collect()
    }
}

/// Aproxima o peso de zero em `amount`, sem cruzar o zero (gradiente truncado).
fn shrink(w: f64, amount: f64) -> f64 {
    if w > amount {
        w - amount
    } else if w < -amount {
        w + amount
    } else {
        0.0
    }
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max_score = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max_score).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Índice do maior score; o primeiro vence em caso de empate.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }
    best
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

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_maxent_simple_learning() {
        let x = vec![sv(&[0, 2], 4), sv(&[1, 3], 4), sv(&[0, 3], 4), sv(&[1, 2], 4)];
        let y = labels(&["bass_fish", "bass_music", "bass_fish", "bass_music"]);

        let mut model = MaxEntModel::new(MaxEntConfig::default());
        model.fit(&x, &y).unwrap();

        assert_eq!(model.labels(), ["bass_fish", "bass_music"]);
        assert_eq!(model.predict(&[sv(&[0], 4), sv(&[1], 4)]), ["bass_fish", "bass_music"]);
    }

    #[test]
    fn test_maxent_l2_learning() {
        let config = MaxEntConfig {
            penalty: Penalty::L2,
            ..MaxEntConfig::default()
        };
        let x = vec![sv(&[0], 2), sv(&[1], 2)];
        let y = labels(&["a", "b"]);

        let mut model = MaxEntModel::new(config);
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&x), ["a", "b"]);
    }

    #[test]
    fn test_unseen_features_fall_back_to_prior() {
        let x = vec![sv(&[0], 1), sv(&[0], 1), sv(&[0], 1), sv(&[0], 1)];
        let y = labels(&["b", "a", "a", "a"]);

        let mut model = MaxEntModel::new(MaxEntConfig::default());
        model.fit(&x, &y).unwrap();
        assert_eq!(model.predict(&[sv(&[], 1)]), ["a"]);
    }

    #[test]
    fn test_empty_training_set() {
        let mut model = MaxEntModel::new(MaxEntConfig::default());
        assert!(matches!(model.fit(&[], &[]), Err(HomographError::EmptyTrainingSet)));
    }

    #[test]
    fn test_rejects_non_positive_regularization() {
        let x = vec![sv(&[0], 2), sv(&[1], 2)];
        let y = labels(&["a", "b"]);

        for c in [0.0, -1.0, f64::INFINITY, f64::NAN] {
            let mut model = MaxEntModel::new(MaxEntConfig {
                penalty: Penalty::L2,
                c,
                ..MaxEntConfig::default()
            });
            let err = model.fit(&x, &y).unwrap_err();
            assert!(matches!(err, HomographError::InvalidConfig { name: "C", .. }));
            assert!(model.labels().is_empty());
        }
    }

    #[test]
    fn test_rejects_non_positive_learning_rate() {
        let config = MaxEntConfig {
            learning_rate: 0.0,
            ..MaxEntConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(HomographError::InvalidConfig { name: "learning rate", .. })
        ));
        assert!(MaxEntConfig::default().validate().is_ok());
    }

    #[test]
    fn test_shrink_does_not_cross_zero() {
        assert_eq!(shrink(0.5, 0.2), 0.3);
        assert_eq!(shrink(-0.1, 0.2), 0.0);
        assert_eq!(shrink(-0.5, 0.25), -0.25);
    }

    #[test]
    fn test_argmax_ties_go_to_first() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
    }

    #[test]
    fn test_penalty_from_str() {
        assert_eq!("L2".parse::<Penalty>(), Ok(Penalty::L2));
        assert!("elasticnet".parse::<Penalty>().is_err());
    }
}
