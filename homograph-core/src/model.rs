//! # Classificadores
//!
//! O driver de avaliação só conhece o trait [`Classifier`]: ajusta em
//! vetores esparsos com rótulos e prediz um rótulo por vetor. [`Learner`]
//! descreve qual implementação usar e constrói uma instância **nova** a cada
//! chamada, para que nenhum estado treinado vaze entre arquivos.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::maxent::{MaxEntConfig, MaxEntModel};
use crate::perceptron::PerceptronModel;
use crate::vectorizer::SparseVector;

/// Classificador supervisionado sobre features categóricas vetorizadas.
pub trait Classifier {
    /// Ajusta o modelo. `x` e `y` têm o mesmo tamanho.
    fn fit(&mut self, x: &[SparseVector], y: &[String]) -> Result<()>;

    /// Prediz um rótulo para cada vetor, na mesma ordem.
    ///
    /// Um modelo que ainda não foi ajustado não conhece rótulos e devolve um vetor vazio.
    fn predict(&self, x: &[SparseVector]) -> Vec<String>;
}

/// Configuração do classificador usado em cada arquivo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Learner {
    MaxEnt(MaxEntConfig),
    Perceptron { iterations: usize },
}

impl Default for Learner {
    fn default() -> Self {
        Learner::MaxEnt(MaxEntConfig::default())
    }
}

impl Learner {
    /// Constrói um classificador sem nenhum estado treinado.
    pub fn build(&self) -> Box<dyn Classifier> {
        match self {
            Learner::MaxEnt(config) => Box::new(MaxEntModel::new(config.clone())),
            Learner::Perceptron { iterations } => Box::new(PerceptronModel::new(*iterations)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Learner::MaxEnt(_) => "maxent",
            Learner::Perceptron { .. } => "perceptron",
        }
    }
}

/// Tipo de classificador escolhido na linha de comando.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LearnerKind {
    #[default]
    MaxEnt,
    Perceptron,
}

impl FromStr for LearnerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "maxent" | "logistic" => Ok(LearnerKind::MaxEnt),
            "perceptron" => Ok(LearnerKind::Perceptron),
            other => Err(format!("unknown learner {other:?} (expected maxent or perceptron)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_returns_untrained_models() {
        let x = vec![SparseVector { indices: vec![0], dim: 1 }];
        let y = vec!["a".to_string()];

        let learner = Learner::Perceptron { iterations: 2 };
        let mut first = learner.build();
        first.fit(&x, &y).unwrap();
        assert_eq!(first.predict(&x), ["a"]);

        // Um modelo novo não conhece nenhum rótulo
        let second = learner.build();
        assert!(second.predict(&x).is_empty());
    }

    #[test]
    fn test_learner_kind_from_str() {
        assert_eq!("Perceptron".parse::<LearnerKind>(), Ok(LearnerKind::Perceptron));
        assert_eq!("logistic".parse::<LearnerKind>(), Ok(LearnerKind::MaxEnt));
        assert!("svm".parse::<LearnerKind>().is_err());
    }
}
