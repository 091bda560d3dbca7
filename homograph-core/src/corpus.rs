//! # Corpus de Homógrafos (TSV)
//!
//! Cada arquivo é uma tabela separada por tabulação com cabeçalho e ao menos
//! as colunas `sentence`, `homograph`, `start`, `end` e `wordid`. Colunas
//! extras são ignoradas.
//!
//! A passada sobre um arquivo é **tudo ou nada**: se uma linha falhar na
//! extração, o arquivo inteiro falha e nenhum resultado parcial é devolvido.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{HomographError, Result};
use crate::features::{FeatureExtractor, FeatureVector};
use crate::tokenizer::Tokenizer;

/// Uma linha anotada do corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusRow {
    /// A sentença completa.
    pub sentence: String,
    /// Forma superficial do homógrafo (apenas para diagnóstico).
    pub homograph: String,
    /// Offset de byte inicial do homógrafo na sentença (UTF-8).
    pub start: usize,
    /// Offset de byte final (exclusivo).
    pub end: usize,
    /// Rótulo do sentido / pronúncia.
    pub wordid: String,
    /// Linha física (1-based, cabeçalho incluso) onde o registro começa.
    #[serde(skip)]
    pub line: u64,
}

/// Lê todas as linhas de uma fonte TSV.
pub fn read_rows<R: Read>(reader: R) -> Result<Vec<CorpusRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let mut row: CorpusRow = record.deserialize(Some(&headers))?;
        // Campos entre aspas podem ocupar várias linhas
        row.line = record.position().map(|p| p.line()).unwrap_or_default();
        rows.push(row);
    }
    Ok(rows)
}

/// Lê todas as linhas de um arquivo TSV.
pub fn read_file(path: &Path) -> Result<Vec<CorpusRow>> {
    let file = File::open(path).map_err(|source| HomographError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows(file)
}

/// Extrai features e rótulos de linhas já lidas, na mesma ordem.
///
/// `path` só é usado para contextualizar erros; a linha reportada é a de [`CorpusRow::line`].
pub fn extract_features_rows<T: Tokenizer>(
    extractor: &FeatureExtractor<T>,
    rows: &[CorpusRow],
    path: &Path,
) -> Result<(Vec<FeatureVector>, Vec<String>)> {
    let mut features = Vec::with_capacity(rows.len());
    let mut labels = Vec::with_capacity(rows.len());
    for row in rows {
        let fv = extractor
            .extract(&row.sentence, row.start, row.end)
            .map_err(|source| HomographError::Row {
                path: path.to_path_buf(),
                line: row.line,
                homograph: row.homograph.clone(),
                source: Box::new(source),
            })?;
        features.push(fv);
        labels.push(row.wordid.clone());
    }
    Ok((features, labels))
}

/// Extrai features e rótulos de um arquivo inteiro.
pub fn extract_features_file<T: Tokenizer>(
    extractor: &FeatureExtractor<T>,
    path: &Path,
) -> Result<(Vec<FeatureVector>, Vec<String>)> {
    let rows = read_file(path)?;
    debug!("{}: {} linhas", path.display(), rows.len());
    extract_features_rows(extractor, &rows, path)
}
