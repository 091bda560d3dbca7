//! # Tokenizador de Palavras (Inglês)
//!
//! O extrator de features não conhece as regras de tokenização: ele recebe
//! uma implementação de [`Tokenizer`] (texto → sequência ordenada de tokens).
//! Este módulo fornece a implementação padrão usada pelo binário de avaliação.
//!
//! ## Modos
//!
//! - **Treebank**: convenções do Penn Treebank. Pontuação separada, ponto final
//!   destacado (exceto abreviações), clíticos separados ("can't" -> "ca", "n't";
//!   "it's" -> "it", "'s"), aspas duplas reescritas como ``` `` ``` e `''`.
//! - **Whitespace**: apenas espaços em branco separam tokens.
//!
//! Qualquer outro caractere não-espaço (inclusive `^` e `_`) faz parte da palavra,
//! o que mantém os marcadores do homógrafo colados ao token alvo.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use homograph_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let tokens = tokenize_with_mode("I can't record it.", TokenizerMode::Treebank);
//! assert_eq!(tokens, ["I", "ca", "n't", "record", "it", "."]);
//! ```

use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Capacidade de tokenização injetada no extrator de features.
pub trait Tokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Permite usar closures como tokenizadores (útil para testes com tokenizadores falsos).
impl<F> Tokenizer for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn tokenize(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Padrão**: pontuação e clíticos separados à maneira do Penn Treebank.
    #[default]
    Treebank,
    /// **Espaços**: útil para corpora já pré-tokenizados.
    Whitespace,
}

impl FromStr for TokenizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "treebank" => Ok(TokenizerMode::Treebank),
            "whitespace" => Ok(TokenizerMode::Whitespace),
            other => Err(format!("unknown tokenizer mode {other:?} (expected treebank or whitespace)")),
        }
    }
}

/// Tokenizador padrão, configurado por [`TokenizerMode`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WordTokenizer {
    mode: TokenizerMode,
}

impl WordTokenizer {
    pub fn new(mode: TokenizerMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TokenizerMode {
        self.mode
    }
}

impl Tokenizer for WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize_with_mode(text, self.mode)
    }
}

/// Abreviações cujo ponto não é tratado como fim de sentença
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mt", "Gen", "Col", "Lt",
    "Sgt", "Capt", "Gov", "Sen", "Rep", "Rev", "Inc", "Ltd", "Co", "Corp", "Bros",
    "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug", "Sep", "Sept", "Oct", "Nov",
    "Dec", "vs", "etc", "approx", "cf", "pp", "Vol", "vol", "Fig", "fig",
];

/// Pontuação que sempre vira um token próprio
const SPLIT_PUNCTUATION: &[char] = &[
    ';', '!', '?', '(', ')', '[', ']', '{', '}', '<', '>', '“', '”', '«', '»', '…',
    '$', '%', '&', '@', '#',
];

fn clitic_regex() -> &'static Regex {
    static CLITIC: OnceLock<Regex> = OnceLock::new();
    CLITIC.get_or_init(|| {
        Regex::new(r"(?i)^(.+?)(n['’]t|['’](?:s|re|ve|ll|d|m))$").expect("clitic pattern is valid")
    })
}

/// Tokeniza um texto com o modo padrão (Treebank).
pub fn tokenize(text: &str) -> Vec<String> {
    tokenize_with_mode(text, TokenizerMode::Treebank)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<String> {
    match mode {
        TokenizerMode::Treebank => tokenize_treebank(text),
        TokenizerMode::Whitespace => text.split_whitespace().map(str::to_string).collect(),
    }
}

fn tokenize_treebank(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        let next = chars.get(i + 1).copied();

        if ch.is_whitespace() {
            flush_word(&mut tokens, &mut current);
        } else if ch == '.' && next == Some('.') {
            // Reticências: uma sequência de pontos vira um único token
            flush_word(&mut tokens, &mut current);
            let mut j = i;
            while j < chars.len() && chars[j] == '.' {
                j += 1;
            }
            tokens.push(".".repeat(j - i));
            i = j;
            continue;
        } else if ch == '.' && !current.is_empty() {
            let next_is_alnum = next.map(char::is_alphanumeric).unwrap_or(false);
            // "3.14", "U.S", "e.g" continuam; "Dr." e "U.S." preservam o ponto
            let keeps_period = next_is_alnum
                || ABBREVIATIONS.contains(&current.as_str())
                || current.contains('.');
            if keeps_period {
                current.push(ch);
            } else {
                flush_word(&mut tokens, &mut current);
                tokens.push(".".to_string());
            }
        } else if ch == ',' || ch == ':' || ch == '.' {
            let prev_is_digit = current.chars().last().map(|c| c.is_ascii_digit()).unwrap_or(false);
            let next_is_digit = next.map(|c| c.is_ascii_digit()).unwrap_or(false);
            if prev_is_digit && next_is_digit {
                // Separadores numéricos: "1,000", "10:30"
                current.push(ch);
            } else {
                flush_word(&mut tokens, &mut current);
                tokens.push(ch.to_string());
            }
        } else if ch == '"' {
            let opening = i == 0 || {
                let prev = chars[i - 1];
                prev.is_whitespace() || "([{<".contains(prev)
            };
            flush_word(&mut tokens, &mut current);
            tokens.push(if opening { "``" } else { "''" }.to_string());
        } else if SPLIT_PUNCTUATION.contains(&ch) {
            flush_word(&mut tokens, &mut current);
            tokens.push(ch.to_string());
        } else {
            current.push(ch);
        }
        i += 1;
    }

    flush_word(&mut tokens, &mut current);

    tokens
}

/// Fecha a palavra acumulada, separando um clítico final se houver
fn flush_word(tokens: &mut Vec<String>, word: &mut String) {
    if word.is_empty() {
        return;
    }
    if let Some(caps) = clitic_regex().captures(word) {
        tokens.push(caps[1].to_string());
        tokens.push(caps[2].to_string());
    } else {
        tokens.push(word.clone());
    }
    word.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_treebank_basic() {
        assert_eq!(
            tokenize("I need to record the record."),
            ["I", "need", "to", "record", "the", "record", "."]
        );
    }

    #[test]
    fn test_tokenize_clitics() {
        assert_eq!(
            tokenize_with_mode("Don't say it's John's.", TokenizerMode::Treebank),
            ["Do", "n't", "say", "it", "'s", "John", "'s", "."]
        );
        assert_eq!(tokenize_with_mode("We'll see", TokenizerMode::Treebank), ["We", "'ll", "see"]);
    }

    #[test]
    fn test_tokenize_keeps_markers_attached() {
        assert_eq!(
            tokenize_with_mode("Play the ^bass^, now.", TokenizerMode::Treebank),
            ["Play", "the", "^bass^", ",", "now", "."]
        );
        assert_eq!(tokenize_with_mode("^lead^'s", TokenizerMode::Treebank), ["^lead^", "'s"]);
    }

    #[test]
    fn test_tokenize_numbers_and_abbreviations() {
        assert_eq!(
            tokenize_with_mode("Dr. Smith paid $1,000.50 at 10:30.", TokenizerMode::Treebank),
            ["Dr.", "Smith", "paid", "$", "1,000.50", "at", "10:30", "."]
        );
        assert_eq!(tokenize_with_mode("the U.S. team", TokenizerMode::Treebank), ["the", "U.S.", "team"]);
    }

    #[test]
    fn test_tokenize_quotes_and_ellipsis() {
        assert_eq!(
            tokenize_with_mode("He said \"wait...\"", TokenizerMode::Treebank),
            ["He", "said", "``", "wait", "...", "''"]
        );
    }

    #[test]
    fn test_tokenize_whitespace() {
        assert_eq!(
            tokenize_with_mode("  café\t^record^.  ", TokenizerMode::Whitespace),
            ["café", "^record^."]
        );
    }

    #[test]
    fn test_tokenizer_mode_from_str() {
        assert_eq!("Whitespace".parse::<TokenizerMode>(), Ok(TokenizerMode::Whitespace));
        assert!("nltk".parse::<TokenizerMode>().is_err());
    }

    #[test]
    fn test_closure_as_tokenizer() {
        let fake = |text: &str| text.split('|').map(str::to_string).collect::<Vec<_>>();
        assert_eq!(fake.tokenize("a|b"), ["a", "b"]);
    }
}
