use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::AssessmentError;
use crate::phonetics::arpabet_to_ipa;
use crate::pipeline::traits::{AcousticModel, Phonemizer};
use crate::types::FramePredictions;

const PAD_TOKEN: &str = "<pad>";
const SPECIAL_TOKENS: &[&str] = &["<s>", "</s>", "<unk>", PAD_TOKEN, "|"];

/// Greedy CTC decoding over a `vocab.json` (`{token: id}`) vocabulary.
///
/// Repeated ids collapse, then the blank id and special tokens are dropped.
#[derive(Debug, Clone)]
pub struct CtcVocabDecoder {
    id_to_token: HashMap<usize, String>,
    blank_id: usize,
}

impl CtcVocabDecoder {
    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read vocab.json", e))?;
        let raw: HashMap<String, usize> = serde_json::from_str(&data)
            .map_err(|e| AssessmentError::json("parse vocab.json", e))?;
        Ok(Self::from_vocab(raw))
    }

    /// The blank is the `<pad>` id when present, otherwise 0.
    pub fn from_vocab(vocab: HashMap<String, usize>) -> Self {
        let blank_id = vocab.get(PAD_TOKEN).copied().unwrap_or(0);
        let id_to_token = vocab.into_iter().map(|(token, id)| (id, token)).collect();
        Self {
            id_to_token,
            blank_id,
        }
    }

    pub fn blank_id(&self) -> usize {
        self.blank_id
    }

    pub fn vocab_size(&self) -> usize {
        self.id_to_token.len()
    }

    pub fn decode(&self, ids: &[usize]) -> Vec<String> {
        let mut tokens = Vec::new();
        let mut prev: Option<usize> = None;
        for &id in ids {
            if prev == Some(id) {
                continue;
            }
            prev = Some(id);
            if id == self.blank_id {
                continue;
            }
            match self.id_to_token.get(&id) {
                Some(token) if !SPECIAL_TOKENS.contains(&token.as_str()) => {
                    tokens.push(token.clone())
                }
                Some(_) => {}
                None => tracing::debug!(id, "ctc decode: id missing from vocabulary"),
            }
        }
        tokens
    }
}

/// Serves precomputed frame predictions, e.g. recorded from an offline
/// acoustic model run.
pub struct ReplayAcousticModel {
    predictions: FramePredictions,
    decoder: CtcVocabDecoder,
}

impl ReplayAcousticModel {
    pub fn new(predictions: FramePredictions, decoder: CtcVocabDecoder) -> Self {
        Self {
            predictions,
            decoder,
        }
    }

    pub fn load(path: &Path, decoder: CtcVocabDecoder) -> Result<Self, AssessmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AssessmentError::io("read frame predictions", e))?;
        let predictions: FramePredictions = serde_json::from_str(&data)
            .map_err(|e| AssessmentError::json("parse frame predictions", e))?;
        Ok(Self::new(predictions, decoder))
    }
}

impl AcousticModel for ReplayAcousticModel {
    fn predict(&self, _waveform: &[f32], top_k: usize) -> Result<FramePredictions, AssessmentError> {
        Ok(FramePredictions {
            best_ids: self.predictions.best_ids.clone(),
            top_k_ids: self
                .predictions
                .top_k_ids
                .iter()
                .map(|ids| ids.iter().copied().take(top_k).collect())
                .collect(),
        })
    }

    fn decode(&self, ids: &[usize]) -> Result<Vec<String>, AssessmentError> {
        Ok(self.decoder.decode(ids))
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LexiconEntry {
    Tokens(Vec<String>),
    Spaced(String),
}

impl LexiconEntry {
    fn into_tokens(self) -> Vec<String> {
        match self {
            Self::Tokens(tokens) => tokens,
            Self::Spaced(s) => s.split_whitespace().map(str::to_string).collect(),
        }
    }
}

/// Word to phoneme tokens from a JSON lexicon. Lookup ignores case.
#[derive(Debug, Clone, Default)]
pub struct LexiconPhonemizer {
    entries: HashMap<String, Vec<String>>,
}

impl LexiconPhonemizer {
    pub fn load(path: &Path) -> Result<Self, AssessmentError> {
        let data =
            std::fs::read_to_string(path).map_err(|e| AssessmentError::io("read lexicon", e))?;
        let raw: HashMap<String, LexiconEntry> =
            serde_json::from_str(&data).map_err(|e| AssessmentError::json("parse lexicon", e))?;
        Ok(Self::from_entries(
            raw.into_iter().map(|(word, entry)| (word, entry.into_tokens())),
        ))
    }

    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(word, tokens)| (word.to_lowercase(), tokens))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Phonemizer for LexiconPhonemizer {
    fn word_to_phonemes(&self, word: &str) -> Result<Vec<String>, AssessmentError> {
        Ok(self
            .entries
            .get(&word.trim().to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

/// Adapts an ARPAbet-emitting phonemizer to IPA. Tokens with no IPA
/// counterpart are dropped.
pub struct ArpabetPhonemizer<P> {
    inner: P,
}

impl<P: Phonemizer> ArpabetPhonemizer<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

impl<P: Phonemizer> Phonemizer for ArpabetPhonemizer<P> {
    fn word_to_phonemes(&self, word: &str) -> Result<Vec<String>, AssessmentError> {
        let arpa = self.inner.word_to_phonemes(word)?;
        Ok(arpa
            .iter()
            .filter_map(|token| {
                let ipa = arpabet_to_ipa(token);
                if ipa.is_none() {
                    tracing::debug!(word, token = %token, "arpabet: no IPA mapping");
                }
                ipa.map(str::to_string)
            })
            .collect())
    }
}
