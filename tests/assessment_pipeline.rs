use std::collections::HashMap;

use pronunciation_rs::config::CandidateConfig;
use pronunciation_rs::pipeline::defaults::{
    ArpabetPhonemizer, CtcVocabDecoder, LexiconPhonemizer, ReplayAcousticModel,
};
use pronunciation_rs::{
    build_report, AcousticModel, AssessmentConfig, AssessmentError, AssessorBuilder,
    FallbackPolicy, FramePredictions, Phonemizer, PronunciationAssessor,
};

const SAMPLE_RATE_HZ: usize = 16_000;

fn decoder() -> CtcVocabDecoder {
    let vocab: HashMap<String, usize> = [
        ("<pad>", 0),
        ("|", 1),
        ("k", 2),
        ("æ", 3),
        ("t", 4),
        ("p", 5),
        ("b", 6),
        ("ɝ", 7),
        ("d", 8),
        ("ə", 9),
    ]
    .into_iter()
    .map(|(token, id)| (token.to_string(), id))
    .collect();
    CtcVocabDecoder::from_vocab(vocab)
}

fn lexicon(entries: &[(&str, &[&str])]) -> LexiconPhonemizer {
    LexiconPhonemizer::from_entries(entries.iter().map(|(word, tokens)| {
        (
            word.to_string(),
            tokens.iter().map(|t| t.to_string()).collect(),
        )
    }))
}

fn greedy(ids: &[usize]) -> FramePredictions {
    FramePredictions {
        best_ids: ids.to_vec(),
        top_k_ids: ids.iter().map(|&id| vec![id]).collect(),
    }
}

fn words(items: &[&str]) -> Vec<String> {
    items.iter().map(|w| w.to_string()).collect()
}

/// One second of tone with 200 ms of silence in the middle.
fn tone_with_gap() -> Vec<f32> {
    (0..SAMPLE_RATE_HZ)
        .map(|i| {
            if (6_400..9_600).contains(&i) {
                0.0
            } else {
                0.3 * (i as f32 * 0.05).sin()
            }
        })
        .collect()
}

fn assessor(
    config: AssessmentConfig,
    predictions: FramePredictions,
    primary: LexiconPhonemizer,
    secondary: Option<LexiconPhonemizer>,
) -> PronunciationAssessor {
    let mut builder = AssessorBuilder::new(config)
        .with_acoustic_model(Box::new(ReplayAcousticModel::new(predictions, decoder())))
        .with_phonemizer(Box::new(primary));
    if let Some(arpabet) = secondary {
        builder = builder.with_secondary_phonemizer(Box::new(ArpabetPhonemizer::new(arpabet)));
    }
    builder.build().expect("assessor builds")
}

struct FailingPhonemizer;

impl Phonemizer for FailingPhonemizer {
    fn word_to_phonemes(&self, _word: &str) -> Result<Vec<String>, AssessmentError> {
        Err(AssessmentError::collaborator("phonemizer", "backend unavailable"))
    }
}

struct FailingModel {
    fail_predict: bool,
}

impl AcousticModel for FailingModel {
    fn predict(&self, _waveform: &[f32], _top_k: usize) -> Result<FramePredictions, AssessmentError> {
        if self.fail_predict {
            return Err(AssessmentError::collaborator("acoustic model", "out of memory"));
        }
        Ok(greedy(&[2, 3, 4]))
    }

    fn decode(&self, _ids: &[usize]) -> Result<Vec<String>, AssessmentError> {
        Err(AssessmentError::collaborator("acoustic model", "vocabulary missing"))
    }
}

#[test]
fn secondary_phonemizer_fills_lexicon_gaps() {
    let config = AssessmentConfig {
        fallback_policy: FallbackPolicy::SecondaryPhonemizer,
        ..AssessmentConfig::default()
    };
    let assessor = assessor(
        config,
        greedy(&[2, 3, 4, 6, 7, 8]),
        lexicon(&[("cat", &["k", "æ", "t"])]),
        Some(lexicon(&[("bird", &["B", "ER1", "D"])])),
    );

    let result = assessor
        .assess(&tone_with_gap(), &words(&["cat", "bird"]))
        .expect("assessment succeeds");

    assert_eq!(result.words[1].reference_tokens, vec!["b", "ɝ", "d"]);
    assert!(result.words.iter().all(|w| w.covered));
    assert_eq!(result.per, 0.0);
    assert_eq!(result.completeness, 100.0);
    assert_eq!(result.words[1].phoneme_flags, vec![true, true, true]);
    assert_eq!(result.fluency.rhythm_ratio, Some(1.0));
    assert!((result.fluency.fluency_score - 100.0).abs() < 1e-9);
}

#[test]
fn record_empty_leaves_unknown_words_uncovered() {
    let assessor = assessor(
        AssessmentConfig::default(),
        greedy(&[2, 3, 4, 6, 7, 8]),
        lexicon(&[("cat", &["k", "æ", "t"])]),
        Some(lexicon(&[("bird", &["B", "ER1", "D"])])),
    );

    let result = assessor
        .assess(&tone_with_gap(), &words(&["cat", "bird"]))
        .expect("assessment succeeds");

    assert!(result.words[1].reference_tokens.is_empty());
    assert!(result.words[1].phonemes.is_empty());
    assert!(result.words[1].phoneme_flags.is_empty());
    assert!(!result.words[1].covered);
    assert!(result.words[0].covered);
    assert_eq!(result.completeness, 50.0);
    // trailing "b ɝ d" is noise against a three-phoneme reference
    assert_eq!(result.per, 0.0);
    let missed: Vec<&str> = result.missed_words().map(|w| w.word.as_str()).collect();
    assert_eq!(missed, vec!["bird"]);
}

#[test]
fn empty_secondary_output_records_zero_phonemes() {
    let config = AssessmentConfig {
        fallback_policy: FallbackPolicy::SecondaryPhonemizer,
        ..AssessmentConfig::default()
    };
    let assessor = assessor(
        config,
        greedy(&[2, 3, 4]),
        lexicon(&[("cat", &["k", "æ", "t"])]),
        Some(LexiconPhonemizer::default()),
    );

    let result = assessor
        .assess(&tone_with_gap(), &words(&["cat", "xyzzy"]))
        .expect("assessment succeeds");
    assert!(result.words[1].phonemes.is_empty());
    assert_eq!(result.covered_word_count(), 1);
}

#[test]
fn phonemizer_error_aborts_assessment() {
    let assessor = AssessorBuilder::new(AssessmentConfig::default())
        .with_acoustic_model(Box::new(ReplayAcousticModel::new(greedy(&[2]), decoder())))
        .with_phonemizer(Box::new(FailingPhonemizer))
        .build()
        .expect("assessor builds");

    let err = assessor
        .assess(&tone_with_gap(), &words(&["cat"]))
        .expect_err("phonemizer failure propagates");
    assert!(matches!(
        err,
        AssessmentError::Collaborator {
            component: "phonemizer",
            ..
        }
    ));
}

#[test]
fn acoustic_model_errors_abort_assessment() {
    for fail_predict in [true, false] {
        let assessor = AssessorBuilder::new(AssessmentConfig::default())
            .with_acoustic_model(Box::new(FailingModel { fail_predict }))
            .with_phonemizer(Box::new(lexicon(&[("cat", &["k", "æ", "t"])])))
            .build()
            .expect("assessor builds");

        let err = assessor
            .assess(&tone_with_gap(), &words(&["cat"]))
            .expect_err("model failure propagates");
        assert!(err.to_string().starts_with("acoustic model failed"));
    }
}

#[test]
fn top_k_of_one_disables_second_best_variants() {
    let predictions = FramePredictions {
        best_ids: vec![5, 3, 4],
        top_k_ids: vec![vec![5, 2], vec![3, 9], vec![4, 8]],
    };
    let config = AssessmentConfig {
        candidates: CandidateConfig {
            top_k: 1,
            ..CandidateConfig::default()
        },
        ..AssessmentConfig::default()
    };
    let narrow = assessor(
        config,
        predictions.clone(),
        lexicon(&[("cat", &["k", "æ", "t"])]),
        None,
    );
    let result = narrow
        .assess(&tone_with_gap(), &words(&["cat"]))
        .expect("assessment succeeds");
    assert_eq!(result.candidates.len(), 1);
    assert_eq!(result.predicted[0].as_str(), "p");

    let wide = assessor(
        AssessmentConfig::default(),
        predictions,
        lexicon(&[("cat", &["k", "æ", "t"])]),
        None,
    );
    let result = wide
        .assess(&tone_with_gap(), &words(&["cat"]))
        .expect("assessment succeeds");
    assert_eq!(result.candidates.len(), 4);
    assert_eq!(result.predicted[0].as_str(), "k");
    assert_eq!(result.per, 0.0);
}

#[test]
fn empty_reference_against_speech_scores_zero_accuracy() {
    let assessor = assessor(
        AssessmentConfig::default(),
        greedy(&[2, 3, 4]),
        LexiconPhonemizer::default(),
        None,
    );
    let result = assessor
        .assess(&tone_with_gap(), &[])
        .expect("assessment succeeds");
    assert!(result.words.is_empty());
    assert_eq!(result.per, 1.0);
    assert_eq!(result.accuracy, 0.0);
    assert_eq!(result.completeness, 0.0);
    assert_eq!(result.fluency.speech_rate, 0.0);
}

#[test]
fn report_lists_uncovered_words_as_mistakes() {
    let assessor = assessor(
        AssessmentConfig::default(),
        greedy(&[2, 3, 8]),
        lexicon(&[("cat", &["k", "æ", "t"]), ("bird", &["b", "ɝ", "d"])]),
        None,
    );
    let config = assessor.config().clone();
    let result = assessor
        .assess(&tone_with_gap(), &words(&["cat", "bird"]))
        .expect("assessment succeeds");
    let report = build_report(&result, &config.overall_weights);

    assert_eq!(report.words.len(), 2);
    assert!(report.words.iter().all(|w| w.score == report.accuracy));
    assert_eq!(report.words[0].end, 1_000);
    assert_eq!(report.phonemes.len(), 6);
    assert_eq!(report.phonemes[3].word_index, Some(1));
    assert!(report.phonemes[0].is_correct);
    assert_eq!(report.phonemes[0].score, 100.0);

    let mistakes: Vec<&str> = report.mistakes.iter().map(|m| m.word.as_str()).collect();
    assert_eq!(mistakes, vec!["bird"]);
    assert_eq!(report.mistakes[0].phonemes.len(), 3);
    assert!(report.mistakes[0].phonemes.iter().all(|p| p.word_index.is_none()));
}

#[test]
fn assessor_is_shared_across_threads() {
    let assessor = assessor(
        AssessmentConfig::default(),
        greedy(&[2, 3, 4]),
        lexicon(&[("cat", &["k", "æ", "t"])]),
        None,
    );
    let waveform = tone_with_gap();
    let reference = words(&["cat"]);

    let scores: Vec<(f64, f64)> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let result = assessor
                        .assess(&waveform, &reference)
                        .expect("assessment succeeds");
                    (result.accuracy, result.fluency.fluency_score)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().expect("worker thread"))
            .collect()
    });

    assert!(scores.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(scores[0].0, 100.0);
}
