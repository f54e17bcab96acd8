use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pronunciation_rs::alignment::report::aggregate_reports;
use pronunciation_rs::pipeline::defaults::{
    ArpabetPhonemizer, CtcVocabDecoder, LexiconPhonemizer, ReplayAcousticModel,
};
use pronunciation_rs::{
    build_report, AssessmentConfig, AssessorBuilder, FallbackPolicy, FramePredictions,
    PronunciationAssessor,
};
use serde::Deserialize;

#[path = "assessment_report/audio.rs"]
mod audio;
#[path = "assessment_report/json_report_formatter.rs"]
mod json_report_formatter;
#[path = "assessment_report/logging.rs"]
mod logging;

use json_report_formatter::{CaseError, CaseReport, Meta, Report, SCHEMA_VERSION};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FallbackChoice {
    #[value(name = "record-empty")]
    RecordEmpty,
    #[value(name = "secondary")]
    Secondary,
}

impl FallbackChoice {
    fn policy(self) -> FallbackPolicy {
        match self {
            Self::RecordEmpty => FallbackPolicy::RecordEmpty,
            Self::Secondary => FallbackPolicy::SecondaryPhonemizer,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "assessment_report")]
#[command(about = "Score recorded utterances against reference text and write a JSON report")]
struct Args {
    #[arg(
        long,
        env = "PRONUNCIATION_REPORT_CASES_DIR",
        default_value = "test-data/cases"
    )]
    cases_dir: PathBuf,
    #[arg(
        long,
        env = "PRONUNCIATION_REPORT_VOCAB",
        default_value = "test-data/vocab.json"
    )]
    vocab: PathBuf,
    #[arg(
        long,
        env = "PRONUNCIATION_REPORT_LEXICON",
        default_value = "test-data/lexicon.json"
    )]
    lexicon: PathBuf,
    /// ARPAbet lexicon backing the secondary phonemizer.
    #[arg(long, env = "PRONUNCIATION_REPORT_ARPABET_LEXICON")]
    arpabet_lexicon: Option<PathBuf>,
    #[arg(long, env = "PRONUNCIATION_REPORT_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PRONUNCIATION_REPORT_FALLBACK", value_enum)]
    fallback: Option<FallbackChoice>,
    #[arg(long, env = "PRONUNCIATION_REPORT_OUT")]
    out: Option<PathBuf>,
    #[arg(long, env = "PRONUNCIATION_REPORT_LIMIT")]
    limit: Option<usize>,
    #[arg(long, env = "PRONUNCIATION_REPORT_OFFSET", default_value_t = 0)]
    offset: usize,
}

#[derive(Debug, Clone, Deserialize)]
struct Case {
    id: String,
    audio_path: String,
    reference_text: String,
    predictions: FramePredictions,
}

struct Collaborators {
    decoder: CtcVocabDecoder,
    lexicon: LexiconPhonemizer,
    arpabet_lexicon: Option<LexiconPhonemizer>,
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        tracing::error!(error = %err, "assessment report failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let repo_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));

    let cases_dir = resolve_path(&repo_root, &args.cases_dir);
    let vocab_path = resolve_path(&repo_root, &args.vocab);
    let lexicon_path = resolve_path(&repo_root, &args.lexicon);
    let out_path = resolve_out_path(&repo_root, args.out.as_ref());

    let mut config = match args.config.as_ref() {
        Some(path) => AssessmentConfig::load(&resolve_path(&repo_root, path))
            .map_err(|err| format!("Failed to load config: {err}"))?,
        None => AssessmentConfig::default(),
    };
    if let Some(choice) = args.fallback {
        config.fallback_policy = choice.policy();
    }

    require_path_exists(&vocab_path, "Missing model vocabulary (vocab.json).")?;
    require_path_exists(&lexicon_path, "Missing reference lexicon.")?;
    let collaborators = Collaborators {
        decoder: CtcVocabDecoder::load(&vocab_path).map_err(|err| err.to_string())?,
        lexicon: LexiconPhonemizer::load(&lexicon_path).map_err(|err| err.to_string())?,
        arpabet_lexicon: args
            .arpabet_lexicon
            .as_ref()
            .map(|path| LexiconPhonemizer::load(&resolve_path(&repo_root, path)))
            .transpose()
            .map_err(|err| err.to_string())?,
    };
    tracing::info!(
        vocab_size = collaborators.decoder.vocab_size(),
        lexicon_words = collaborators.lexicon.len(),
        fallback_policy = ?config.fallback_policy,
        "collaborators loaded"
    );

    let mut cases = load_cases(&cases_dir)?;
    if args.offset > 0 {
        cases = cases.into_iter().skip(args.offset).collect();
    }
    if let Some(limit) = args.limit {
        cases.truncate(limit);
    }
    if cases.is_empty() {
        return Err("No cases selected after applying offset/limit.".to_string());
    }

    let progress = ProgressBar::new(cases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let started = Instant::now();
    let mut case_reports = Vec::with_capacity(cases.len());
    for case in cases {
        progress.set_message(case.id.clone());
        let audio_file = resolve_path(&cases_dir, Path::new(&case.audio_path));
        require_path_exists(&audio_file, "Missing audio file referenced by case.")?;
        case_reports.push(score_case(&config, &collaborators, case, &audio_file)?);
        progress.inc(1);
    }
    progress.finish_with_message("done");

    let assessments: Vec<_> = case_reports
        .iter()
        .filter_map(|c| c.assessment.clone())
        .collect();
    let report = Report {
        schema_version: SCHEMA_VERSION,
        meta: Meta {
            generated_at: Utc::now().to_rfc3339(),
            vocab_path: vocab_path.to_string_lossy().into_owned(),
            lexicon_path: lexicon_path.to_string_lossy().into_owned(),
            sample_rate_hz: config.sample_rate_hz,
            fallback_policy: format!("{:?}", config.fallback_policy),
            case_count: case_reports.len(),
        },
        aggregates: aggregate_reports(&assessments),
        cases: case_reports,
    };
    json_report_formatter::write_report(&out_path, &report)?;

    tracing::info!(
        cases = report.meta.case_count,
        scored = report.aggregates.case_count,
        elapsed = format_duration_hms(started.elapsed()),
        "report written"
    );
    println!("{}", out_path.display());
    Ok(())
}

fn score_case(
    config: &AssessmentConfig,
    collaborators: &Collaborators,
    case: Case,
    audio_file: &Path,
) -> Result<CaseReport, String> {
    let (source_hz, samples) = audio::read_audio_mono(audio_file)?;
    let samples = audio::resample_linear(&samples, source_hz, config.sample_rate_hz);
    let duration_ms = audio::duration_ms(samples.len(), config.sample_rate_hz);
    let words = audio::reference_words(&case.reference_text);

    let mut report = CaseReport {
        id: case.id.clone(),
        audio_path: case.audio_path.clone(),
        duration_ms,
        error: None,
        assessment: None,
        predicted: None,
    };

    if let Err(rejection) = audio::check_boundaries(&samples, config.sample_rate_hz, &words) {
        tracing::warn!(case = %case.id, code = rejection.code(), "case rejected");
        report.error = Some(CaseError {
            code: rejection.code().to_string(),
            detail: rejection.detail(),
        });
        return Ok(report);
    }

    let assessor = build_assessor(config, collaborators, case.predictions)?;
    match assessor.assess(&samples, &words) {
        Ok(result) => {
            report.predicted = Some(
                result
                    .predicted
                    .iter()
                    .map(|p| p.as_str())
                    .collect::<Vec<_>>()
                    .join(" "),
            );
            report.assessment = Some(build_report(&result, &config.overall_weights));
        }
        Err(err) => {
            tracing::warn!(case = %case.id, error = %err, "assessment failed");
            report.error = Some(CaseError {
                code: "internal_error".to_string(),
                detail: err.to_string(),
            });
        }
    }
    Ok(report)
}

fn build_assessor(
    config: &AssessmentConfig,
    collaborators: &Collaborators,
    predictions: FramePredictions,
) -> Result<PronunciationAssessor, String> {
    let mut builder = AssessorBuilder::new(config.clone())
        .with_acoustic_model(Box::new(ReplayAcousticModel::new(
            predictions,
            collaborators.decoder.clone(),
        )))
        .with_phonemizer(Box::new(collaborators.lexicon.clone()));
    if let Some(arpabet) = collaborators.arpabet_lexicon.as_ref() {
        builder =
            builder.with_secondary_phonemizer(Box::new(ArpabetPhonemizer::new(arpabet.clone())));
    }
    builder
        .build()
        .map_err(|err| format!("Failed to build PronunciationAssessor: {err}"))
}

fn load_cases(cases_dir: &Path) -> Result<Vec<Case>, String> {
    require_path_exists(cases_dir, "Missing cases directory.")?;
    let mut paths = Vec::new();
    for entry in fs::read_dir(cases_dir)
        .map_err(|err| format!("Failed to read '{}': {err}", cases_dir.display()))?
    {
        let path = entry
            .map_err(|err| format!("Failed to read '{}': {err}", cases_dir.display()))?
            .path();
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let data = fs::read_to_string(path)
                .map_err(|err| format!("Failed to read case '{}': {err}", path.display()))?;
            serde_json::from_str(&data)
                .map_err(|err| format!("Failed to parse case '{}': {err}", path.display()))
        })
        .collect()
}

fn resolve_out_path(repo_root: &Path, out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return resolve_path(repo_root, path);
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    repo_root
        .join("target")
        .join("assessment_reports")
        .join(format!("assessment-report-{run_id}.json"))
}

fn resolve_path(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

fn format_duration_hms(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let rem_after_hours = total_ms % 3_600_000;
    let minutes = rem_after_hours / 60_000;
    let rem_after_minutes = rem_after_hours % 60_000;
    let seconds = rem_after_minutes / 1_000;
    let millis = rem_after_minutes % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}
