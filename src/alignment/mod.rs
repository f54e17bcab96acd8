//! Sequence scoring: weighted edit distance, windowed PER, candidate
//! selection, word coverage and positional match flags.

pub mod candidates;
pub mod coverage;
pub mod edit_distance;
pub mod match_flags;
pub mod per;
pub mod report;

pub use candidates::{select_candidates, Candidate, CandidateOrigin};
pub use coverage::{coverage_threshold, word_covered, word_covered_tokens};
pub use edit_distance::{edit_distance, edit_distance_tokens, INDEL_COST};
pub use match_flags::{match_flags, split_flags_by_lengths};
pub use per::{accuracy_from_per, sequence_per};
