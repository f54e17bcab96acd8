use crate::phonetics::{NormalizedPhoneme, ScoringTables};

pub const INDEL_COST: f64 = 1.0;

/// Weighted Levenshtein distance between two normalized sequences.
///
/// Insertions and deletions cost [`INDEL_COST`]; substitutions cost
/// 0.0 / 0.5 / 1.0 through [`ScoringTables::substitution_cost`]. Only two
/// rows are kept, sized by the shorter sequence. The cost model is symmetric,
/// so swapping the operands yields the same table transposed.
pub fn edit_distance(
    tables: &ScoringTables,
    a: &[NormalizedPhoneme],
    b: &[NormalizedPhoneme],
) -> f64 {
    let (outer, inner) = if a.len() >= b.len() { (a, b) } else { (b, a) };

    let mut prev = Vec::with_capacity(inner.len() + 1);
    prev.push(0.0);
    for j in 0..inner.len() {
        prev.push(prev[j] + INDEL_COST);
    }
    let mut curr = vec![0.0; inner.len() + 1];

    for x in outer {
        curr[0] = prev[0] + INDEL_COST;
        for (j, y) in inner.iter().enumerate() {
            let delete = prev[j + 1] + INDEL_COST;
            let insert = curr[j] + INDEL_COST;
            let substitute = prev[j] + tables.substitution_cost(x, y);
            curr[j + 1] = delete.min(insert).min(substitute);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[inner.len()]
}

/// Normalizes raw tokens first; tokens that carry no phoneme are skipped.
pub fn edit_distance_tokens<S: AsRef<str>>(tables: &ScoringTables, a: &[S], b: &[S]) -> f64 {
    let a = tables.normalize_sequence(a);
    let b = tables.normalize_sequence(b);
    edit_distance(tables, &a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(tables: &ScoringTables, tokens: &[&str]) -> Vec<NormalizedPhoneme> {
        tables.normalize_sequence(tokens)
    }

    fn full_matrix(tables: &ScoringTables, a: &[NormalizedPhoneme], b: &[NormalizedPhoneme]) -> f64 {
        let (m, n) = (a.len(), b.len());
        let mut dp = vec![vec![0.0f64; n + 1]; m + 1];
        for i in 1..=m {
            dp[i][0] = dp[i - 1][0] + INDEL_COST;
        }
        for j in 1..=n {
            dp[0][j] = dp[0][j - 1] + INDEL_COST;
        }
        for i in 1..=m {
            for j in 1..=n {
                dp[i][j] = (dp[i - 1][j] + INDEL_COST)
                    .min(dp[i][j - 1] + INDEL_COST)
                    .min(dp[i - 1][j - 1] + tables.substitution_cost(&a[i - 1], &b[j - 1]));
            }
        }
        dp[m][n]
    }

    #[test]
    fn identical_sequences_cost_nothing() {
        let tables = ScoringTables::builtin().unwrap();
        let a = seq(&tables, &["k", "æ", "t"]);
        assert_eq!(edit_distance(&tables, &a, &a), 0.0);
    }

    #[test]
    fn empty_sequences_cost_pure_indels() {
        let tables = ScoringTables::builtin().unwrap();
        let a = seq(&tables, &["k", "æ", "t", "s"]);
        assert_eq!(edit_distance(&tables, &a, &[]), 4.0);
        assert_eq!(edit_distance(&tables, &[], &a), 4.0);
        assert_eq!(edit_distance(&tables, &[], &[]), 0.0);
    }

    #[test]
    fn confusable_substitution_costs_half() {
        let tables = ScoringTables::builtin().unwrap();
        let a = seq(&tables, &["k", "æ", "t"]);
        let b = seq(&tables, &["k", "æ", "ɾ"]);
        assert_eq!(edit_distance(&tables, &a, &b), 0.5);
    }

    #[test]
    fn unrelated_substitution_costs_one() {
        let tables = ScoringTables::builtin().unwrap();
        let a = seq(&tables, &["k", "æ", "t"]);
        let b = seq(&tables, &["k", "æ", "p"]);
        assert_eq!(edit_distance(&tables, &a, &b), 1.0);
    }

    #[test]
    fn two_row_matches_full_matrix() {
        let tables = ScoringTables::builtin().unwrap();
        let cases: [(&[&str], &[&str]); 4] = [
            (&["s", "ɪ", "t", "ɪ"], &["ʃ", "ə", "ɾ", "i", "z"]),
            (&["b", "ɜ", "d"], &["w", "ɝ", "d", "z", "n"]),
            (&["m", "æ", "n"], &["n"]),
            (&["l", "ʌ", "v"], &["ɹ", "ə", "b", "v", "v", "l"]),
        ];
        for (a, b) in cases {
            let a = seq(&tables, a);
            let b = seq(&tables, b);
            assert_eq!(edit_distance(&tables, &a, &b), full_matrix(&tables, &a, &b));
            assert_eq!(edit_distance(&tables, &b, &a), full_matrix(&tables, &a, &b));
        }
    }

    #[test]
    fn raw_tokens_are_normalized_first() {
        let tables = ScoringTables::builtin().unwrap();
        assert_eq!(edit_distance_tokens(&tables, &["kʰ", "æ1"], &["k", "æ"]), 0.0);
    }
}
