//! Composite scoring and ranking
//!
//! ```text
//! Score(c) = Σ value(c, m) · w(m)     over every metric m
//! ```
//!
//! Unparseable cells count as zero, unnamed rows are dropped and the
//! ranking is a stable descending sort, so equal scores keep input order.

use crate::metric::Metric;
use crate::record::CountryRecord;
use crate::scale::{value_range, ValueRange};
use crate::weights::WeightVector;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// A country and its composite score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedNation {
    pub name: String,
    pub score: f64,
}

/// Countries ordered by descending score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ranking {
    entries: Vec<RankedNation>,
}

impl Ranking {
    pub fn entries(&self) -> &[RankedNation] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedNation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bounds for the color scale, `(0, 10)` when empty
    pub fn value_range(&self) -> ValueRange {
        value_range(&self.entries)
    }

    /// Best `n` entries, highest first
    pub fn top(&self, n: usize) -> &[RankedNation] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Worst `n` entries, lowest first
    pub fn bottom(&self, n: usize) -> Vec<RankedNation> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..].iter().rev().cloned().collect()
    }

    pub fn into_entries(self) -> Vec<RankedNation> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Ranking {
    type Item = &'a RankedNation;
    type IntoIter = std::slice::Iter<'a, RankedNation>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Score a single record, name or not
pub fn score_record(record: &CountryRecord, weights: &WeightVector) -> f64 {
    // Start from +0.0 so an all-zero sum never ends up as -0.0.
    let sum = weights
        .iter()
        .fold(0.0_f64, |acc, (metric, w)| acc + record.metric_value(metric) * w);

    // Cells are finite and weights are at most 1, so only overflow of the sum
    // itself can leave the finite range.
    sum.clamp(f64::MIN, f64::MAX)
}

/// Rank every named record under `weights`.
///
/// Always recomputes from scratch. Duplicated names produce duplicated
/// entries.
pub fn compute_ranking(rows: &[CountryRecord], weights: &WeightVector) -> Ranking {
    let mut entries: Vec<RankedNation> = rows
        .iter()
        .filter_map(|row| {
            let name = row.nation_name()?;
            let score = score_record(row, weights);
            debug!("Scored {}: {:.3}", name, score);
            Some(RankedNation {
                name: name.to_string(),
                score,
            })
        })
        .collect();

    // `sort_by` is stable; equal scores (including 0.0 vs -0.0) keep input order.
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    debug!(
        "Ranked {} of {} rows ({} without a name)",
        entries.len(),
        rows.len(),
        rows.len() - entries.len()
    );

    Ranking { entries }
}

/// One metric's share of a record's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    pub metric: Metric,
    pub value: f64,
    pub weight: f64,
    pub contribution: f64,
}

/// Per-metric breakdown of a record's score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub name: Option<String>,
    pub score: f64,
    pub contributions: Vec<Contribution>,
}

/// Explain a record's score metric by metric
pub fn score_breakdown(record: &CountryRecord, weights: &WeightVector) -> ScoreBreakdown {
    let contributions = weights
        .iter()
        .map(|(metric, weight)| {
            let value = record.metric_value(metric);
            Contribution {
                metric,
                value,
                weight,
                contribution: value * weight,
            }
        })
        .collect();

    ScoreBreakdown {
        name: record.nation_name().map(str::to_string),
        score: score_record(record, weights),
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NATION_NAME_COLUMN;
    use proptest::prelude::*;

    fn make_row(name: &str, cells: &[(Metric, &str)]) -> CountryRecord {
        let mut row = CountryRecord::from_pairs([(NATION_NAME_COLUMN, name)]);
        for metric in Metric::ALL {
            row.set(metric.column(), "0");
        }
        for (metric, value) in cells {
            row.set(metric.column(), *value);
        }
        row
    }

    fn names(ranking: &Ranking) -> Vec<&str> {
        ranking.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_gdp_only_scenario() {
        let rows = vec![
            make_row("A", &[(Metric::GdpPerCapita, "10")]),
            make_row("B", &[(Metric::GdpPerCapita, "5")]),
        ];
        let weights = WeightVector::only(Metric::GdpPerCapita, 1.0);

        let ranking = compute_ranking(&rows, &weights);
        assert_eq!(
            ranking.entries(),
            &[
                RankedNation { name: "A".into(), score: 10.0 },
                RankedNation { name: "B".into(), score: 5.0 },
            ]
        );
    }

    #[test]
    fn test_descending_order() {
        let rows = vec![
            make_row("Low", &[(Metric::Hdi, "0.4")]),
            make_row("High", &[(Metric::Hdi, "0.95")]),
            make_row("Mid", &[(Metric::Hdi, "0.7")]),
        ];
        let ranking = compute_ranking(&rows, &WeightVector::only(Metric::Hdi, 1.0));
        assert_eq!(names(&ranking), ["High", "Mid", "Low"]);
    }

    #[test]
    fn test_empty_name_row_excluded() {
        let rows = vec![
            make_row("A", &[(Metric::Cpi, "1")]),
            make_row("", &[(Metric::Cpi, "1000")]),
            make_row("B", &[(Metric::Cpi, "2")]),
        ];
        let ranking = compute_ranking(&rows, &WeightVector::default());
        assert_eq!(ranking.len(), 2);
        assert_eq!(names(&ranking), ["B", "A"]);
    }

    #[test]
    fn test_non_numeric_cell_scores_zero() {
        let rows = vec![make_row("X", &[(Metric::GdpPerCapita, "not_a_number")])];
        let ranking = compute_ranking(&rows, &WeightVector::only(Metric::GdpPerCapita, 1.0));
        assert_eq!(ranking.entries()[0].score, 0.0);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let rows = vec![
            make_row("First", &[(Metric::Hdi, "0.5")]),
            make_row("Top", &[(Metric::Hdi, "0.9")]),
            make_row("Second", &[(Metric::Hdi, "0.5")]),
            make_row("Third", &[(Metric::Hdi, "0.5")]),
        ];
        let ranking = compute_ranking(&rows, &WeightVector::only(Metric::Hdi, 1.0));
        assert_eq!(names(&ranking), ["Top", "First", "Second", "Third"]);
    }

    #[test]
    fn test_negative_values_with_zero_weight_tie_with_positive() {
        let rows = vec![
            make_row("Pos", &[(Metric::UnemploymentRate, "5")]),
            make_row("Neg", &[(Metric::UnemploymentRate, "-5")]),
            make_row("Pos2", &[(Metric::UnemploymentRate, "7")]),
        ];
        let ranking = compute_ranking(&rows, &WeightVector::uniform(0.0));
        assert_eq!(names(&ranking), ["Pos", "Neg", "Pos2"]);
        assert!(ranking.iter().all(|e| e.score == 0.0 && e.score.is_sign_positive()));
    }

    #[test]
    fn test_duplicate_names_kept() {
        let rows = vec![make_row("Twin", &[]), make_row("Twin", &[])];
        assert_eq!(compute_ranking(&rows, &WeightVector::default()).len(), 2);
    }

    #[test]
    fn test_overflowing_sum_stays_finite() {
        let big = f64::MAX.to_string();
        let rows = vec![make_row(
            "Huge",
            &[(Metric::GdpPerCapita, big.as_str()), (Metric::Cpi, big.as_str())],
        )];
        let ranking = compute_ranking(&rows, &WeightVector::uniform(1.0));
        assert!(ranking.entries()[0].score.is_finite());
    }

    #[test]
    fn test_empty_input() {
        let ranking = compute_ranking(&[], &WeightVector::default());
        assert!(ranking.is_empty());
        assert_eq!(ranking.value_range(), ValueRange::EMPTY_DEFAULT);
    }

    #[test]
    fn test_top_and_bottom() {
        let rows: Vec<_> = ["a", "b", "c", "d", "e"]
            .iter()
            .enumerate()
            .map(|(i, name)| make_row(name, &[(Metric::Hdi, (10 - i).to_string().as_str())]))
            .collect();
        let ranking = compute_ranking(&rows, &WeightVector::only(Metric::Hdi, 1.0));

        let top: Vec<_> = ranking.top(2).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(top, ["a", "b"]);

        let bottom: Vec<_> = ranking.bottom(2).into_iter().map(|e| e.name).collect();
        assert_eq!(bottom, ["e", "d"]);

        assert_eq!(ranking.top(50).len(), 5);
        assert_eq!(ranking.bottom(50).len(), 5);
    }

    #[test]
    fn test_breakdown_sums_to_score() {
        let row = make_row(
            "Norway",
            &[(Metric::Hdi, "0.96"), (Metric::GdpPerCapita, "89000"), (Metric::Cpi, "n/a")],
        );
        let weights = WeightVector::default();
        let breakdown = score_breakdown(&row, &weights);

        assert_eq!(breakdown.name.as_deref(), Some("Norway"));
        assert_eq!(breakdown.contributions.len(), Metric::ALL.len());
        let total: f64 = breakdown.contributions.iter().map(|c| c.contribution).sum();
        assert!((total - breakdown.score).abs() < 1e-9);

        let cpi = &breakdown.contributions[Metric::Cpi.index()];
        assert_eq!((cpi.value, cpi.contribution), (0.0, 0.0));
    }

    fn cell() -> impl Strategy<Value = String> {
        prop_oneof![
            (-1.0e6..1.0e6f64).prop_map(|v| v.to_string()),
            Just(String::new()),
            Just("N/A".to_string()),
            "[a-z_]{1,8}",
        ]
    }

    fn row_strategy() -> impl Strategy<Value = CountryRecord> {
        (
            prop_oneof![Just(String::new()), "[A-Z][a-z]{2,10}"],
            prop::collection::vec(cell(), Metric::ALL.len()),
        )
            .prop_map(|(name, cells)| {
                let mut row = CountryRecord::from_pairs([(NATION_NAME_COLUMN, name)]);
                for (metric, value) in Metric::ALL.iter().zip(cells) {
                    row.set(metric.column(), value);
                }
                row
            })
    }

    fn weights_strategy() -> impl Strategy<Value = WeightVector> {
        prop::collection::vec(0.0..=1.0f64, Metric::ALL.len()).prop_map(|ws| {
            let named = Metric::ALL
                .iter()
                .zip(ws)
                .map(|(m, w)| (m.column().to_string(), w))
                .collect();
            WeightVector::from_named(&named).unwrap()
        })
    }

    proptest! {
        #[test]
        fn prop_length_excludes_unnamed(
            rows in prop::collection::vec(row_strategy(), 0..40),
            weights in weights_strategy(),
        ) {
            let unnamed = rows.iter().filter(|r| r.nation_name().is_none()).count();
            let ranking = compute_ranking(&rows, &weights);
            prop_assert_eq!(ranking.len(), rows.len() - unnamed);
        }

        #[test]
        fn prop_zero_weights_preserve_input_order(
            rows in prop::collection::vec(row_strategy(), 0..40),
        ) {
            let ranking = compute_ranking(&rows, &WeightVector::uniform(0.0));
            let expected: Vec<&str> = rows.iter().filter_map(|r| r.nation_name()).collect();
            prop_assert_eq!(names(&ranking), expected);
            prop_assert!(ranking.iter().all(|e| e.score == 0.0));
        }

        #[test]
        fn prop_scores_finite_and_sorted(
            rows in prop::collection::vec(row_strategy(), 0..40),
            weights in weights_strategy(),
        ) {
            let ranking = compute_ranking(&rows, &weights);
            prop_assert!(ranking.iter().all(|e| e.score.is_finite()));
            prop_assert!(ranking.entries().windows(2).all(|w| w[0].score >= w[1].score));
        }

        #[test]
        fn prop_deterministic(
            rows in prop::collection::vec(row_strategy(), 0..40),
            weights in weights_strategy(),
        ) {
            prop_assert_eq!(compute_ranking(&rows, &weights), compute_ranking(&rows, &weights));
        }

        #[test]
        fn prop_non_numeric_cell_matches_literal_zero(
            row in row_strategy(),
            weights in weights_strategy(),
            metric_idx in 0..Metric::ALL.len(),
            junk in "[a-z_]{1,12}",
        ) {
            let metric = Metric::ALL[metric_idx];
            let mut with_junk = row.clone();
            with_junk.set(metric.column(), junk);
            let mut with_zero = row;
            with_zero.set(metric.column(), "0");

            prop_assert_eq!(score_record(&with_junk, &weights), score_record(&with_zero, &weights));
        }
    }
}
