use std::collections::HashMap;

use crate::fetch::snapshot::QuarterObservation;

/// Number of growth cells in every output row: 6 quarters × (sales, profit).
pub const GROWTH_CELLS: usize = 12;

/// A single year-over-year growth figure. `Pct` carries the raw percentage
/// (a zero prior-year base yields `inf`/`NaN` here, unguarded on purpose);
/// `Unavailable` means the prior-year quarter was not in the source data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GrowthValue {
    Pct(f64),
    Unavailable,
}

/// Compute YOY growth for the last 6 quarters of `quarters`.
///
/// The lookup from label to index keeps the last occurrence when a label
/// repeats. A quarter whose `"<Month> <Year-1>"` counterpart is absent
/// (or whose label has no parseable year) produces an `Unavailable` pair.
/// The result is always exactly [`GROWTH_CELLS`] values, oldest quarter
/// first, front-padded with `Unavailable` pairs when fewer than 6 quarters
/// exist.
pub fn compute_yoy(quarters: &[QuarterObservation]) -> Vec<GrowthValue> {
    let mut index_by_label: HashMap<&str, usize> = HashMap::new();
    for (idx, q) in quarters.iter().enumerate() {
        // last occurrence wins
        index_by_label.insert(q.quarter.as_str(), idx);
    }

    let window = &quarters[quarters.len().saturating_sub(6)..];

    let mut yoy = Vec::with_capacity(GROWTH_CELLS);
    for q in window {
        let prior = prior_year_label(&q.quarter)
            .and_then(|label| index_by_label.get(label.as_str()))
            .map(|&idx| &quarters[idx]);

        match prior {
            Some(p) => {
                yoy.push(GrowthValue::Pct(round2(
                    (q.sales - p.sales) / p.sales.abs() * 100.0,
                )));
                yoy.push(GrowthValue::Pct(round2(
                    (q.profit - p.profit) / p.profit.abs() * 100.0,
                )));
            }
            None => {
                yoy.push(GrowthValue::Unavailable);
                yoy.push(GrowthValue::Unavailable);
            }
        }
    }

    while yoy.len() < GROWTH_CELLS {
        yoy.insert(0, GrowthValue::Unavailable);
    }

    yoy
}

/// `"Mar 2023"` → `"Mar 2022"`. Exact string construction, no month
/// normalization; `None` when the label has no parseable year.
fn prior_year_label(label: &str) -> Option<String> {
    let (month, year) = label.split_once(' ')?;
    let year: i32 = year.trim().parse().ok()?;
    Some(format!("{month} {}", year - 1))
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(label: &str, sales: f64, profit: f64) -> QuarterObservation {
        QuarterObservation {
            quarter: label.to_string(),
            sales,
            profit,
        }
    }

    #[test]
    fn always_returns_twelve_values() {
        assert_eq!(compute_yoy(&[]).len(), GROWTH_CELLS);
        assert_eq!(compute_yoy(&[q("Mar 2023", 1.0, 1.0)]).len(), GROWTH_CELLS);

        let many: Vec<_> = (2015..2025)
            .flat_map(|y| {
                ["Mar", "Jun", "Sep", "Dec"]
                    .into_iter()
                    .map(move |m| q(&format!("{m} {y}"), y as f64, y as f64))
            })
            .collect();
        assert_eq!(compute_yoy(&many).len(), GROWTH_CELLS);
    }

    #[test]
    fn worked_example_two_quarters() {
        let yoy = compute_yoy(&[q("Mar 2022", 100.0, 10.0), q("Mar 2023", 120.0, 8.0)]);

        assert_eq!(yoy.len(), GROWTH_CELLS);
        // Mar 2022 has no Mar 2021, Mar 2023 matches Mar 2022, then the
        // whole thing is front-padded: 10 unavailable cells, then the pair.
        assert!(yoy[..10].iter().all(|v| *v == GrowthValue::Unavailable));
        assert_eq!(yoy[10], GrowthValue::Pct(20.0));
        assert_eq!(yoy[11], GrowthValue::Pct(-20.0));
    }

    #[test]
    fn growth_math_rounds_to_two_decimals() {
        let yoy = compute_yoy(&[q("Jun 2022", 3.0, 3.0), q("Jun 2023", 4.0, 4.0)]);
        // (4 - 3) / 3 * 100 = 33.333... → 33.33
        assert_eq!(yoy[10], GrowthValue::Pct(33.33));
        assert_eq!(yoy[11], GrowthValue::Pct(33.33));
    }

    #[test]
    fn negative_prior_uses_absolute_denominator() {
        let yoy = compute_yoy(&[q("Sep 2022", -50.0, -10.0), q("Sep 2023", 50.0, -20.0)]);
        // (50 - -50) / 50 * 100 = 200, (-20 - -10) / 10 * 100 = -100
        assert_eq!(yoy[10], GrowthValue::Pct(200.0));
        assert_eq!(yoy[11], GrowthValue::Pct(-100.0));
    }

    #[test]
    fn missing_prior_year_yields_unavailable_pair() {
        let yoy = compute_yoy(&[
            q("Mar 2022", 100.0, 10.0),
            q("Jun 2022", 110.0, 11.0),
            q("Jun 2023", 120.0, 12.0),
        ]);
        // Mar 2022 and Jun 2022 have no prior year; Jun 2023 does.
        assert_eq!(yoy[6], GrowthValue::Unavailable);
        assert_eq!(yoy[7], GrowthValue::Unavailable);
        assert_eq!(yoy[8], GrowthValue::Unavailable);
        assert_eq!(yoy[9], GrowthValue::Unavailable);
        assert_eq!(yoy[10], GrowthValue::Pct(9.09));
        assert_eq!(yoy[11], GrowthValue::Pct(9.09));
    }

    #[test]
    fn malformed_label_yields_unavailable() {
        let yoy = compute_yoy(&[q("TTM", 100.0, 10.0)]);
        assert!(yoy.iter().all(|v| *v == GrowthValue::Unavailable));
    }

    #[test]
    fn duplicate_labels_last_occurrence_wins() {
        let yoy = compute_yoy(&[
            q("Dec 2022", 100.0, 100.0),
            q("Dec 2022", 200.0, 200.0),
            q("Dec 2023", 300.0, 300.0),
        ]);
        // Prior for Dec 2023 resolves to the second Dec 2022 row.
        assert_eq!(yoy[10], GrowthValue::Pct(50.0));
        assert_eq!(yoy[11], GrowthValue::Pct(50.0));
    }

    #[test]
    fn zero_prior_base_flows_through_as_infinity() {
        let yoy = compute_yoy(&[q("Mar 2022", 0.0, 0.0), q("Mar 2023", 10.0, 0.0)]);
        match yoy[10] {
            GrowthValue::Pct(v) => assert!(v.is_infinite() && v > 0.0),
            GrowthValue::Unavailable => panic!("expected a raw infinite percentage"),
        }
        match yoy[11] {
            GrowthValue::Pct(v) => assert!(v.is_nan()),
            GrowthValue::Unavailable => panic!("expected a raw NaN percentage"),
        }
    }

    #[test]
    fn only_last_six_quarters_are_emitted() {
        let quarters: Vec<_> = (2016..2024)
            .map(|y| q(&format!("Mar {y}"), y as f64, y as f64))
            .collect();
        let yoy = compute_yoy(&quarters);
        assert_eq!(yoy.len(), GROWTH_CELLS);
        // All 6 emitted quarters (Mar 2018..Mar 2023) have a prior year.
        assert!(yoy.iter().all(|v| matches!(v, GrowthValue::Pct(_))));
    }

    #[test]
    fn pure_and_idempotent() {
        let quarters = vec![q("Mar 2022", 100.0, 10.0), q("Mar 2023", 120.0, 8.0)];
        assert_eq!(compute_yoy(&quarters), compute_yoy(&quarters));
    }
}
