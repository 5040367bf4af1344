use crate::stats::aggregate::ServingBreakdown;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServingBucket {
    pub date: String,
    pub total: u32,
    pub misses: u32,
    pub aces: u32,
    /// Serves that were neither missed nor aces.
    pub others: u32,
}

/// Date-ordered serving series for the player chart. Never empty: with no
/// data a single zero bucket for `today` stands in so the axis has a category.
pub fn serving_series(
    by_date: &BTreeMap<String, ServingBreakdown>,
    today: NaiveDate,
) -> Vec<ServingBucket> {
    if by_date.is_empty() {
        return vec![ServingBucket {
            date: today.format("%Y-%m-%d").to_string(),
            total: 0,
            misses: 0,
            aces: 0,
            others: 0,
        }];
    }

    by_date
        .iter()
        .map(|(date, b)| ServingBucket {
            date: date.clone(),
            total: b.total_serves,
            misses: b.missed_serves,
            aces: b.aces,
            others: b.total_serves.saturating_sub(b.missed_serves + b.aces),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_empty_map_yields_single_today_bucket() {
        let series = serving_series(&BTreeMap::new(), today());
        assert_eq!(
            series,
            vec![ServingBucket {
                date: "2026-10-19".into(),
                total: 0,
                misses: 0,
                aces: 0,
                others: 0,
            }]
        );
    }

    #[test]
    fn test_buckets_are_sorted_and_others_derived() {
        let mut by_date = BTreeMap::new();
        by_date.insert(
            "2024-07-04".to_string(),
            ServingBreakdown {
                total_serves: 10,
                missed_serves: 2,
                aces: 3,
            },
        );
        by_date.insert(
            "2024-07-01".to_string(),
            ServingBreakdown {
                total_serves: 1,
                missed_serves: 1,
                aces: 0,
            },
        );

        let series = serving_series(&by_date, today());
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "2024-07-01");
        assert_eq!(series[0].others, 0);
        assert_eq!(series[1].others, 5);
    }
}
