use std::collections::BTreeSet;

use crate::core::domain::{CategoryFilter, FilterCriteria, HourRange, NormalizedRecord};
use crate::error::VisitResult;

/// Filter records by an inclusive date range.
///
/// Bounds are compared against `date_key` as strings, which matches calendar
/// order for ISO dates. A missing bound is open.
pub fn filter_by_date_range(
    records: &[NormalizedRecord],
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| {
            start_date.map_or(true, |start| r.date_key.as_str() >= start)
                && end_date.map_or(true, |end| r.date_key.as_str() <= end)
        })
        .cloned()
        .collect()
}

/// Filter records by visitor category
pub fn filter_by_category(
    records: &[NormalizedRecord],
    category: CategoryFilter,
) -> Vec<NormalizedRecord> {
    match category {
        CategoryFilter::All => records.to_vec(),
        _ => records
            .iter()
            .filter(|r| category.matches(r.is_child))
            .cloned()
            .collect(),
    }
}

/// Filter records by hour of day (inclusive)
pub fn filter_by_hour_range(records: &[NormalizedRecord], range: HourRange) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|r| range.contains(r.hour))
        .cloned()
        .collect()
}

/// Apply every active criterion and return the survivors sorted by time.
///
/// The output is ordered by timestamp, ties broken by original input
/// position, regardless of the order of `records`. An empty result is valid.
pub fn apply_filters(
    records: &[NormalizedRecord],
    criteria: &FilterCriteria,
) -> VisitResult<Vec<NormalizedRecord>> {
    let hour_range = criteria.hour_range()?;

    let by_date = filter_by_date_range(
        records,
        criteria.start_date.as_deref(),
        criteria.end_date.as_deref(),
    );
    let by_category = filter_by_category(&by_date, criteria.category);
    let mut filtered = match hour_range {
        Some(range) => filter_by_hour_range(&by_category, range),
        None => by_category,
    };

    sort_by_time(&mut filtered);

    log::debug!(
        "Filter kept {} of {} records (dates {:?}..{:?}, category {:?}, hours {:?})",
        filtered.len(),
        records.len(),
        criteria.start_date,
        criteria.end_date,
        criteria.category,
        hour_range
    );

    Ok(filtered)
}

/// Sort in place by timestamp, then by original input position
pub fn sort_by_time(records: &mut [NormalizedRecord]) {
    records.sort_by(|a, b| {
        a.timestamp
            .cmp(&b.timestamp)
            .then(a.sequence_index.cmp(&b.sequence_index))
    });
}

/// Distinct date keys present, ascending
pub fn distinct_dates(records: &[NormalizedRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.date_key.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// First and last date present, used to reset a date filter to the full range
pub fn date_bounds(records: &[NormalizedRecord]) -> Option<(String, String)> {
    let first = records.iter().map(|r| &r.date_key).min()?;
    let last = records.iter().map(|r| &r.date_key).max()?;
    Some((first.clone(), last.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::RawRecord;
    use crate::preprocessing::RecordNormalizer;

    fn sample_records() -> Vec<NormalizedRecord> {
        RecordNormalizer::default()
            .normalize(&[
                RawRecord::new("2024-06-03", Some("18:10"), "Adulto"),
                RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
                RawRecord::new("2024-06-01", Some("09:15"), "Bambino"),
                RawRecord::new("2024-06-02", Some("12:00"), "Bambino"),
                RawRecord::new("2024-06-01", Some("08:00"), "Adulto"),
            ])
            .records
    }

    #[test]
    fn test_filter_by_date_range() {
        let records = sample_records();
        let filtered = filter_by_date_range(&records, Some("2024-06-02"), Some("2024-06-03"));
        assert_eq!(filtered.len(), 2);

        let open_start = filter_by_date_range(&records, None, Some("2024-06-01"));
        assert_eq!(open_start.len(), 3);
    }

    #[test]
    fn test_filter_by_category() {
        let records = sample_records();

        let all = filter_by_category(&records, CategoryFilter::All);
        assert_eq!(all.len(), 5);

        let adults = filter_by_category(&records, CategoryFilter::AdultsOnly);
        assert_eq!(adults.len(), 3);

        let children = filter_by_category(&records, CategoryFilter::ChildrenOnly);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_filter_by_hour_range() {
        let records = sample_records();
        let filtered = filter_by_hour_range(&records, HourRange::new(9, 17).unwrap());
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_apply_filters_sorts_by_time_with_stable_ties() {
        let records = sample_records();
        let filtered = apply_filters(&records, &FilterCriteria::default()).unwrap();

        let order: Vec<usize> = filtered.iter().map(|r| r.sequence_index).collect();
        assert_eq!(order, vec![4, 1, 2, 3, 0]);
    }

    #[test]
    fn test_apply_filters_combined() {
        let records = sample_records();
        let criteria = FilterCriteria {
            start_date: Some("2024-06-01".to_string()),
            end_date: Some("2024-06-02".to_string()),
            category: CategoryFilter::AdultsOnly,
            hour_range_floor: Some(9),
            hour_range_ceiling: Some(17),
            ..FilterCriteria::default()
        };

        let filtered = apply_filters(&records, &criteria).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sequence_index, 1);
    }

    #[test]
    fn test_apply_filters_matches_chained_helpers() {
        let records = sample_records();
        let criteria = FilterCriteria {
            start_date: Some("2024-06-01".to_string()),
            end_date: Some("2024-06-02".to_string()),
            category: CategoryFilter::ChildrenOnly,
            hour_range_floor: Some(9),
            hour_range_ceiling: Some(17),
            ..FilterCriteria::default()
        };

        let by_date = filter_by_date_range(&records, Some("2024-06-01"), Some("2024-06-02"));
        let by_category = filter_by_category(&by_date, CategoryFilter::ChildrenOnly);
        let mut expected = filter_by_hour_range(&by_category, HourRange::new(9, 17).unwrap());
        sort_by_time(&mut expected);

        assert_eq!(apply_filters(&records, &criteria).unwrap(), expected);
        assert_eq!(expected.len(), 2);
    }

    #[test]
    fn test_apply_filters_hour_range_needs_both_bounds() {
        let records = sample_records();
        let criteria = FilterCriteria {
            hour_range_floor: Some(9),
            ..FilterCriteria::default()
        };
        assert_eq!(apply_filters(&records, &criteria).unwrap().len(), 5);
    }

    #[test]
    fn test_apply_filters_empty_result() {
        let records = sample_records();
        let criteria = FilterCriteria {
            start_date: Some("2025-01-01".to_string()),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&records, &criteria).unwrap().is_empty());
    }

    #[test]
    fn test_apply_filters_rejects_bad_hour_range() {
        let records = sample_records();
        let criteria = FilterCriteria {
            hour_range_floor: Some(20),
            hour_range_ceiling: Some(8),
            ..FilterCriteria::default()
        };
        assert!(apply_filters(&records, &criteria).is_err());
    }

    #[test]
    fn test_distinct_dates_and_bounds() {
        let records = sample_records();
        assert_eq!(
            distinct_dates(&records),
            vec!["2024-06-01", "2024-06-02", "2024-06-03"]
        );
        assert_eq!(
            date_bounds(&records),
            Some(("2024-06-01".to_string(), "2024-06-03".to_string()))
        );
        assert_eq!(date_bounds(&[]), None);
    }
}
