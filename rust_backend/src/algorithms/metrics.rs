//! Derived statistics over aggregated series and filtered records.
//!
//! Degenerate input never fails here: empty series give 0 or an empty
//! vector, and a rolling window without enough history gives `None`.
//! The only fallible entry point is [`occupancy_timeline`], which rejects a
//! zero bucket width or dwell time.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::hash::Hash;

use crate::algorithms::aggregation::count_by_key;
use crate::core::domain::NormalizedRecord;
use crate::error::{VisitError, VisitResult};

/// Summary statistics for a numeric sample.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DistributionStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub sum: f64,
}

/// Mean, median, population standard deviation, min, max and sum.
pub fn compute_stats(values: &[f64]) -> DistributionStats {
    if values.is_empty() {
        return DistributionStats::default();
    }

    let count = values.len();
    let sum: f64 = values.iter().sum();
    let mean = sum / count as f64;

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2.0
    } else {
        sorted[count / 2]
    };

    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    DistributionStats {
        count,
        mean,
        median,
        std_dev: variance.sqrt(),
        min: sorted[0],
        max: sorted[count - 1],
        sum,
    }
}

/// Trailing simple moving average.
///
/// The first `window - 1` positions are `None`. A window of 0 or 1 returns
/// the input unchanged.
///
/// # Examples
///
/// ```
/// use visitlog::algorithms::rolling_average;
///
/// let averaged = rolling_average(&[1.0, 2.0, 3.0, 4.0, 5.0], 3);
/// assert_eq!(averaged, vec![None, None, Some(2.0), Some(3.0), Some(4.0)]);
/// ```
pub fn rolling_average(series: &[f64], window: usize) -> Vec<Option<f64>> {
    if window <= 1 {
        return series.iter().copied().map(Some).collect();
    }

    let mut out = Vec::with_capacity(series.len());
    let mut running = 0.0;
    for (i, value) in series.iter().enumerate() {
        running += value;
        if i >= window {
            running -= series[i - window];
        }
        if i + 1 >= window {
            out.push(Some(running / window as f64));
        } else {
            out.push(None);
        }
    }
    out
}

/// Nearest-rank percentile. Returns 0 for an empty series.
///
/// # Examples
///
/// ```
/// use visitlog::algorithms::percentile;
///
/// assert_eq!(percentile(&[10.0, 20.0, 30.0, 40.0, 50.0], 50.0), 30.0);
/// assert_eq!(percentile(&[], 95.0), 0.0);
/// ```
pub fn percentile(series: &[f64], p: f64) -> f64 {
    if series.is_empty() {
        return 0.0;
    }

    let mut sorted = series.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len();
    let rank = (p / 100.0 * n as f64).ceil() as i64 - 1;
    let idx = rank.clamp(0, n as i64 - 1) as usize;
    sorted[idx]
}

/// Population z-scores. A zero standard deviation is treated as 1.
pub fn z_scores(series: &[f64]) -> Vec<f64> {
    if series.is_empty() {
        return Vec::new();
    }

    let n = series.len() as f64;
    let mean = series.iter().sum::<f64>() / n;
    let variance = series.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = match variance.sqrt() {
        sd if sd == 0.0 => 1.0,
        sd => sd,
    };

    series.iter().map(|v| (v - mean) / sd).collect()
}

/// A series point whose z-score magnitude reached the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub index: usize,
    pub value: f64,
    pub z: f64,
}

/// Flag every point with `|z| >= threshold`, in series order.
pub fn flag_anomalies(series: &[f64], threshold: f64) -> Vec<Anomaly> {
    z_scores(series)
        .into_iter()
        .enumerate()
        .filter(|(_, z)| z.abs() >= threshold)
        .map(|(index, z)| Anomaly {
            index,
            value: series[index],
            z,
        })
        .collect()
}

/// Minutes between consecutive records, rounded and floored at 0.
///
/// Expects records sorted by time; out-of-order pairs yield 0 rather than a
/// negative gap. Fewer than two records give an empty vector.
pub fn inter_arrival_gaps(records: &[NormalizedRecord]) -> Vec<u64> {
    records
        .windows(2)
        .map(|pair| {
            let seconds = (pair[1].timestamp - pair[0].timestamp).num_seconds();
            (seconds as f64 / 60.0).round().max(0.0) as u64
        })
        .collect()
}

/// One bucket of a Pareto ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoEntry<K> {
    pub key: K,
    pub count: u32,
    /// Running share of all records up to and including this bucket.
    pub cumulative_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParetoRanking<K> {
    pub total: usize,
    pub entries: Vec<ParetoEntry<K>>,
}

impl<K> ParetoRanking<K> {
    /// Number of leading buckets needed to reach `share` percent of traffic.
    pub fn buckets_for_share(&self, share: f64) -> usize {
        self.entries
            .iter()
            .position(|e| e.cumulative_percent >= share)
            .map_or(self.entries.len(), |i| i + 1)
    }
}

/// Rank buckets by count, descending, with cumulative share of the total.
///
/// Buckets with equal counts keep first-appearance order.
pub fn pareto_ranking<K, F>(records: &[NormalizedRecord], key_fn: F) -> ParetoRanking<K>
where
    K: Clone + Eq + Hash,
    F: Fn(&NormalizedRecord) -> K,
{
    let mut counts = count_by_key(records, key_fn);
    counts.sort_by(|a, b| b.1.cmp(&a.1));

    let total = records.len();
    let mut running = 0u64;
    let entries = counts
        .into_iter()
        .map(|(key, count)| {
            running += u64::from(count);
            ParetoEntry {
                key,
                count,
                cumulative_percent: running as f64 / total as f64 * 100.0,
            }
        })
        .collect();

    ParetoRanking { total, entries }
}

/// Key of a (date, hour) Pareto bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateHour {
    pub date: String,
    pub hour: u32,
}

pub fn pareto_by_date_hour(records: &[NormalizedRecord]) -> ParetoRanking<DateHour> {
    pareto_ranking(records, |r| DateHour {
        date: r.date_key.clone(),
        hour: r.hour,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyPoint {
    pub at: NaiveDateTime,
    pub occupancy: u32,
}

/// Estimated concurrent visitors over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyTimeline {
    pub bucket_minutes: u32,
    pub dwell_minutes: u32,
    pub points: Vec<OccupancyPoint>,
    pub peak: u32,
    pub peak_at: Option<NaiveDateTime>,
}

impl OccupancyTimeline {
    /// Peak as a percentage of `capacity`; 0 for zero capacity or no data.
    pub fn saturation(&self, capacity: u32) -> f64 {
        if capacity == 0 || self.points.is_empty() {
            return 0.0;
        }
        f64::from(self.peak) / f64::from(capacity) * 100.0
    }
}

/// Simulate occupancy by holding each visit for `dwell_minutes`.
///
/// Bucket boundaries are multiples of `bucket_minutes` from midnight of the
/// earliest date. A visit is counted at every boundary from its timestamp
/// through `timestamp + dwell`, both inclusive, so a dwell shorter than the
/// gap to the next boundary contributes nothing.
///
/// Only occupied boundaries are emitted, so the output grows with the number
/// of visits, never with the calendar span they cover.
pub fn occupancy_timeline(
    records: &[NormalizedRecord],
    dwell_minutes: u32,
    bucket_minutes: u32,
) -> VisitResult<OccupancyTimeline> {
    if bucket_minutes == 0 {
        return Err(VisitError::ConfigurationError(
            "bucket_minutes must be positive".to_string(),
        ));
    }
    if dwell_minutes == 0 {
        return Err(VisitError::ConfigurationError(
            "dwell_minutes must be positive".to_string(),
        ));
    }

    let mut timeline = OccupancyTimeline {
        bucket_minutes,
        dwell_minutes,
        points: Vec::new(),
        peak: 0,
        peak_at: None,
    };

    let Some(first_date) = records.iter().map(|r| r.date).min() else {
        return Ok(timeline);
    };
    let origin = first_date.and_time(chrono::NaiveTime::MIN);

    let bucket = i64::from(bucket_minutes);
    let dwell = i64::from(dwell_minutes);

    let mut counts: BTreeMap<i64, u32> = BTreeMap::new();
    for record in records {
        let offset = (record.timestamp - origin).num_minutes();
        let end = offset + dwell;
        let mut b = (offset + bucket - 1).div_euclid(bucket);
        while b * bucket <= end {
            *counts.entry(b).or_insert(0) += 1;
            b += 1;
        }
    }

    timeline.points = counts
        .into_iter()
        .map(|(b, occupancy)| OccupancyPoint {
            at: origin + Duration::minutes(b * bucket),
            occupancy,
        })
        .collect();
    for point in &timeline.points {
        if point.occupancy > timeline.peak {
            timeline.peak = point.occupancy;
            timeline.peak_at = Some(point.at);
        }
    }

    log::debug!(
        "Occupancy timeline: {} occupied buckets of {} min, peak {}",
        timeline.points.len(),
        bucket_minutes,
        timeline.peak
    );

    Ok(timeline)
}
