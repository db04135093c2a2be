//! Time-bucketed aggregation of filtered visit records.
//!
//! Every function here is pure: it reads the records it is given and returns
//! a freshly built result.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::domain::{HourRange, NormalizedRecord};
use crate::time::{self, WeekStart};

pub const HOURS_PER_DAY: usize = 24;

/// Visits and revenue for one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: String,
    pub count: u32,
    pub adults: u32,
    pub children: u32,
    pub revenue: u64,
}

/// Visits for one hour of day, summed over every date in the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyAggregate {
    pub hour: u32,
    pub count: u32,
    pub adults: u32,
    pub children: u32,
    pub revenue: u64,
    /// Largest single-date count for this hour.
    pub max_per_day: u32,
    /// Smallest single-date count for this hour; dates without visits in the
    /// hour count as zero.
    pub min_per_day: u32,
}

/// One row of the half-hour table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfHourRow {
    /// `HH:00` or `HH:30`
    pub bucket: String,
    pub adults: u32,
    pub children: u32,
    pub total: u32,
    pub adult_revenue: u64,
    pub child_revenue: u64,
    pub total_revenue: u64,
}

impl HalfHourRow {
    fn add(&mut self, record: &NormalizedRecord) {
        let price = u64::from(record.unit_price);
        if record.is_child {
            self.children += 1;
            self.child_revenue += price;
        } else {
            self.adults += 1;
            self.adult_revenue += price;
        }
        self.total += 1;
        self.total_revenue += price;
    }
}

/// Occupied half-hour buckets plus a totals row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfHourTable {
    pub rows: Vec<HalfHourRow>,
    pub totals: HalfHourRow,
}

/// Visit count for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub index: u32,
    pub label: String,
    pub count: u32,
}

/// Dates × hours cross tabulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heatmap {
    /// Row labels, ascending.
    pub dates: Vec<String>,
    /// Column labels, always `0..=23`.
    pub hours: Vec<u32>,
    pub counts: Vec<Vec<u32>>,
    pub adults: Vec<Vec<u32>>,
    pub children: Vec<Vec<u32>>,
    /// Revenue per cell, from each record's unit price.
    pub revenue: Vec<Vec<u64>>,
}

impl Heatmap {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// A busy (date, hour) cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hotspot {
    pub date: String,
    pub hour: u32,
    pub count: u32,
    pub adults: u32,
    pub children: u32,
    pub revenue: u64,
}

#[derive(Default)]
struct Tally {
    count: u32,
    adults: u32,
    children: u32,
    revenue: u64,
}

impl Tally {
    fn add(&mut self, record: &NormalizedRecord) {
        self.count += 1;
        if record.is_child {
            self.children += 1;
        } else {
            self.adults += 1;
        }
        self.revenue += u64::from(record.unit_price);
    }
}

/// Group records by date, ascending by date key.
///
/// Only dates that actually occur are returned; there are no zero-filled
/// calendar gaps.
///
/// # Examples
///
/// ```
/// use visitlog::algorithms::aggregate_daily;
/// use visitlog::core::domain::RawRecord;
/// use visitlog::preprocessing::RecordNormalizer;
///
/// let records = RecordNormalizer::default()
///     .normalize(&[
///         RawRecord::new("2024-06-02", Some("10:00"), "Adulto"),
///         RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
///         RawRecord::new("2024-06-01", Some("09:40"), "Bambino"),
///     ])
///     .records;
///
/// let daily = aggregate_daily(&records);
/// assert_eq!(daily.len(), 2);
/// assert_eq!(daily[0].date, "2024-06-01");
/// assert_eq!(daily[0].revenue, 5);
/// ```
pub fn aggregate_daily(records: &[NormalizedRecord]) -> Vec<DailyAggregate> {
    let mut by_date: BTreeMap<&str, Tally> = BTreeMap::new();
    for record in records {
        by_date.entry(record.date_key.as_str()).or_default().add(record);
    }

    by_date
        .into_iter()
        .map(|(date, t)| DailyAggregate {
            date: date.to_string(),
            count: t.count,
            adults: t.adults,
            children: t.children,
            revenue: t.revenue,
        })
        .collect()
}

/// Group records by hour of day across all dates.
///
/// Returns one row per hour of `hour_range` (all 24 hours when `None`),
/// including hours without visits. Records outside the range are ignored.
pub fn aggregate_hourly(
    records: &[NormalizedRecord],
    hour_range: Option<HourRange>,
) -> Vec<HourlyAggregate> {
    let range = hour_range.unwrap_or_default();

    let mut totals: Vec<Tally> = (0..HOURS_PER_DAY).map(|_| Tally::default()).collect();
    let mut per_date: BTreeMap<&str, [u32; HOURS_PER_DAY]> = BTreeMap::new();

    // Every date in the set participates in min/max, even if it has no
    // visits inside the range.
    for record in records {
        let row = per_date
            .entry(record.date_key.as_str())
            .or_insert([0; HOURS_PER_DAY]);
        if range.contains(record.hour) {
            row[record.hour as usize] += 1;
            totals[record.hour as usize].add(record);
        }
    }

    range
        .hours()
        .map(|hour| {
            let h = hour as usize;
            let max_per_day = per_date.values().map(|row| row[h]).max().unwrap_or(0);
            let min_per_day = per_date.values().map(|row| row[h]).min().unwrap_or(0);
            let t = &totals[h];
            HourlyAggregate {
                hour,
                count: t.count,
                adults: t.adults,
                children: t.children,
                revenue: t.revenue,
                max_per_day,
                min_per_day,
            }
        })
        .collect()
}

/// Group records into occupied half-hour buckets with revenue split.
///
/// Revenue is summed from each record's own unit price.
pub fn aggregate_half_hour(records: &[NormalizedRecord]) -> HalfHourTable {
    let mut by_bucket: BTreeMap<&str, HalfHourRow> = BTreeMap::new();
    let mut totals = HalfHourRow {
        bucket: "TOTAL".to_string(),
        ..HalfHourRow::default()
    };

    for record in records {
        let row = by_bucket
            .entry(record.half_hour_bucket.as_str())
            .or_insert_with(|| HalfHourRow {
                bucket: record.half_hour_bucket.clone(),
                ..HalfHourRow::default()
            });
        row.add(record);
        totals.add(record);
    }

    HalfHourTable {
        rows: by_bucket.into_values().collect(),
        totals,
    }
}

/// Total visits per weekday over the whole record set.
///
/// Always returns seven entries, indexed by the chosen convention. This is a
/// sum over every matching date, not an average.
pub fn aggregate_weekday(records: &[NormalizedRecord], week_start: WeekStart) -> Vec<WeekdayCount> {
    let mut counts = [0u32; 7];
    for record in records {
        counts[time::weekday_index(record.date, week_start) as usize] += 1;
    }

    counts
        .iter()
        .enumerate()
        .map(|(index, &count)| WeekdayCount {
            index: index as u32,
            label: time::weekday_label(index as u32, week_start).to_string(),
            count,
        })
        .collect()
}

/// Daily totals grouped by weekday (Sunday=0), for spread/box-plot views.
pub fn weekday_distribution(daily: &[DailyAggregate]) -> [Vec<u32>; 7] {
    let mut by_weekday: [Vec<u32>; 7] = Default::default();
    for day in daily {
        if let Some(date) = time::parse_date(&day.date) {
            by_weekday[time::weekday_index(date, WeekStart::Sunday) as usize].push(day.count);
        }
    }
    by_weekday
}

#[derive(Default)]
struct HeatmapRow {
    adults: [u32; HOURS_PER_DAY],
    children: [u32; HOURS_PER_DAY],
    revenue: [u64; HOURS_PER_DAY],
}

/// Cross-tabulate dates against hours of day.
pub fn aggregate_heatmap(records: &[NormalizedRecord]) -> Heatmap {
    let mut rows: BTreeMap<&str, HeatmapRow> = BTreeMap::new();
    for record in records {
        let row = rows.entry(record.date_key.as_str()).or_default();
        let h = record.hour as usize;
        if record.is_child {
            row.children[h] += 1;
        } else {
            row.adults[h] += 1;
        }
        row.revenue[h] += u64::from(record.unit_price);
    }

    let mut heatmap = Heatmap {
        dates: Vec::with_capacity(rows.len()),
        hours: (0..HOURS_PER_DAY as u32).collect(),
        counts: Vec::with_capacity(rows.len()),
        adults: Vec::with_capacity(rows.len()),
        children: Vec::with_capacity(rows.len()),
        revenue: Vec::with_capacity(rows.len()),
    };

    for (date, row) in rows {
        heatmap.dates.push(date.to_string());
        heatmap.counts.push(
            row.adults
                .iter()
                .zip(row.children.iter())
                .map(|(a, c)| a + c)
                .collect(),
        );
        heatmap.adults.push(row.adults.to_vec());
        heatmap.children.push(row.children.to_vec());
        heatmap.revenue.push(row.revenue.to_vec());
    }

    heatmap
}

/// Busiest (date, hour) cells of a heatmap.
///
/// Sorted by count descending; equal counts keep date then hour order.
pub fn hotspots(heatmap: &Heatmap, top_n: usize) -> Vec<Hotspot> {
    let mut cells = Vec::new();
    for (row, date) in heatmap.dates.iter().enumerate() {
        for (h, &count) in heatmap.counts[row].iter().enumerate() {
            if count == 0 {
                continue;
            }
            cells.push(Hotspot {
                date: date.clone(),
                hour: h as u32,
                count,
                adults: heatmap.adults[row][h],
                children: heatmap.children[row][h],
                revenue: heatmap.revenue[row][h],
            });
        }
    }

    cells.sort_by(|a, b| b.count.cmp(&a.count));
    cells.truncate(top_n);
    cells
}

/// Count of visits per arbitrary key, in first-seen order.
pub(crate) fn count_by_key<K, F>(records: &[NormalizedRecord], key_fn: F) -> Vec<(K, u32)>
where
    K: Clone + Eq + std::hash::Hash,
    F: Fn(&NormalizedRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut counts: Vec<(K, u32)> = Vec::new();
    for record in records {
        let key = key_fn(record);
        match index.get(&key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key.clone(), counts.len());
                counts.push((key, 1));
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::{PriceTable, RawRecord};
    use crate::preprocessing::RecordNormalizer;

    fn normalize(raw: &[RawRecord]) -> Vec<NormalizedRecord> {
        RecordNormalizer::default().normalize(raw).records
    }

    fn scenario() -> Vec<NormalizedRecord> {
        normalize(&[
            RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
            RawRecord::new("2024-06-01", Some("09:40"), "Bambino"),
            RawRecord::new("2024-06-02", Some("10:00"), "Adulto"),
        ])
    }

    #[test]
    fn test_aggregate_daily_scenario() {
        let daily = aggregate_daily(&scenario());
        assert_eq!(
            daily,
            vec![
                DailyAggregate {
                    date: "2024-06-01".to_string(),
                    count: 2,
                    adults: 1,
                    children: 1,
                    revenue: 5,
                },
                DailyAggregate {
                    date: "2024-06-02".to_string(),
                    count: 1,
                    adults: 1,
                    children: 0,
                    revenue: 3,
                },
            ]
        );
    }

    #[test]
    fn test_aggregate_daily_is_sparse_and_idempotent() {
        let records = normalize(&[
            RawRecord::new("2024-06-10", None, "Adulto"),
            RawRecord::new("2024-06-01", None, "Adulto"),
        ]);
        let first = aggregate_daily(&records);
        let second = aggregate_daily(&records);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].date, "2024-06-01");
    }

    #[test]
    fn test_aggregate_daily_empty() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_aggregate_hourly_full_day() {
        let hourly = aggregate_hourly(&scenario(), None);
        assert_eq!(hourly.len(), 24);

        let nine = &hourly[9];
        assert_eq!(nine.count, 2);
        assert_eq!(nine.adults, 1);
        assert_eq!(nine.children, 1);
        assert_eq!(nine.revenue, 5);
        assert_eq!(nine.max_per_day, 2);
        assert_eq!(nine.min_per_day, 0);

        let ten = &hourly[10];
        assert_eq!(ten.count, 1);
        assert_eq!(ten.max_per_day, 1);
        assert_eq!(ten.min_per_day, 0);
    }

    #[test]
    fn test_aggregate_hourly_single_date_max_equals_min() {
        let records = normalize(&[
            RawRecord::new("2024-06-01", Some("11:00"), "Adulto"),
            RawRecord::new("2024-06-01", Some("11:30"), "Adulto"),
        ]);
        let hourly = aggregate_hourly(&records, None);
        assert_eq!(hourly[11].max_per_day, 2);
        assert_eq!(hourly[11].min_per_day, 2);
    }

    #[test]
    fn test_aggregate_hourly_restricted_range() {
        let records = normalize(&[
            RawRecord::new("2024-06-01", Some("08:00"), "Adulto"),
            RawRecord::new("2024-06-01", Some("09:00"), "Adulto"),
            RawRecord::new("2024-06-01", Some("18:00"), "Adulto"),
        ]);
        let hourly = aggregate_hourly(&records, Some(HourRange::new(9, 17).unwrap()));
        assert_eq!(hourly.len(), 9);
        assert_eq!(hourly[0].hour, 9);
        assert_eq!(hourly.iter().map(|h| h.count).sum::<u32>(), 1);
    }

    #[test]
    fn test_aggregate_hourly_empty() {
        let hourly = aggregate_hourly(&[], None);
        assert_eq!(hourly.len(), 24);
        assert!(hourly.iter().all(|h| h.count == 0 && h.max_per_day == 0));
    }

    #[test]
    fn test_aggregate_half_hour() {
        let table = aggregate_half_hour(&scenario());
        let buckets: Vec<&str> = table.rows.iter().map(|r| r.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["09:00", "09:30", "10:00"]);
        assert_eq!(table.rows[1].children, 1);
        assert_eq!(table.rows[1].child_revenue, 2);
        assert_eq!(table.totals.bucket, "TOTAL");
        assert_eq!(table.totals.total, 3);
        assert_eq!(table.totals.adult_revenue, 6);
        assert_eq!(table.totals.total_revenue, 8);
    }

    #[test]
    fn test_half_hour_and_hotspot_revenue_follow_record_prices() {
        let records = RecordNormalizer::new(PriceTable::new(5, 10), "bamb")
            .normalize(&[
                RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
                RawRecord::new("2024-06-01", Some("09:20"), "Bambino"),
            ])
            .records;
        let daily_revenue: u64 = aggregate_daily(&records).iter().map(|d| d.revenue).sum();

        let table = aggregate_half_hour(&records);
        assert_eq!(table.rows[0].adult_revenue, 10);
        assert_eq!(table.rows[0].child_revenue, 5);
        assert_eq!(table.totals.total_revenue, daily_revenue);

        let top = hotspots(&aggregate_heatmap(&records), 1);
        assert_eq!(top[0].revenue, daily_revenue);
    }

    #[test]
    fn test_aggregate_weekday() {
        // 2024-06-01 Saturday, 2024-06-02 Sunday
        let weekdays = aggregate_weekday(&scenario(), WeekStart::Sunday);
        assert_eq!(weekdays.len(), 7);
        assert_eq!(weekdays[0].label, "Sun");
        assert_eq!(weekdays[0].count, 1);
        assert_eq!(weekdays[6].label, "Sat");
        assert_eq!(weekdays[6].count, 2);

        let monday_first = aggregate_weekday(&scenario(), WeekStart::Monday);
        assert_eq!(monday_first[5].label, "Sat");
        assert_eq!(monday_first[5].count, 2);
        assert_eq!(monday_first[6].count, 1);
    }

    #[test]
    fn test_weekday_distribution() {
        let records = normalize(&[
            RawRecord::new("2024-06-01", None, "Adulto"),
            RawRecord::new("2024-06-08", None, "Adulto"),
            RawRecord::new("2024-06-08", None, "Adulto"),
        ]);
        let distribution = weekday_distribution(&aggregate_daily(&records));
        assert_eq!(distribution[6], vec![1, 2]);
        assert!(distribution[0].is_empty());
    }

    #[test]
    fn test_aggregate_heatmap() {
        let heatmap = aggregate_heatmap(&scenario());
        assert_eq!(heatmap.dates, vec!["2024-06-01", "2024-06-02"]);
        assert_eq!(heatmap.hours.len(), 24);
        assert_eq!(heatmap.counts[0][9], 2);
        assert_eq!(heatmap.adults[0][9], 1);
        assert_eq!(heatmap.children[0][9], 1);
        assert_eq!(heatmap.counts[1][10], 1);
        assert_eq!(heatmap.counts[1].iter().sum::<u32>(), 1);
        assert_eq!(heatmap.revenue[0][9], 5);
    }

    #[test]
    fn test_aggregate_heatmap_empty() {
        let heatmap = aggregate_heatmap(&[]);
        assert!(heatmap.is_empty());
        assert!(heatmap.counts.is_empty());
        assert_eq!(heatmap.hours.len(), 24);
    }

    #[test]
    fn test_hotspots_order_and_revenue() {
        let records = normalize(&[
            RawRecord::new("2024-06-02", Some("10:00"), "Adulto"),
            RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
            RawRecord::new("2024-06-01", Some("11:00"), "Adulto"),
            RawRecord::new("2024-06-01", Some("11:10"), "Bambino"),
        ]);
        let heatmap = aggregate_heatmap(&records);
        let top = hotspots(&heatmap, 2);

        assert_eq!(top.len(), 2);
        assert_eq!((top[0].date.as_str(), top[0].hour), ("2024-06-01", 11));
        assert_eq!(top[0].revenue, 5);
        assert_eq!((top[1].date.as_str(), top[1].hour), ("2024-06-01", 9));
    }

    #[test]
    fn test_count_by_key_first_seen_order() {
        let counts = count_by_key(&scenario(), |r| r.date_key.clone());
        assert_eq!(
            counts,
            vec![("2024-06-01".to_string(), 2), ("2024-06-02".to_string(), 1)]
        );
    }
}
