use serde::{Deserialize, Serialize};

use crate::algorithms::aggregation::{
    aggregate_daily, aggregate_half_hour, aggregate_heatmap, aggregate_hourly, aggregate_weekday,
    hotspots, weekday_distribution, DailyAggregate, HalfHourTable, Heatmap, Hotspot,
    HourlyAggregate, WeekdayCount,
};
use crate::algorithms::metrics::{
    compute_stats, flag_anomalies, inter_arrival_gaps, occupancy_timeline, pareto_by_date_hour,
    percentile, rolling_average, z_scores, Anomaly, DateHour, OccupancyTimeline, ParetoRanking,
};
use crate::config::EngineConfig;
use crate::core::domain::{FilterCriteria, NormalizedRecord};
use crate::error::VisitResult;
use crate::time::WeekStart;
use crate::transformations::{apply_filters, date_bounds};

/// Headline KPIs for the filtered record set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitSnapshot {
    pub total_visits: usize,
    pub total_revenue: u64,
    pub active_days: usize,
    pub mean_per_day: f64,
    pub std_dev_per_day: f64,
    /// Coefficient of variation of daily counts, in percent.
    pub cv_percent: f64,
    pub adult_share_percent: f64,
    pub best_day: Option<DailyAggregate>,
    pub p95_daily: f64,
    pub median_gap_minutes: f64,
}

/// Compute KPIs from records plus their daily aggregate and arrival gaps.
///
/// The best day is the first date, in date order, with the highest count.
pub fn compute_snapshot(
    records: &[NormalizedRecord],
    daily: &[DailyAggregate],
    gaps: &[u64],
) -> VisitSnapshot {
    let total_visits = records.len();
    let total_revenue = records.iter().map(|r| u64::from(r.unit_price)).sum();
    let adults = records.iter().filter(|r| !r.is_child).count();

    let daily_counts: Vec<f64> = daily.iter().map(|d| f64::from(d.count)).collect();
    let day_stats = compute_stats(&daily_counts);

    let cv_percent = if day_stats.mean > 0.0 {
        day_stats.std_dev / day_stats.mean * 100.0
    } else {
        0.0
    };
    let adult_share_percent = if total_visits > 0 {
        adults as f64 / total_visits as f64 * 100.0
    } else {
        0.0
    };

    let best_day = daily
        .iter()
        .fold(None::<&DailyAggregate>, |best, day| match best {
            Some(b) if b.count >= day.count => Some(b),
            _ => Some(day),
        })
        .cloned();

    let gap_values: Vec<f64> = gaps.iter().map(|&g| g as f64).collect();

    VisitSnapshot {
        total_visits,
        total_revenue,
        active_days: daily.len(),
        mean_per_day: day_stats.mean,
        std_dev_per_day: day_stats.std_dev,
        cv_percent,
        adult_share_percent,
        best_day,
        p95_daily: percentile(&daily_counts, 95.0),
        median_gap_minutes: percentile(&gap_values, 50.0),
    }
}

/// Occupancy timeline with its saturation against configured capacity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupancyView {
    pub capacity: u32,
    pub saturation_percent: f64,
    pub timeline: OccupancyTimeline,
}

/// A daily count flagged by its z-score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAnomaly {
    pub date: String,
    pub count: u32,
    pub z: f64,
}

/// Every view of the dashboard, computed from one filter pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitReport {
    pub criteria: FilterCriteria,
    /// First and last date in the filtered set.
    pub date_bounds: Option<(String, String)>,
    pub snapshot: VisitSnapshot,
    pub daily: Vec<DailyAggregate>,
    pub daily_rolling_average: Vec<Option<f64>>,
    pub daily_z_scores: Vec<f64>,
    pub anomalies: Vec<DailyAnomaly>,
    pub hourly: Vec<HourlyAggregate>,
    pub half_hour: HalfHourTable,
    pub weekday: Vec<WeekdayCount>,
    /// Daily counts grouped by weekday, Sunday first.
    pub weekday_distribution: [Vec<u32>; 7],
    pub heatmap: Heatmap,
    pub hotspots: Vec<Hotspot>,
    pub inter_arrival_minutes: Vec<u64>,
    pub pareto: ParetoRanking<DateHour>,
    pub occupancy: OccupancyView,
}

/// Filter `records` and compute every aggregate and metric.
///
/// Fails only on invalid configuration or criteria; an empty filter result
/// produces a report of empty views and zero KPIs.
///
/// # Examples
///
/// ```
/// use visitlog::algorithms::build_report;
/// use visitlog::config::EngineConfig;
/// use visitlog::core::domain::{FilterCriteria, RawRecord};
/// use visitlog::preprocessing::RecordNormalizer;
///
/// let records = RecordNormalizer::default()
///     .normalize(&[
///         RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
///         RawRecord::new("2024-06-01", Some("09:40"), "Bambino"),
///         RawRecord::new("2024-06-02", Some("10:00"), "Adulto"),
///     ])
///     .records;
///
/// let report = build_report(&records, &FilterCriteria::default(), &EngineConfig::default())?;
/// assert_eq!(report.snapshot.total_visits, 3);
/// assert_eq!(report.snapshot.total_revenue, 8);
/// # Ok::<(), visitlog::error::VisitError>(())
/// ```
pub fn build_report(
    records: &[NormalizedRecord],
    criteria: &FilterCriteria,
    config: &EngineConfig,
) -> VisitResult<VisitReport> {
    config.validate()?;
    criteria.validate()?;

    let filtered = apply_filters(records, criteria)?;

    let daily = aggregate_daily(&filtered);
    let daily_counts: Vec<f64> = daily.iter().map(|d| f64::from(d.count)).collect();
    let daily_rolling_average = rolling_average(&daily_counts, criteria.rolling_window_size);
    let daily_z_scores = z_scores(&daily_counts);
    let anomalies = flag_anomalies(&daily_counts, config.view.anomaly_threshold)
        .into_iter()
        .map(|Anomaly { index, z, .. }| DailyAnomaly {
            date: daily[index].date.clone(),
            count: daily[index].count,
            z,
        })
        .collect();

    let heatmap = aggregate_heatmap(&filtered);
    let top = hotspots(&heatmap, config.view.top_hotspots);

    let gaps = inter_arrival_gaps(&filtered);
    let snapshot = compute_snapshot(&filtered, &daily, &gaps);

    let timeline = occupancy_timeline(
        &filtered,
        config.occupancy.dwell_minutes,
        config.occupancy.bucket_minutes,
    )?;
    let occupancy = OccupancyView {
        capacity: config.occupancy.capacity,
        saturation_percent: timeline.saturation(config.occupancy.capacity),
        timeline,
    };

    log::info!(
        "Report built: {} visits over {} days, peak occupancy {}",
        snapshot.total_visits,
        snapshot.active_days,
        occupancy.timeline.peak
    );

    Ok(VisitReport {
        criteria: criteria.clone(),
        date_bounds: date_bounds(&filtered),
        hourly: aggregate_hourly(&filtered, criteria.hour_range()?),
        half_hour: aggregate_half_hour(&filtered),
        weekday: aggregate_weekday(&filtered, WeekStart::Sunday),
        weekday_distribution: weekday_distribution(&daily),
        pareto: pareto_by_date_hour(&filtered),
        inter_arrival_minutes: gaps,
        hotspots: top,
        heatmap,
        snapshot,
        daily,
        daily_rolling_average,
        daily_z_scores,
        anomalies,
        occupancy,
    })
}
