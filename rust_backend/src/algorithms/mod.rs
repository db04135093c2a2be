//! Aggregation, statistics and reporting over normalized visit records.
//!
//! # Components
//!
//! - [`aggregation`]: Daily, hourly, half-hour, weekday and heatmap groupings
//! - [`metrics`]: Rolling averages, percentiles, z-scores, Pareto rankings and
//!   occupancy simulation
//! - [`analysis`]: KPI snapshot and the full dashboard report
//! - [`selection`]: Picking records closest to a target time for removal
//!
//! # Example
//!
//! ```
//! use visitlog::algorithms::{aggregate_daily, percentile};
//! use visitlog::core::domain::RawRecord;
//! use visitlog::preprocessing::RecordNormalizer;
//!
//! let records = RecordNormalizer::default()
//!     .normalize(&[
//!         RawRecord::new("2024-06-01", Some("09:15"), "Adulto"),
//!         RawRecord::new("2024-06-02", Some("10:00"), "Adulto"),
//!         RawRecord::new("2024-06-02", Some("10:20"), "Bambino"),
//!     ])
//!     .records;
//!
//! let counts: Vec<f64> = aggregate_daily(&records)
//!     .iter()
//!     .map(|d| f64::from(d.count))
//!     .collect();
//! assert_eq!(percentile(&counts, 95.0), 2.0);
//! ```

pub mod aggregation;
pub mod analysis;
pub mod metrics;
pub mod selection;

pub use aggregation::{
    aggregate_daily, aggregate_half_hour, aggregate_heatmap, aggregate_hourly, aggregate_weekday,
    hotspots, weekday_distribution, DailyAggregate, HalfHourRow, HalfHourTable, Heatmap, Hotspot,
    HourlyAggregate, WeekdayCount,
};
pub use analysis::{
    build_report, compute_snapshot, DailyAnomaly, OccupancyView, VisitReport, VisitSnapshot,
};
pub use metrics::{
    compute_stats, flag_anomalies, inter_arrival_gaps, occupancy_timeline, pareto_by_date_hour,
    pareto_ranking, percentile, rolling_average, z_scores, Anomaly, DateHour, DistributionStats,
    OccupancyPoint, OccupancyTimeline, ParetoEntry, ParetoRanking,
};
pub use selection::select_for_removal;
