use crate::repositories::rental_repository::{Rental, RentalDatasets, SuccessiveRental};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;

pub const MAX_THRESHOLD_MINUTES: u32 = 720;

const DELAY_RANGES: [&str; 7] = [
    "Up to 30min late",
    "30min to 1h late",
    "1h to 1h30 late",
    "1h30 to 2h late",
    "2h to 2h30 late",
    "2h30 to 3h late",
    "Above 3h late",
];

const TIME_DELTA_BUCKETS: [&str; 7] = [
    "Up to 30min",
    "30min to 1h",
    "1h to 1h30",
    "1h30 to 2h",
    "2h to 2h30",
    "2h30 to 3h",
    "Above 3h",
];

const IMPACTED: &str = "Impacted";
const NOT_IMPACTED: &str = "Not impacted";
const CANCELED: &str = "canceled";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Connect,
    All,
}

impl Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Connect => write!(f, "connect"),
            Scope::All => write!(f, "all"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AnalyticsError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error("Threshold must be between 0 and 720 minutes, got {0}")]
    ThresholdOutOfRange(u32),
    #[error("No late rentals for scope {0}")]
    NoLateRentals(Scope),
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Share {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ImpactBreakdown {
    pub time_delta: String,
    pub impacted: usize,
    pub not_impacted: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DelayStatusSummary {
    pub states: Vec<Share>,
    pub canceled: usize,
}

/// Every figure the dashboard draws, computed from the loaded extracts.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DashboardReport {
    pub rentals: usize,
    pub cars: usize,
    pub checkin_types: Vec<Share>,
    pub mobile_states: Vec<Share>,
    pub connect_states: Vec<Share>,
    pub checkout_timing: Vec<Share>,
    pub delay_ranges: Vec<Bucket>,
    pub median_delay_minutes: Option<f64>,
    pub median_connect_delay_minutes: Option<f64>,
    pub successive_rentals: usize,
    pub successive_percentage: f64,
    pub rental_types: Vec<Share>,
    pub time_deltas: Vec<Bucket>,
    pub impact_by_time_delta: Vec<ImpactBreakdown>,
    pub impacted_rentals: usize,
    pub impacted_successive_percentage: f64,
    pub impacted_all_percentage: f64,
    pub impacted: DelayStatusSummary,
    pub not_impacted: DelayStatusSummary,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResolvedRentals {
    pub threshold: u32,
    pub scope: Scope,
    pub percentage: f64,
    pub message: String,
}

pub struct DelayAnalytics {
    datasets: RentalDatasets,
}

pub type DelayAnalyticsState = Arc<DelayAnalytics>;

impl DelayAnalytics {
    pub fn new(datasets: RentalDatasets) -> Self {
        Self { datasets }
    }

    /// Share of late rentals (positive checkout delay) that a minimum gap of
    /// `threshold` minutes between two rentals would have absorbed.
    pub fn resolved_rentals(&self, threshold: u32, scope: Scope) -> Result<f64, AnalyticsError> {
        if threshold > MAX_THRESHOLD_MINUTES {
            return Err(AnalyticsError::ThresholdOutOfRange(threshold));
        }

        let late: Vec<f64> = self
            .datasets
            .rentals
            .iter()
            .filter(|rental| scope == Scope::All || rental.checkin_type == "connect")
            .filter_map(|rental| rental.delay_at_checkout_in_minutes)
            .filter(|delay| *delay > 0.0)
            .collect();

        if late.is_empty() {
            return Err(AnalyticsError::NoLateRentals(scope));
        }

        let solved = late
            .iter()
            .filter(|delay| **delay <= f64::from(threshold))
            .count();
        Ok(percentage(solved, late.len()))
    }

    pub fn simulate(&self, threshold: u32, scope: Scope) -> Result<ResolvedRentals, AnalyticsError> {
        let percentage = self.resolved_rentals(threshold, scope)?;
        Ok(ResolvedRentals {
            threshold,
            scope,
            percentage,
            message: format!(
                "If a {}-minute threshold is set, {:?}% of {} problematic rentals will be solved",
                threshold, percentage, scope
            ),
        })
    }

    pub fn report(&self) -> DashboardReport {
        let rentals = &self.datasets.rentals;
        let successive = &self.datasets.successive;
        let rental_count = rentals.len();
        let successive_count = self.datasets.successive_count;

        let late: Vec<&Rental> = rentals
            .iter()
            .filter(|r| r.delay_range != "On time" && r.delay_range != "Unknown")
            .collect();

        let impacted: Vec<&SuccessiveRental> = successive
            .iter()
            .filter(|s| s.delay_status == IMPACTED)
            .collect();
        let not_impacted: Vec<&SuccessiveRental> = successive
            .iter()
            .filter(|s| s.delay_status == NOT_IMPACTED)
            .collect();

        DashboardReport {
            rentals: rental_count,
            cars: rentals
                .iter()
                .map(|r| r.car_id.as_str())
                .collect::<HashSet<_>>()
                .len(),
            checkin_types: distribution(rentals.iter().map(|r| r.checkin_type.as_str())),
            mobile_states: distribution(
                rentals
                    .iter()
                    .filter(|r| r.checkin_type == "mobile")
                    .map(|r| r.state.as_str()),
            ),
            connect_states: distribution(
                rentals
                    .iter()
                    .filter(|r| r.checkin_type == "connect")
                    .map(|r| r.state.as_str()),
            ),
            checkout_timing: distribution(rentals.iter().map(|r| r.delay.as_str())),
            delay_ranges: ordered_counts(&DELAY_RANGES, late.iter().map(|r| r.delay_range.as_str())),
            median_delay_minutes: median(late.iter().filter_map(|r| r.delay_at_checkout_in_minutes)),
            median_connect_delay_minutes: median(
                late.iter()
                    .filter(|r| r.checkin_type == "connect")
                    .filter_map(|r| r.delay_at_checkout_in_minutes),
            ),
            successive_rentals: successive_count,
            successive_percentage: percentage(successive_count, rental_count),
            rental_types: shares(vec![
                (
                    "Unique".to_string(),
                    rental_count.saturating_sub(successive_count),
                ),
                ("Successive".to_string(), successive_count),
            ]),
            time_deltas: ordered_counts(
                &TIME_DELTA_BUCKETS,
                successive.iter().map(|s| s.time_delta_bucket.as_str()),
            ),
            impact_by_time_delta: TIME_DELTA_BUCKETS
                .iter()
                .map(|bucket| {
                    let in_bucket = || successive.iter().filter(|s| s.time_delta_bucket == *bucket);
                    ImpactBreakdown {
                        time_delta: bucket.to_string(),
                        impacted: in_bucket().filter(|s| s.delay_status == IMPACTED).count(),
                        not_impacted: in_bucket()
                            .filter(|s| s.delay_status == NOT_IMPACTED)
                            .count(),
                    }
                })
                .collect(),
            impacted_rentals: impacted.len(),
            impacted_successive_percentage: percentage(impacted.len(), successive_count),
            impacted_all_percentage: percentage(impacted.len(), rental_count),
            impacted: status_summary(&impacted),
            not_impacted: status_summary(&not_impacted),
        }
    }
}

fn status_summary(rows: &[&SuccessiveRental]) -> DelayStatusSummary {
    DelayStatusSummary {
        states: distribution(rows.iter().map(|s| s.state.as_str())),
        canceled: rows.iter().filter(|s| s.state == CANCELED).count(),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `part / whole` as a percentage rounded to two decimals; 0 when `whole` is 0.
fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    round2(part as f64 * 100.0 / whole as f64)
}

/// Value counts, most frequent first (ties broken by label).
fn distribution<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Share> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_default() += 1;
    }
    let mut pairs: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(label, count)| (label.to_string(), count))
        .collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    shares(pairs)
}

fn shares(pairs: Vec<(String, usize)>) -> Vec<Share> {
    let total: usize = pairs.iter().map(|(_, count)| count).sum();
    pairs
        .into_iter()
        .map(|(label, count)| Share {
            label,
            count,
            percentage: percentage(count, total),
        })
        .collect()
}

fn ordered_counts<'a>(order: &[&str], labels: impl Iterator<Item = &'a str>) -> Vec<Bucket> {
    let mut counts = vec![0usize; order.len()];
    for label in labels {
        if let Some(index) = order.iter().position(|o| *o == label) {
            counts[index] += 1;
        }
    }
    order
        .iter()
        .zip(counts)
        .map(|(label, count)| Bucket {
            label: label.to_string(),
            count,
        })
        .collect()
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.filter(|v| !v.is_nan()).collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
