//! Resolution analytics.
//!
//! Everything here is read-only. Durations come from replaying each
//! complaint's status log: the clock starts at the first entry into the
//! investigation-start status (or the first entry at all) and stops at the
//! last entry into a final status.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use farol_common::{AppError, AppResult};
use farol_db::{
    entities::{complaint, complaint::ComplaintStatus, status_log},
    repositories::{ComplaintRepository, StatusLogRepository},
};
use serde::Serialize;

use crate::services::status_policy::StatusPolicy;

/// Months per statistics year.
pub const MONTHS: usize = 12;

/// Per-month figures for one calendar year. Index 0 is January.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Calendar year the series covers.
    pub year: i32,
    /// Complaints filed in each month.
    pub created: [u32; MONTHS],
    /// Complaints still in a final status, bucketed by their last final
    /// transition.
    pub resolved: [u32; MONTHS],
    /// Complaints still flagged false, bucketed by their last rejection.
    pub false_reports: [u32; MONTHS],
    /// Mean resolution hours of every complaint with a final transition in
    /// the month, rounded to two decimals. `0.0` for empty months.
    pub mean_hours: [f64; MONTHS],
}

/// Current status counts grouped the way the dashboard charts them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    /// Open complaints.
    pub pending: u64,
    /// Active complaints past the open stage.
    pub in_progress: u64,
    /// In a final status.
    pub resolved: u64,
    /// Everything else, rejected-false included.
    pub other: u64,
}

/// Dashboard headline numbers plus the monthly series.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Every complaint on record.
    pub total: u64,
    /// Complaints still open.
    pub pending: u64,
    /// Complaints filed since the start of the current month.
    pub created_this_month: u64,
    /// Current status counts.
    pub breakdown: StatusBreakdown,
    /// Overall mean resolution time, `None` when nothing was ever resolved.
    pub mean_resolution_hours: Option<f64>,
    /// [`format_duration`] rendering of `mean_resolution_hours`.
    pub mean_resolution_display: String,
    /// Series for the requested year.
    pub monthly: MonthlyStats,
}

// ========== Replay ==========

/// Time from investigation start to closure for one complaint.
///
/// `log` must hold a single complaint's entries in chronological order.
/// Returns `None` when a marker is missing or the span is not positive.
#[must_use]
pub fn resolution_duration(log: &[status_log::Model], policy: &StatusPolicy) -> Option<Duration> {
    let start = log
        .iter()
        .find(|e| e.new_status == policy.investigation_start())
        .or_else(|| log.first())?;
    let end = log.iter().rev().find(|e| policy.is_final(e.new_status))?;

    let span = end.created_at.signed_duration_since(start.created_at);
    (span > Duration::zero()).then_some(span)
}

/// Split log entries per complaint, each group in chronological order.
#[must_use]
pub fn group_by_complaint(
    entries: Vec<status_log::Model>,
) -> HashMap<String, Vec<status_log::Model>> {
    let mut grouped: HashMap<String, Vec<status_log::Model>> = HashMap::new();
    for entry in entries {
        grouped.entry(entry.complaint_id.clone()).or_default().push(entry);
    }
    for log in grouped.values_mut() {
        log.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
    }
    grouped
}

#[allow(clippy::cast_precision_loss)]
fn hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

/// Mean of the durations in hours, `None` when there are none.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean_hours<I: IntoIterator<Item = Duration>>(durations: I) -> Option<f64> {
    let (sum, count) = durations
        .into_iter()
        .fold((0.0, 0_usize), |(sum, n), d| (sum + hours(d), n + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Render a mean duration for display: `N/A`, `M min`, `0 hours`, or
/// `D day(s) and H hour(s)`.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn format_duration(mean_hours: Option<f64>) -> String {
    let Some(hours) = mean_hours.filter(|h| h.is_finite() && *h > 0.0) else {
        return "N/A".to_string();
    };

    let total_minutes = (hours * 60.0).floor() as i64;
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;

    if days == 0 && hours == 0 {
        return if minutes > 0 {
            format!("{minutes} min")
        } else {
            "0 hours".to_string()
        };
    }

    let mut parts = Vec::with_capacity(2);
    if days > 0 {
        parts.push(format!("{days} day{}", if days > 1 { "s" } else { "" }));
    }
    if hours > 0 {
        parts.push(format!("{hours} hour{}", if hours > 1 { "s" } else { "" }));
    }
    parts.join(" and ")
}

// ========== Monthly series ==========

fn month_index<Tz: TimeZone>(at: &DateTime<Tz>) -> usize {
    at.with_timezone(&Utc).month0() as usize
}

/// Complaints per month of creation, counting only `year`.
#[must_use]
pub fn monthly_created(complaints: &[complaint::Model], year: i32) -> [u32; MONTHS] {
    let mut months = [0; MONTHS];
    for complaint in complaints {
        let created = complaint.created_at.with_timezone(&Utc);
        if created.year() == year {
            months[created.month0() as usize] += 1;
        }
    }
    months
}

/// Count each complaint once, in the month of its latest transition among
/// `transitions`, and only if `still_current` holds for it.
///
/// A complaint resolved, reopened and resolved again counts once, in the
/// month of the last resolution, and not at all if it is open again now.
#[must_use]
pub fn monthly_latest<F>(transitions: &[status_log::Model], still_current: F) -> [u32; MONTHS]
where
    F: Fn(&str) -> bool,
{
    let mut latest: HashMap<&str, &status_log::Model> = HashMap::new();
    for entry in transitions {
        latest
            .entry(entry.complaint_id.as_str())
            .and_modify(|current| {
                if entry.created_at >= current.created_at {
                    *current = entry;
                }
            })
            .or_insert(entry);
    }

    let mut months = [0; MONTHS];
    for (complaint_id, entry) in latest {
        if still_current(complaint_id) {
            months[month_index(&entry.created_at)] += 1;
        }
    }
    months
}

/// Mean resolution hours of the complaints closed in each month.
///
/// A complaint is attributed to every month in which one of
/// `final_transitions` happened; its duration uses its whole log from `logs`.
/// Months without a measurable duration are zero.
#[must_use]
pub fn monthly_mean_hours(
    final_transitions: &[status_log::Model],
    logs: &HashMap<String, Vec<status_log::Model>>,
    policy: &StatusPolicy,
) -> [f64; MONTHS] {
    let mut closed_in_month: [BTreeSet<&str>; MONTHS] = Default::default();
    for entry in final_transitions {
        closed_in_month[month_index(&entry.created_at)].insert(entry.complaint_id.as_str());
    }

    let mut result = [0.0; MONTHS];
    for (month, ids) in closed_in_month.iter().enumerate() {
        let durations = ids
            .iter()
            .filter_map(|id| logs.get(*id))
            .filter_map(|log| resolution_duration(log, policy));
        result[month] = mean_hours(durations).map_or(0.0, round2);
    }
    result
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn year_bounds(year: i32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let start = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single();
    let end = year
        .checked_add(1)
        .and_then(|next| Utc.with_ymd_and_hms(next, 1, 1, 0, 0, 0).single());
    match (start, end) {
        (Some(start), Some(end)) if (1970..=9999).contains(&year) => Ok((start, end)),
        _ => Err(AppError::BadRequest(format!("Invalid year: {year}"))),
    }
}

fn month_bounds(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc
        .with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    let (year, month) = if now.month() == 12 {
        (now.year() + 1, 1)
    } else {
        (now.year(), now.month() + 1)
    };
    let end = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .unwrap_or(now);
    (start, end)
}

// ========== Service ==========

/// Analytics service.
#[derive(Clone)]
pub struct AnalyticsService {
    complaint_repo: ComplaintRepository,
    status_log_repo: StatusLogRepository,
    policy: std::sync::Arc<StatusPolicy>,
}

impl AnalyticsService {
    /// Create a new analytics service.
    #[must_use]
    pub const fn new(
        complaint_repo: ComplaintRepository,
        status_log_repo: StatusLogRepository,
        policy: std::sync::Arc<StatusPolicy>,
    ) -> Self {
        Self {
            complaint_repo,
            status_log_repo,
            policy,
        }
    }

    /// Monthly created / resolved / false-report counts and mean hours.
    pub async fn monthly_stats(&self, year: i32) -> AppResult<MonthlyStats> {
        let (start, end) = year_bounds(year)?;

        let created = self.complaint_repo.find_created_between(start, end).await?;
        let final_transitions = self
            .status_log_repo
            .find_transitions_between(self.policy.final_statuses(), start, end)
            .await?;
        let false_transitions = self
            .status_log_repo
            .find_transitions_between(&[ComplaintStatus::RejectedFalse], start, end)
            .await?;

        let ids: Vec<String> = final_transitions
            .iter()
            .chain(false_transitions.iter())
            .map(|e| e.complaint_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let current: HashMap<String, complaint::Model> = self
            .complaint_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let resolved = monthly_latest(&final_transitions, |id| {
            current.get(id).is_some_and(|c| self.policy.is_final(c.status))
        });
        let false_reports = monthly_latest(&false_transitions, |id| {
            current.get(id).is_some_and(|c| c.is_false)
        });

        let closed_ids: Vec<String> = final_transitions
            .iter()
            .map(|e| e.complaint_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let logs = group_by_complaint(self.status_log_repo.find_by_complaints(&closed_ids).await?);
        let mean_hours = monthly_mean_hours(&final_transitions, &logs, &self.policy);

        Ok(MonthlyStats {
            year,
            created: monthly_created(&created, year),
            resolved,
            false_reports,
            mean_hours,
        })
    }

    /// Mean resolution hours over every complaint that ever reached a final
    /// status, including ones reopened since.
    pub async fn overall_mean_hours(&self) -> AppResult<Option<f64>> {
        let ids = self
            .status_log_repo
            .find_complaint_ids_reaching(self.policy.final_statuses())
            .await?;
        let logs = group_by_complaint(self.status_log_repo.find_by_complaints(&ids).await?);

        Ok(mean_hours(
            logs.values()
                .filter_map(|log| resolution_duration(log, &self.policy)),
        )
        .map(round2))
    }

    /// Dashboard numbers for `year`, with "this month" taken from `now`.
    pub async fn dashboard(&self, year: i32, now: DateTime<Utc>) -> AppResult<DashboardSummary> {
        let monthly = self.monthly_stats(year).await?;

        let total = self.complaint_repo.count_all().await?;
        let (month_start, month_end) = month_bounds(now);
        let created_this_month = self
            .complaint_repo
            .count_created_between(month_start, month_end)
            .await?;

        let mut breakdown = StatusBreakdown::default();
        for (status, count) in self.complaint_repo.count_by_status().await? {
            if status == ComplaintStatus::Open {
                breakdown.pending += count;
            } else if self.policy.is_final(status) {
                breakdown.resolved += count;
            } else if self.policy.is_active(status) {
                breakdown.in_progress += count;
            }
        }
        breakdown.other =
            total.saturating_sub(breakdown.pending + breakdown.in_progress + breakdown.resolved);

        let mean = self.overall_mean_hours().await?;

        Ok(DashboardSummary {
            total,
            pending: breakdown.pending,
            created_this_month,
            breakdown,
            mean_resolution_hours: mean,
            mean_resolution_display: format_duration(mean),
            monthly,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use farol_db::entities::staff::Role;

    fn at(month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, month, day, hour, 0, 0).unwrap()
    }

    fn entry(complaint_id: &str, n: u32, status: ComplaintStatus, when: DateTime<Utc>) -> status_log::Model {
        status_log::Model {
            id: format!("{complaint_id}-{n}"),
            complaint_id: complaint_id.to_string(),
            previous_status: None,
            new_status: status,
            actor_id: "staff".to_string(),
            actor_role: Role::Staff,
            actor_rank: 2,
            created_at: when.into(),
        }
    }

    #[test]
    fn test_duration_starts_at_investigation() {
        let policy = StatusPolicy::default();
        let log = vec![
            entry("c1", 0, ComplaintStatus::Open, at(3, 1, 0)),
            entry("c1", 1, ComplaintStatus::UnderInvestigation, at(3, 1, 10)),
            entry("c1", 2, ComplaintStatus::Resolved, at(3, 2, 10)),
        ];
        assert_eq!(resolution_duration(&log, &policy), Some(Duration::hours(24)));
    }

    #[test]
    fn test_duration_falls_back_to_first_entry() {
        let policy = StatusPolicy::default();
        let log = vec![
            entry("c1", 0, ComplaintStatus::Open, at(3, 1, 0)),
            entry("c1", 1, ComplaintStatus::Resolved, at(3, 1, 5)),
        ];
        assert_eq!(resolution_duration(&log, &policy), Some(Duration::hours(5)));
    }

    #[test]
    fn test_duration_uses_last_final_entry() {
        let policy = StatusPolicy::default();
        let log = vec![
            entry("c1", 0, ComplaintStatus::Open, at(3, 1, 0)),
            entry("c1", 1, ComplaintStatus::Resolved, at(3, 1, 2)),
            entry("c1", 2, ComplaintStatus::UnderInvestigation, at(3, 1, 4)),
            entry("c1", 3, ComplaintStatus::Closed, at(3, 1, 9)),
        ];
        assert_eq!(resolution_duration(&log, &policy), Some(Duration::hours(5)));
    }

    #[test]
    fn test_duration_discards_missing_or_non_positive() {
        let policy = StatusPolicy::default();
        assert_eq!(resolution_duration(&[], &policy), None);

        let open_only = vec![entry("c1", 0, ComplaintStatus::Open, at(3, 1, 0))];
        assert_eq!(resolution_duration(&open_only, &policy), None);

        let backwards = vec![
            entry("c1", 0, ComplaintStatus::Resolved, at(3, 1, 0)),
            entry("c1", 1, ComplaintStatus::UnderInvestigation, at(3, 1, 5)),
        ];
        assert_eq!(resolution_duration(&backwards, &policy), None);
    }

    #[test]
    fn test_monthly_latest_counts_reopened_once() {
        let transitions = vec![
            entry("c1", 1, ComplaintStatus::Resolved, at(2, 10, 0)),
            entry("c1", 3, ComplaintStatus::Resolved, at(5, 10, 0)),
            entry("c2", 1, ComplaintStatus::Closed, at(2, 11, 0)),
        ];

        let months = monthly_latest(&transitions, |_| true);
        assert_eq!(months[1], 1);
        assert_eq!(months[4], 1);
        assert_eq!(months.iter().sum::<u32>(), 2);

        let only_c2 = monthly_latest(&transitions, |id| id == "c2");
        assert_eq!(only_c2[1], 1);
        assert_eq!(only_c2.iter().sum::<u32>(), 1);
    }

    #[test]
    fn test_monthly_mean_hours() {
        let policy = StatusPolicy::default();
        let entries = vec![
            entry("c1", 0, ComplaintStatus::Open, at(4, 1, 0)),
            entry("c1", 1, ComplaintStatus::UnderInvestigation, at(4, 1, 2)),
            entry("c1", 2, ComplaintStatus::Resolved, at(4, 1, 12)),
            entry("c2", 0, ComplaintStatus::Open, at(4, 2, 0)),
            entry("c2", 1, ComplaintStatus::Closed, at(4, 2, 20)),
        ];
        let finals: Vec<_> = entries
            .iter()
            .filter(|e| policy.is_final(e.new_status))
            .cloned()
            .collect();
        let logs = group_by_complaint(entries);

        let months = monthly_mean_hours(&finals, &logs, &policy);
        assert!((months[3] - 15.0).abs() < f64::EPSILON);
        assert!(months[0].abs() < f64::EPSILON);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(None), "N/A");
        assert_eq!(format_duration(Some(0.0)), "N/A");
        assert_eq!(format_duration(Some(0.5)), "30 min");
        assert_eq!(format_duration(Some(0.001)), "0 hours");
        assert_eq!(format_duration(Some(1.0)), "1 hour");
        assert_eq!(format_duration(Some(24.0)), "1 day");
        assert_eq!(format_duration(Some(53.0)), "2 days and 5 hours");
        assert_eq!(format_duration(Some(25.0)), "1 day and 1 hour");
    }

    #[test]
    fn test_mean_hours() {
        assert_eq!(mean_hours(Vec::<Duration>::new()), None);
        assert_eq!(
            mean_hours(vec![Duration::hours(2), Duration::hours(4)]),
            Some(3.0)
        );
    }

    #[test]
    fn test_year_bounds() {
        let (start, end) = year_bounds(2025).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        assert!(matches!(year_bounds(0), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_month_bounds_wraps_december() {
        let (start, end) = month_bounds(Utc.with_ymd_and_hms(2025, 12, 15, 8, 0, 0).unwrap());
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
    }
}
