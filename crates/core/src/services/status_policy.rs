//! Status classification table.
//!
//! Maps every [`ComplaintStatus`] to its display label and to the
//! final / investigation-start classification used by the lifecycle and
//! by the analytics replay.

use std::collections::HashMap;

use farol_common::{AppError, AppResult, LifecycleConfig};
use farol_db::entities::complaint::ComplaintStatus;
use sea_orm::Iterable;

/// Resolved lifecycle configuration.
#[derive(Debug, Clone)]
pub struct StatusPolicy {
    investigation_start: ComplaintStatus,
    final_statuses: Vec<ComplaintStatus>,
    false_report_threshold: i32,
    labels: HashMap<ComplaintStatus, String>,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            investigation_start: ComplaintStatus::UnderInvestigation,
            final_statuses: vec![ComplaintStatus::Resolved, ComplaintStatus::Closed],
            false_report_threshold: 3,
            labels: ComplaintStatus::iter()
                .map(|status| (status, default_label(status).to_string()))
                .collect(),
        }
    }
}

impl StatusPolicy {
    /// Build the policy from the `lifecycle` configuration section.
    pub fn from_config(config: &LifecycleConfig) -> AppResult<Self> {
        let investigation_start = parse_status(&config.investigation_start)?;
        let final_statuses = config
            .final_statuses
            .iter()
            .map(|s| parse_status(s))
            .collect::<AppResult<Vec<_>>>()?;

        if final_statuses.is_empty() {
            return Err(AppError::Config(
                "lifecycle.final_statuses must not be empty".to_string(),
            ));
        }
        if final_statuses
            .iter()
            .any(|s| matches!(s, ComplaintStatus::Open | ComplaintStatus::RejectedFalse))
        {
            return Err(AppError::Config(
                "lifecycle.final_statuses may not contain open or rejected_false".to_string(),
            ));
        }
        if final_statuses.contains(&investigation_start) {
            return Err(AppError::Config(
                "lifecycle.investigation_start cannot be a final status".to_string(),
            ));
        }
        if config.false_report_threshold < 1 {
            return Err(AppError::Config(
                "lifecycle.false_report_threshold must be at least 1".to_string(),
            ));
        }

        let mut labels: HashMap<ComplaintStatus, String> = ComplaintStatus::iter()
            .map(|status| (status, default_label(status).to_string()))
            .collect();
        for (key, label) in &config.labels {
            labels.insert(parse_status(key)?, label.clone());
        }

        Ok(Self {
            investigation_start,
            final_statuses,
            false_report_threshold: config.false_report_threshold,
            labels,
        })
    }

    /// Status whose first log entry marks the start of an investigation.
    #[must_use]
    pub const fn investigation_start(&self) -> ComplaintStatus {
        self.investigation_start
    }

    /// Statuses that count as case closure.
    #[must_use]
    pub fn final_statuses(&self) -> &[ComplaintStatus] {
        &self.final_statuses
    }

    /// Whether `status` closes a case.
    #[must_use]
    pub fn is_final(&self, status: ComplaintStatus) -> bool {
        self.final_statuses.contains(&status)
    }

    /// Number of false reports that blocks a student.
    #[must_use]
    pub const fn false_report_threshold(&self) -> i32 {
        self.false_report_threshold
    }

    /// Display label of a status.
    #[must_use]
    pub fn label(&self, status: ComplaintStatus) -> &str {
        self.labels
            .get(&status)
            .map_or_else(|| default_label(status), String::as_str)
    }

    /// Complaints can only be edited while nobody has acted on them.
    #[must_use]
    pub const fn is_editable(status: ComplaintStatus) -> bool {
        matches!(status, ComplaintStatus::Open)
    }

    /// Whether staff may still act on a complaint in `status`.
    #[must_use]
    pub fn is_active(&self, status: ComplaintStatus) -> bool {
        status != ComplaintStatus::RejectedFalse && !self.is_final(status)
    }
}

fn parse_status(value: &str) -> AppResult<ComplaintStatus> {
    value.parse().map_err(AppError::Config)
}

const fn default_label(status: ComplaintStatus) -> &'static str {
    match status {
        ComplaintStatus::Open => "Open",
        ComplaintStatus::UnderInvestigation => "Under investigation",
        ComplaintStatus::Answered => "Answered",
        ComplaintStatus::Resolved => "Resolved",
        ComplaintStatus::Closed => "Closed",
        ComplaintStatus::RejectedFalse => "Rejected (false report)",
    }
}
