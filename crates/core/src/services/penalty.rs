//! False-report penalty rules.

use farol_common::{AppError, AppResult};
use farol_db::entities::student;

/// Counter and block state after one more false report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PenaltyOutcome {
    /// Counter including this report.
    pub false_report_count: i32,
    /// The student can no longer file complaints.
    pub blocked: bool,
    /// The block was set by this report.
    pub newly_blocked: bool,
}

impl PenaltyOutcome {
    /// Reports left before the student is blocked.
    #[must_use]
    pub const fn remaining(&self, threshold: i32) -> i32 {
        let left = threshold - self.false_report_count;
        if left < 0 { 0 } else { left }
    }
}

/// Record one more false report against a student.
///
/// The counter only grows and a block is never lifted here.
#[must_use]
pub const fn apply_penalty(count: i32, blocked: bool, threshold: i32) -> PenaltyOutcome {
    let false_report_count = count.saturating_add(1);
    let now_blocked = blocked || false_report_count >= threshold;
    PenaltyOutcome {
        false_report_count,
        blocked: now_blocked,
        newly_blocked: now_blocked && !blocked,
    }
}

/// Blocked students cannot file or edit complaints.
pub fn ensure_not_blocked(student: &student::Model) -> AppResult<()> {
    if student.is_blocked {
        return Err(AppError::Forbidden(
            "Your account is blocked from filing complaints after repeated false reports"
                .to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_on_threshold() {
        let first = apply_penalty(0, false, 3);
        assert_eq!(first.false_report_count, 1);
        assert!(!first.blocked);
        assert_eq!(first.remaining(3), 2);

        let second = apply_penalty(first.false_report_count, first.blocked, 3);
        assert!(!second.blocked);

        let third = apply_penalty(second.false_report_count, second.blocked, 3);
        assert_eq!(third.false_report_count, 3);
        assert!(third.blocked);
        assert!(third.newly_blocked);
        assert_eq!(third.remaining(3), 0);
    }

    #[test]
    fn test_block_is_sticky() {
        let outcome = apply_penalty(7, true, 3);
        assert!(outcome.blocked);
        assert!(!outcome.newly_blocked);
        assert_eq!(outcome.false_report_count, 8);
    }

    #[test]
    fn test_existing_block_below_threshold_stays() {
        let outcome = apply_penalty(0, true, 3);
        assert!(outcome.blocked);
        assert!(!outcome.newly_blocked);
    }
}
