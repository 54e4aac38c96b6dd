//! Business logic services.

pub mod analytics;
pub mod complaint;
pub mod notification;
pub mod penalty;
pub mod principal;
pub mod report_export;
pub mod status_policy;

pub use analytics::{AnalyticsService, DashboardSummary, MonthlyStats, StatusBreakdown};
pub use complaint::{
    AttachmentDownload, ComplaintOutcome, ComplaintService, CreateComplaintInput,
    EditComplaintInput, NewAttachment, UploadFailure, WitnessInput,
};
pub use notification::NotificationService;
pub use penalty::{PenaltyOutcome, apply_penalty, ensure_not_blocked};
pub use principal::{Principal, Role};
pub use status_policy::StatusPolicy;
