//! Repositories: the persistence operations used by the services.

mod attachment;
mod complaint;
mod notification;
mod school;
mod staff;
mod status_log;
mod student;

pub use attachment::AttachmentRepository;
pub use complaint::{
    ComplaintDetails, ComplaintFilter, ComplaintRepository, ComplaintWrite, PenaltyUpdate,
};
pub use notification::NotificationRepository;
pub use school::SchoolRepository;
pub use staff::StaffRepository;
pub use status_log::StatusLogRepository;
pub use student::StudentRepository;
