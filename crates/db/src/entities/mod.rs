//! Database entities.

pub mod attachment;
pub mod complaint;
pub mod complaint_witness;
pub mod notification;
pub mod response;
pub mod school;
pub mod staff;
pub mod status_log;
pub mod student;
pub mod witness;

pub use attachment::Entity as Attachment;
pub use complaint::Entity as Complaint;
pub use complaint_witness::Entity as ComplaintWitness;
pub use notification::Entity as Notification;
pub use response::Entity as Response;
pub use school::Entity as School;
pub use staff::Entity as Staff;
pub use status_log::Entity as StatusLog;
pub use student::Entity as Student;
pub use witness::Entity as Witness;
