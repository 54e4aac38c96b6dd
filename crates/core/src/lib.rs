//! Core business logic for farol: the complaint lifecycle, false-report
//! penalties, notifications and resolution analytics.

pub mod services;

pub use services::*;
