//! Database migrations.
//!
//! Schema migrations for the database.

#![allow(missing_docs)]

use sea_orm_migration::prelude::*;

mod m20250101_000001_create_school_table;
mod m20250101_000002_create_student_table;
mod m20250101_000003_create_staff_table;
mod m20250101_000004_create_complaint_table;
mod m20250101_000005_create_status_log_table;
mod m20250101_000006_create_notification_table;
mod m20250101_000007_create_attachment_table;
mod m20250101_000008_create_witness_tables;
mod m20250101_000009_create_response_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_school_table::Migration),
            Box::new(m20250101_000002_create_student_table::Migration),
            Box::new(m20250101_000003_create_staff_table::Migration),
            Box::new(m20250101_000004_create_complaint_table::Migration),
            Box::new(m20250101_000005_create_status_log_table::Migration),
            Box::new(m20250101_000006_create_notification_table::Migration),
            Box::new(m20250101_000007_create_attachment_table::Migration),
            Box::new(m20250101_000008_create_witness_tables::Migration),
            Box::new(m20250101_000009_create_response_table::Migration),
        ]
    }
}
