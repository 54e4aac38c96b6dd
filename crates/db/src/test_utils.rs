//! Test utilities for database operations.
//!
//! Tests run against a migrated database, by default an in-memory SQLite
//! instance. Set `FAROL_TEST_DATABASE_URL` to point them at another server.
//! The SQLite driver is only compiled in with the `test-utils` feature.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ConnectOptions, Database, DatabaseConnection, DbErr, Set,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{
    complaint::{self, ComplaintStatus},
    school,
    staff::{self, Role},
    status_log, student,
};
use crate::migrations::Migrator;

const DEFAULT_TEST_URL: &str = "sqlite::memory:";

/// Connection URL used by [`TestDatabase::new`].
#[must_use]
pub fn test_database_url() -> String {
    std::env::var("FAROL_TEST_DATABASE_URL").unwrap_or_else(|_| DEFAULT_TEST_URL.to_string())
}

/// A migrated test database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
    seq: std::sync::atomic::AtomicU32,
}

impl TestDatabase {
    /// Connect to [`test_database_url`] and run all migrations.
    pub async fn new() -> Result<Self, DbErr> {
        Self::with_url(&test_database_url()).await
    }

    /// Connect to `url` and run all migrations.
    pub async fn with_url(url: &str) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(url);
        // An in-memory SQLite database lives and dies with its connection.
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!(url = %url, "Connected to test database");

        Ok(Self {
            conn: Arc::new(conn),
            seq: std::sync::atomic::AtomicU32::new(0),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }

    fn next_id(&self, prefix: &str) -> String {
        let n = self.seq.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{prefix}{n:04}")
    }

    /// Insert a school.
    pub async fn seed_school(&self, name: &str) -> Result<school::Model, DbErr> {
        school::ActiveModel {
            id: Set(self.next_id("school")),
            name: Set(name.to_string()),
            city: Set(None),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Insert a student attending `school_id`.
    pub async fn seed_student(&self, school_id: &str, name: &str) -> Result<student::Model, DbErr> {
        let id = self.next_id("student");
        student::ActiveModel {
            email: Set(format!("{id}@students.test")),
            id: Set(id),
            name: Set(name.to_string()),
            phone: Set(None),
            school_id: Set(Some(school_id.to_string())),
            false_report_count: Set(0),
            is_blocked: Set(false),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Insert a staff member with `role`.
    pub async fn seed_staff(&self, school_id: &str, role: Role) -> Result<staff::Model, DbErr> {
        let id = self.next_id("staff");
        staff::ActiveModel {
            email: Set(format!("{id}@staff.test")),
            name: Set(format!("Staff {id}")),
            id: Set(id),
            department: Set(None),
            school_id: Set(Some(school_id.to_string())),
            role: Set(role),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Insert a complaint row directly, bypassing the lifecycle.
    pub async fn seed_complaint(
        &self,
        school_id: &str,
        student_id: Option<&str>,
        status: ComplaintStatus,
        created_at: DateTime<Utc>,
    ) -> Result<complaint::Model, DbErr> {
        let created_at: DateTime<FixedOffset> = created_at.into();
        complaint::ActiveModel {
            id: Set(self.next_id("complaint")),
            title: Set("Broken lockers".to_string()),
            description: Set("Lockers on the second floor were forced open".to_string()),
            category: Set("infrastructure".to_string()),
            status: Set(status),
            is_anonymous: Set(false),
            is_false: Set(status == ComplaintStatus::RejectedFalse),
            student_id: Set(student_id.map(str::to_string)),
            school_id: Set(school_id.to_string()),
            version: Set(0),
            created_at: Set(created_at),
            updated_at: Set(created_at),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Append a status log entry at a fixed time.
    pub async fn seed_transition(
        &self,
        complaint_id: &str,
        previous_status: Option<ComplaintStatus>,
        new_status: ComplaintStatus,
        at: DateTime<Utc>,
    ) -> Result<status_log::Model, DbErr> {
        status_log::ActiveModel {
            id: Set(self.next_id("log")),
            complaint_id: Set(complaint_id.to_string()),
            previous_status: Set(previous_status),
            new_status: Set(new_status),
            actor_id: Set("seed".to_string()),
            actor_role: Set(Role::Admin),
            actor_rank: Set(Role::Admin.rank()),
            created_at: Set(at.into()),
        }
        .insert(self.conn.as_ref())
        .await
    }
}
