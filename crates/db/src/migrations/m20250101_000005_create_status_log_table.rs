//! Create status log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(StatusLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StatusLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StatusLog::ComplaintId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(StatusLog::PreviousStatus).string_len(32))
                    .col(ColumnDef::new(StatusLog::NewStatus).string_len(32).not_null())
                    .col(ColumnDef::new(StatusLog::ActorId).string_len(32).not_null())
                    .col(ColumnDef::new(StatusLog::ActorRole).string_len(16).not_null())
                    .col(ColumnDef::new(StatusLog::ActorRank).integer().not_null())
                    .col(
                        ColumnDef::new(StatusLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_status_log_complaint")
                            .from(StatusLog::Table, StatusLog::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: (complaint_id, created_at) (for replaying a complaint's history)
        manager
            .create_index(
                Index::create()
                    .name("idx_status_log_complaint_created_at")
                    .table(StatusLog::Table)
                    .col(StatusLog::ComplaintId)
                    .col(StatusLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Index: (new_status, created_at) (for yearly final-status scans)
        manager
            .create_index(
                Index::create()
                    .name("idx_status_log_new_status_created_at")
                    .table(StatusLog::Table)
                    .col(StatusLog::NewStatus)
                    .col(StatusLog::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(StatusLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum StatusLog {
    Table,
    Id,
    ComplaintId,
    PreviousStatus,
    NewStatus,
    ActorId,
    ActorRole,
    ActorRank,
    CreatedAt,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
