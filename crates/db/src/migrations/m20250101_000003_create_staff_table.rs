//! Create staff table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Staff::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Staff::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Staff::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Staff::Email).string_len(256).not_null())
                    .col(ColumnDef::new(Staff::Department).string_len(120))
                    .col(ColumnDef::new(Staff::SchoolId).string_len(32))
                    .col(ColumnDef::new(Staff::Role).string_len(16).not_null())
                    .col(
                        ColumnDef::new(Staff::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_school")
                            .from(Staff::Table, Staff::SchoolId)
                            .to(School::Table, School::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Staff::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Staff {
    Table,
    Id,
    Name,
    Email,
    Department,
    SchoolId,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum School {
    Table,
    Id,
}
