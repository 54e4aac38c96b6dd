//! Create witness and complaint_witness tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Witness::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Witness::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Witness::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Witness::Phone).string_len(32))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ComplaintWitness::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplaintWitness::ComplaintId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ComplaintWitness::WitnessId)
                            .string_len(32)
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(ComplaintWitness::ComplaintId)
                            .col(ComplaintWitness::WitnessId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_witness_complaint")
                            .from(ComplaintWitness::Table, ComplaintWitness::ComplaintId)
                            .to(Complaint::Table, Complaint::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_complaint_witness_witness")
                            .from(ComplaintWitness::Table, ComplaintWitness::WitnessId)
                            .to(Witness::Table, Witness::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ComplaintWitness::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Witness::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Witness {
    Table,
    Id,
    Name,
    Phone,
}

#[derive(Iden)]
enum ComplaintWitness {
    Table,
    ComplaintId,
    WitnessId,
}

#[derive(Iden)]
enum Complaint {
    Table,
    Id,
}
