//! Complaint to witness link.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaint_witness")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub complaint_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub witness_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::complaint::Entity",
        from = "Column::ComplaintId",
        to = "super::complaint::Column::Id",
        on_delete = "Cascade"
    )]
    Complaint,

    #[sea_orm(
        belongs_to = "super::witness::Entity",
        from = "Column::WitnessId",
        to = "super::witness::Column::Id",
        on_delete = "Cascade"
    )]
    Witness,
}

impl Related<super::witness::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Witness.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
