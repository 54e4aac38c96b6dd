//! Status log entity.
//!
//! Append-only audit trail of complaint status transitions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::complaint::ComplaintStatus;
use super::staff::Role;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "status_log")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub complaint_id: String,

    /// None for the entry written when the complaint is filed.
    #[sea_orm(nullable)]
    pub previous_status: Option<ComplaintStatus>,

    pub new_status: ComplaintStatus,

    /// Principal that performed the transition.
    pub actor_id: String,

    pub actor_role: Role,

    pub actor_rank: i32,

    pub created_at: DateTimeWithTimeZone,
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
}

impl Related<super::complaint::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Complaint.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
