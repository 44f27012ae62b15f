use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member of the rotation.
///
/// Hosting history is not stored here; `last_hosted` and lifetime counts are
/// derived from `dinners` on read (see `rotation::rules::host_standings`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "people")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Empty when unset
    pub nickname: String,
    pub birthday: Option<Date>,
    /// Tie-breaker in the next-host ranking, higher is better
    pub reliability: f64,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::dinners::Entity")]
    HostedDinners,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::dinners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HostedDinners.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
