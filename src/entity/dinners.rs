use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "dinners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// `None` marks the placeholder: host committed, date not fixed yet.
    /// At most one such row exists (partial unique index, see `data::schema`).
    pub date: Option<Date>,
    /// Empty until the dinner is scheduled
    pub restaurant: String,
    pub host_id: i32,
    pub created_at: DateTimeUtc,
}

impl Model {
    pub fn is_placeholder(&self) -> bool {
        self.date.is_none()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    // Hosts are protected: a person hosting any dinner cannot be deleted.
    #[sea_orm(
        belongs_to = "super::people::Entity",
        from = "Column::HostId",
        to = "super::people::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Host,
    #[sea_orm(has_many = "super::attendance::Entity")]
    Attendance,
}

impl Related<super::people::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Host.def()
    }
}

impl Related<super::attendance::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Attendance.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
