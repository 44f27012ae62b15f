use crate::entity::{attendance, dinners, people};
use log::debug;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, Schema};

/// At most one dinner may lack a date. Every null-date row indexes the same
/// value, so a second placeholder violates uniqueness.
const SINGLE_PLACEHOLDER_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_dinners_single_placeholder ON dinners ((date IS NULL)) WHERE date IS NULL";

async fn create_table<C, E>(db: &C, schema: &Schema, entity: E) -> Result<(), DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
{
    let mut stmt = schema.create_table_from_entity(entity);
    stmt.if_not_exists();
    db.execute(db.get_database_backend().build(&stmt)).await?;
    Ok(())
}

/// Creates tables and indexes. Safe to call on an already initialized store.
pub async fn create_schema<C: ConnectionTrait>(db: &C) -> Result<(), DbErr> {
    let backend = db.get_database_backend();
    let schema = Schema::new(backend);

    // Referenced tables first so foreign keys resolve
    create_table(db, &schema, people::Entity).await?;
    create_table(db, &schema, dinners::Entity).await?;
    create_table(db, &schema, attendance::Entity).await?;

    let one_row_per_guest = Index::create()
        .name("idx_attendance_dinner_person")
        .table(attendance::Entity)
        .col(attendance::Column::DinnerId)
        .col(attendance::Column::PersonId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&one_row_per_guest)).await?;

    let by_date = Index::create()
        .name("idx_dinners_date")
        .table(dinners::Entity)
        .col(dinners::Column::Date)
        .if_not_exists()
        .to_owned();
    db.execute(backend.build(&by_date)).await?;

    db.execute_unprepared(SINGLE_PLACEHOLDER_INDEX).await?;

    debug!("Schema created");
    Ok(())
}
