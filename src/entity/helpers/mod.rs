use std::collections::HashMap;

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::sea_query::{Expr, NullOrdering};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, IntoActiveModel, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::entity::{attendance, dinners, people};
use crate::error::{RotationError, RotationResult, is_foreign_key_violation, is_unique_violation};

#[derive(Debug, Clone)]
pub struct NewPerson {
    pub name: String,
    pub nickname: String,
    pub birthday: Option<NaiveDate>,
    pub reliability: f64,
}

#[derive(Debug, Clone)]
pub struct NewDinner {
    /// `None` creates the placeholder
    pub date: Option<NaiveDate>,
    pub restaurant: String,
    pub host_id: i32,
}

/// Partial edit of a person. `None` leaves a field untouched; for `birthday`,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct PersonChanges {
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub birthday: Option<Option<NaiveDate>>,
    pub reliability: Option<f64>,
    pub is_active: Option<bool>,
}

/// Partial edit of a dinner. `date: Some(None)` unschedules it.
#[derive(Debug, Clone, Default)]
pub struct DinnerChanges {
    pub date: Option<Option<NaiveDate>>,
    pub restaurant: Option<String>,
    pub host_id: Option<i32>,
}

// ---- people ----

pub async fn create_person<C: ConnectionTrait>(
    db: &C,
    person: NewPerson,
) -> RotationResult<people::Model> {
    if person.name.trim().is_empty() {
        return Err(RotationError::InvalidInput(String::from("name must not be empty")));
    }
    let model = people::ActiveModel {
        name: Set(person.name),
        nickname: Set(person.nickname),
        birthday: Set(person.birthday),
        reliability: Set(person.reliability),
        is_active: Set(true),
        ..Default::default()
    };
    Ok(model.insert(db).await?)
}

pub async fn get_person<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> RotationResult<Option<people::Model>> {
    Ok(people::Entity::find_by_id(id).one(db).await?)
}

/// The person with `id` if they exist and are active.
pub async fn find_active_person<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> RotationResult<Option<people::Model>> {
    Ok(people::Entity::find_by_id(id)
        .filter(people::Column::IsActive.eq(true))
        .one(db)
        .await?)
}

/// Everyone, active or not, by name.
pub async fn list_people<C: ConnectionTrait>(db: &C) -> RotationResult<Vec<people::Model>> {
    Ok(people::Entity::find()
        .order_by_asc(people::Column::Name)
        .order_by_asc(people::Column::Id)
        .all(db)
        .await?)
}

pub async fn active_people<C: ConnectionTrait>(db: &C) -> RotationResult<Vec<people::Model>> {
    Ok(people::Entity::find()
        .filter(people::Column::IsActive.eq(true))
        .order_by_asc(people::Column::Name)
        .order_by_asc(people::Column::Id)
        .all(db)
        .await?)
}

/// Applies whichever fields are set; the rest keep their stored values.
pub async fn update_person<C: ConnectionTrait>(
    db: &C,
    id: i32,
    changes: PersonChanges,
) -> RotationResult<people::Model> {
    let person = get_person(db, id)
        .await?
        .ok_or(RotationError::PersonNotFound { id })?;
    let mut model = person.clone().into_active_model();
    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(RotationError::InvalidInput(String::from("name must not be empty")));
        }
        model.name = Set(name);
    }
    if let Some(nickname) = changes.nickname {
        model.nickname = Set(nickname);
    }
    if let Some(birthday) = changes.birthday {
        model.birthday = Set(birthday);
    }
    if let Some(reliability) = changes.reliability {
        if !reliability.is_finite() {
            return Err(RotationError::InvalidInput(String::from(
                "reliability must be a finite number",
            )));
        }
        model.reliability = Set(reliability);
    }
    if let Some(is_active) = changes.is_active {
        model.is_active = Set(is_active);
    }
    if !model.is_changed() {
        return Ok(person);
    }
    Ok(model.update(db).await?)
}

pub async fn set_person_active<C: ConnectionTrait>(
    db: &C,
    id: i32,
    is_active: bool,
) -> RotationResult<people::Model> {
    let changes = PersonChanges {
        is_active: Some(is_active),
        ..Default::default()
    };
    update_person(db, id, changes).await
}

/// Deletes a person and their attendance rows. Hosts are never deleted.
pub async fn delete_person<C: ConnectionTrait>(db: &C, id: i32) -> RotationResult<()> {
    let hosted = lifetime_host_count(db, id).await?;
    if hosted > 0 {
        return Err(RotationError::HostInUse { id, hosted });
    }
    let result = people::Entity::delete_by_id(id).exec(db).await.map_err(|e| {
        if is_foreign_key_violation(&e) {
            RotationError::HostInUse { id, hosted }
        } else {
            RotationError::Store(e)
        }
    })?;
    if result.rows_affected == 0 {
        return Err(RotationError::PersonNotFound { id });
    }
    Ok(())
}

// ---- dinners ----

pub async fn get_dinner<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> RotationResult<Option<dinners::Model>> {
    Ok(dinners::Entity::find_by_id(id).one(db).await?)
}

pub async fn create_dinner<C: ConnectionTrait>(
    db: &C,
    dinner: NewDinner,
) -> RotationResult<dinners::Model> {
    if get_person(db, dinner.host_id).await?.is_none() {
        return Err(RotationError::PersonNotFound { id: dinner.host_id });
    }
    if dinner.date.is_none() && placeholder_count(db).await? > 0 {
        return Err(RotationError::PlaceholderExists);
    }
    let model = dinners::ActiveModel {
        date: Set(dinner.date),
        restaurant: Set(dinner.restaurant),
        host_id: Set(dinner.host_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    model.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            RotationError::PlaceholderExists
        } else {
            RotationError::Store(e)
        }
    })
}

/// Edits a dinner in place. Clearing the date turns it back into the
/// placeholder, which is refused while another placeholder exists.
pub async fn update_dinner<C: ConnectionTrait>(
    db: &C,
    id: i32,
    changes: DinnerChanges,
) -> RotationResult<dinners::Model> {
    let dinner = get_dinner(db, id)
        .await?
        .ok_or(RotationError::DinnerNotFound { id })?;

    if let Some(host_id) = changes.host_id {
        if get_person(db, host_id).await?.is_none() {
            return Err(RotationError::PersonNotFound { id: host_id });
        }
    }
    if changes.date == Some(None) && dinner.date.is_some() {
        if let Some(existing) = placeholder_dinner(db).await? {
            if existing.id != id {
                return Err(RotationError::PlaceholderExists);
            }
        }
    }

    let mut model = dinner.clone().into_active_model();
    if let Some(date) = changes.date {
        model.date = Set(date);
    }
    if let Some(restaurant) = changes.restaurant {
        model.restaurant = Set(restaurant);
    }
    if let Some(host_id) = changes.host_id {
        model.host_id = Set(host_id);
    }
    if !model.is_changed() {
        return Ok(dinner);
    }
    model.update(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            RotationError::PlaceholderExists
        } else if is_foreign_key_violation(&e) {
            RotationError::PersonNotFound {
                id: changes.host_id.unwrap_or_default(),
            }
        } else {
            RotationError::Store(e)
        }
    })
}

/// Fixes the date (and optionally the restaurant) of a dinner. Scheduling the
/// placeholder moves the rotation from "committed" to "scheduled".
pub async fn schedule_dinner<C: ConnectionTrait>(
    db: &C,
    id: i32,
    date: NaiveDate,
    restaurant: Option<String>,
) -> RotationResult<dinners::Model> {
    let changes = DinnerChanges {
        date: Some(Some(date)),
        restaurant,
        host_id: None,
    };
    update_dinner(db, id, changes).await
}

/// Deletes a dinner; its attendance rows go with it, the host stays.
pub async fn delete_dinner<C: ConnectionTrait>(db: &C, id: i32) -> RotationResult<()> {
    let result = dinners::Entity::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(RotationError::DinnerNotFound { id });
    }
    Ok(())
}

/// Placeholders first (newest id first), then by date and id, newest first.
pub async fn list_dinners<C: ConnectionTrait>(db: &C) -> RotationResult<Vec<dinners::Model>> {
    Ok(dinners::Entity::find()
        .order_by_with_nulls(dinners::Column::Date, Order::Desc, NullOrdering::First)
        .order_by_desc(dinners::Column::Id)
        .all(db)
        .await?)
}

/// Dinners with a date in `year`, on or before `through`.
pub async fn dated_dinners_in_year_through<C: ConnectionTrait>(
    db: &C,
    year: i32,
    through: NaiveDate,
) -> RotationResult<Vec<dinners::Model>> {
    let Some(first_day) = NaiveDate::from_ymd_opt(year, 1, 1) else {
        return Err(RotationError::InvalidInput(format!("year {year} is out of range")));
    };
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.is_not_null())
        .filter(dinners::Column::Date.gte(first_day))
        .filter(dinners::Column::Date.lte(through))
        .order_by_asc(dinners::Column::Date)
        .order_by_asc(dinners::Column::Id)
        .all(db)
        .await?)
}

pub async fn all_dinners<C: ConnectionTrait>(db: &C) -> RotationResult<Vec<dinners::Model>> {
    Ok(dinners::Entity::find()
        .order_by_asc(dinners::Column::Id)
        .all(db)
        .await?)
}

/// Number of dinners (placeholders included) each person has hosted, ever.
/// People who never hosted are absent from the map.
pub async fn lifetime_host_counts<C: ConnectionTrait>(db: &C) -> RotationResult<HashMap<i32, u64>> {
    let rows: Vec<(i32, i64)> = dinners::Entity::find()
        .select_only()
        .column(dinners::Column::HostId)
        .column_as(Expr::col(dinners::Column::Id).count(), "hosted")
        .group_by(dinners::Column::HostId)
        .into_tuple()
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .map(|(host_id, hosted)| (host_id, hosted.max(0) as u64))
        .collect())
}

pub async fn lifetime_host_count<C: ConnectionTrait>(
    db: &C,
    person_id: i32,
) -> RotationResult<u64> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::HostId.eq(person_id))
        .count(db)
        .await?)
}

/// Latest dinner that has a date, regardless of whether it already happened.
pub async fn most_recent_dated_dinner<C: ConnectionTrait>(
    db: &C,
) -> RotationResult<Option<dinners::Model>> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.is_not_null())
        .order_by_desc(dinners::Column::Date)
        .order_by_desc(dinners::Column::Id)
        .one(db)
        .await?)
}

/// The dinner with no date. The unique index keeps this to one row; ordering by
/// id still picks the newest should an older store predate the index.
pub async fn placeholder_dinner<C: ConnectionTrait>(
    db: &C,
) -> RotationResult<Option<dinners::Model>> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.is_null())
        .order_by_desc(dinners::Column::Id)
        .one(db)
        .await?)
}

pub async fn placeholder_count<C: ConnectionTrait>(db: &C) -> RotationResult<u64> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.is_null())
        .count(db)
        .await?)
}

/// Earliest dinner dated today or later.
pub async fn upcoming_dinner<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Option<dinners::Model>> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.gte(today))
        .order_by_asc(dinners::Column::Date)
        .order_by_asc(dinners::Column::Id)
        .one(db)
        .await?)
}

/// Latest dinner dated today or earlier.
pub async fn last_completed_dinner<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Option<dinners::Model>> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.lte(today))
        .order_by_desc(dinners::Column::Date)
        .order_by_desc(dinners::Column::Id)
        .one(db)
        .await?)
}

/// Dated dinners, newest first, at most `limit`.
pub async fn dinner_history<C: ConnectionTrait>(
    db: &C,
    limit: u64,
) -> RotationResult<Vec<dinners::Model>> {
    Ok(dinners::Entity::find()
        .filter(dinners::Column::Date.is_not_null())
        .order_by_desc(dinners::Column::Date)
        .order_by_desc(dinners::Column::Id)
        .limit(limit)
        .all(db)
        .await?)
}

/// People who hosted a dated dinner in `today`'s year up to `today`, with how
/// many times, ordered by name.
pub async fn hosted_this_year<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Vec<(people::Model, u64)>> {
    let dinners = dated_dinners_in_year_through(db, today.year(), today).await?;
    let mut counts: HashMap<i32, u64> = HashMap::new();
    for dinner in &dinners {
        *counts.entry(dinner.host_id).or_default() += 1;
    }
    let hosts = people::Entity::find()
        .filter(people::Column::Id.is_in(counts.keys().copied()))
        .order_by_asc(people::Column::Name)
        .order_by_asc(people::Column::Id)
        .all(db)
        .await?;
    Ok(hosts
        .into_iter()
        .map(|p| {
            let times = counts.get(&p.id).copied().unwrap_or_default();
            (p, times)
        })
        .collect())
}

// ---- attendance ----

pub async fn record_attendance<C: ConnectionTrait>(
    db: &C,
    dinner_id: i32,
    person_id: i32,
    status: attendance::Status,
) -> RotationResult<attendance::Model> {
    if get_dinner(db, dinner_id).await?.is_none() {
        return Err(RotationError::DinnerNotFound { id: dinner_id });
    }
    if get_person(db, person_id).await?.is_none() {
        return Err(RotationError::PersonNotFound { id: person_id });
    }
    let existing = attendance::Entity::find()
        .filter(attendance::Column::DinnerId.eq(dinner_id))
        .filter(attendance::Column::PersonId.eq(person_id))
        .count(db)
        .await?;
    if existing > 0 {
        return Err(RotationError::DuplicateAttendance {
            dinner_id,
            person_id,
        });
    }
    let link = attendance::ActiveModel {
        dinner_id: Set(dinner_id),
        person_id: Set(person_id),
        status: Set(status),
        ..Default::default()
    };
    link.insert(db).await.map_err(|e| {
        if is_unique_violation(&e) {
            RotationError::DuplicateAttendance {
                dinner_id,
                person_id,
            }
        } else {
            RotationError::Store(e)
        }
    })
}

/// Attendance rows of a dinner with the person each one refers to, by name.
pub async fn attendance_for_dinner<C: ConnectionTrait>(
    db: &C,
    dinner_id: i32,
) -> RotationResult<Vec<(attendance::Model, people::Model)>> {
    let rows = attendance::Entity::find()
        .filter(attendance::Column::DinnerId.eq(dinner_id))
        .find_also_related(people::Entity)
        .all(db)
        .await?;
    let mut records: Vec<_> = rows
        .into_iter()
        .filter_map(|(record, person)| person.map(|p| (record, p)))
        .collect();
    records.sort_by(|(_, a), (_, b)| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(records)
}
