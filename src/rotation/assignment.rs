use chrono::NaiveDate;
use log::{debug, info};
use sea_orm::{ActiveModelTrait, ConnectionTrait, IntoActiveModel, Set, TransactionTrait};
use serde::Serialize;

use crate::entity::dinners;
use crate::entity::helpers::{self, NewDinner};
use crate::error::RotationResult;

/// Where the caller should go after an assignment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Home,
    Dashboard,
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Destination::Home => "/",
            Destination::Dashboard => "/dashboard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// Missing, malformed, unknown or inactive person id. Nothing was written.
    Rejected,
    Created(dinners::Model),
    Retargeted {
        dinner: dinners::Model,
        previous_host_id: i32,
    },
    /// The placeholder already had this host
    Unchanged(dinners::Model),
}

impl AssignmentOutcome {
    pub fn destination(&self) -> Destination {
        match self {
            AssignmentOutcome::Rejected => Destination::Dashboard,
            _ => Destination::Home,
        }
    }

    pub fn placeholder(&self) -> Option<&dinners::Model> {
        match self {
            AssignmentOutcome::Rejected => None,
            AssignmentOutcome::Created(dinner)
            | AssignmentOutcome::Retargeted { dinner, .. }
            | AssignmentOutcome::Unchanged(dinner) => Some(dinner),
        }
    }
}

/// Commits `raw_person_id` as the next host by creating the placeholder dinner,
/// or by moving the existing placeholder to the new host.
///
/// Lookup and write share one transaction; the store's single-placeholder index
/// rejects a concurrent second insert.
pub async fn assign_next_host<C>(
    db: &C,
    raw_person_id: Option<&str>,
) -> RotationResult<AssignmentOutcome>
where
    C: TransactionTrait,
{
    let Some(person_id) = raw_person_id.and_then(|raw| raw.trim().parse::<i32>().ok()) else {
        debug!("Assignment ignored, unusable person id {raw_person_id:?}");
        return Ok(AssignmentOutcome::Rejected);
    };

    let txn = db.begin().await?;

    let Some(host) = helpers::find_active_person(&txn, person_id).await? else {
        txn.rollback().await?;
        debug!("Assignment ignored, no active person {person_id}");
        return Ok(AssignmentOutcome::Rejected);
    };

    let outcome = match helpers::placeholder_dinner(&txn).await? {
        Some(placeholder) if placeholder.host_id == host.id => {
            AssignmentOutcome::Unchanged(placeholder)
        }
        Some(placeholder) => {
            let previous_host_id = placeholder.host_id;
            let mut model = placeholder.into_active_model();
            model.host_id = Set(host.id);
            AssignmentOutcome::Retargeted {
                dinner: model.update(&txn).await?,
                previous_host_id,
            }
        }
        None => AssignmentOutcome::Created(
            helpers::create_dinner(
                &txn,
                NewDinner {
                    date: None,
                    restaurant: String::new(),
                    host_id: host.id,
                },
            )
            .await?,
        ),
    };

    txn.commit().await?;

    match &outcome {
        AssignmentOutcome::Created(dinner) => {
            info!("{} committed as next host (dinner {})", host.name, dinner.id)
        }
        AssignmentOutcome::Retargeted {
            dinner,
            previous_host_id,
        } => info!(
            "Next host moved from person {previous_host_id} to {} (dinner {})",
            host.name, dinner.id
        ),
        AssignmentOutcome::Unchanged(_) => debug!("{} already committed as next host", host.name),
        AssignmentOutcome::Rejected => {}
    }
    Ok(outcome)
}

/// State of the next gathering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "dinner", rename_all = "snake_case")]
pub enum NextDinner {
    None,
    /// Host committed, no date yet
    Placeholder(dinners::Model),
    Scheduled(dinners::Model),
}

/// A dated dinner on or after `today` wins over the placeholder, since it
/// happens first; the placeholder is the gathering after it.
pub async fn next_dinner<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<NextDinner> {
    if let Some(upcoming) = helpers::upcoming_dinner(db, today).await? {
        return Ok(NextDinner::Scheduled(upcoming));
    }
    let placeholder = helpers::placeholder_dinner(db).await?;
    Ok(NextDinner::from_parts(None, placeholder))
}

impl NextDinner {
    /// Builds the state from an already fetched upcoming dinner and placeholder.
    pub fn from_parts(
        upcoming: Option<dinners::Model>,
        placeholder: Option<dinners::Model>,
    ) -> Self {
        match (upcoming, placeholder) {
            (Some(upcoming), _) => NextDinner::Scheduled(upcoming),
            (None, Some(placeholder)) => NextDinner::Placeholder(placeholder),
            (None, None) => NextDinner::None,
        }
    }
}
