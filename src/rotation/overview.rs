//! Read models for the home page and the organizer dashboard.

use chrono::{Datelike, NaiveDate};
use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::entity::helpers;
use crate::entity::{dinners, people};
use crate::error::RotationResult;
use crate::rotation::assignment::NextDinner;
use crate::rotation::rules::{self, Countdown, EligiblePool, HostStanding};

#[derive(Debug, Clone, Serialize)]
pub struct HomeOverview {
    pub today: NaiveDate,
    pub next_dinner: NextDinner,
    pub upcoming: Option<dinners::Model>,
    pub next_placeholder: Option<dinners::Model>,
    pub placeholder_countdown: Option<Countdown>,
    pub last_dinner: Option<dinners::Model>,
    pub cycle_countdown: Countdown,
    /// Only offered when nothing is scheduled or committed yet
    pub eligible_pool: Option<EligiblePool>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HostedCount {
    pub person: people::Model,
    pub times_hosted: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardOverview {
    pub today: NaiveDate,
    pub eligible_pool: EligiblePool,
    pub history: Vec<dinners::Model>,
    pub last_dinner: Option<dinners::Model>,
    pub hosted_this_year: Vec<HostedCount>,
    pub recommended_host: Option<HostStanding>,
}

/// Reads the active roster and this year's dinners, then applies the pool rule.
pub async fn load_eligible_pool<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<EligiblePool> {
    let active = helpers::active_people(db).await?;
    let this_year = helpers::dated_dinners_in_year_through(db, today.year(), today).await?;
    let counts = helpers::lifetime_host_counts(db).await?;
    Ok(rules::eligible_host_pool(today, &active, &this_year, &counts))
}

/// Everyone's standing, ranked for the "who should host next" view.
pub async fn load_host_ranking<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Vec<HostStanding>> {
    let people = helpers::list_people(db).await?;
    let dinners = helpers::all_dinners(db).await?;
    Ok(rules::rank_next_hosts(rules::host_standings(
        today, &people, &dinners,
    )))
}

pub async fn load_cycle_countdown<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Countdown> {
    let last = helpers::most_recent_dated_dinner(db).await?;
    Ok(rules::cycle_countdown(last.as_ref(), today))
}

pub async fn load_placeholder_countdown<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<Option<Countdown>> {
    let placeholder = helpers::placeholder_dinner(db).await?;
    Ok(rules::placeholder_countdown(placeholder.as_ref(), today))
}

pub async fn home_overview<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
) -> RotationResult<HomeOverview> {
    let upcoming = helpers::upcoming_dinner(db, today).await?;
    let next_placeholder = helpers::placeholder_dinner(db).await?;
    let last_dinner = helpers::last_completed_dinner(db, today).await?;

    let eligible_pool = if upcoming.is_none() && next_placeholder.is_none() {
        Some(load_eligible_pool(db, today).await?)
    } else {
        None
    };

    Ok(HomeOverview {
        today,
        next_dinner: NextDinner::from_parts(upcoming.clone(), next_placeholder.clone()),
        placeholder_countdown: rules::placeholder_countdown(next_placeholder.as_ref(), today),
        cycle_countdown: load_cycle_countdown(db, today).await?,
        upcoming,
        next_placeholder,
        last_dinner,
        eligible_pool,
    })
}

pub async fn dashboard_overview<C: ConnectionTrait>(
    db: &C,
    today: NaiveDate,
    history_limit: u64,
) -> RotationResult<DashboardOverview> {
    let hosted_this_year = helpers::hosted_this_year(db, today)
        .await?
        .into_iter()
        .map(|(person, times_hosted)| HostedCount {
            person,
            times_hosted,
        })
        .collect();

    let ranking = load_host_ranking(db, today).await?;

    Ok(DashboardOverview {
        today,
        eligible_pool: load_eligible_pool(db, today).await?,
        history: helpers::dinner_history(db, history_limit).await?,
        last_dinner: helpers::last_completed_dinner(db, today).await?,
        hosted_this_year,
        recommended_host: rules::pick_next_host(&ranking).cloned(),
    })
}
