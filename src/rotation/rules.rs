//! Host selection rules.
//!
//! Everything here is a pure function over rows already read from the store.
//! `today` is always passed in; nothing reads the clock.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::entity::{dinners, people};

/// Days after a baseline date within which the next host should be chosen.
pub const DECISION_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolEntry {
    pub person: people::Model,
    /// Only set for the fairness fallback
    pub all_time_hosted: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligiblePool {
    pub members: Vec<PoolEntry>,
    /// `false` when nobody was strictly eligible and the fallback applied
    pub is_strict: bool,
}

impl EligiblePool {
    pub fn person_ids(&self) -> Vec<i32> {
        self.members.iter().map(|entry| entry.person.id).collect()
    }
}

/// Who may host next.
///
/// The strict pool is every active person who has not hosted a dated dinner in
/// `today`'s calendar year (on or before `today`), by name. When that leaves
/// nobody, every active person is eligible again, fewest lifetime hosts first,
/// then by name.
///
/// `dinners` may contain any dinners; only dated ones in the current year up to
/// `today` exclude a host. `lifetime_counts` maps person id to hosted dinners;
/// missing ids count as zero.
pub fn eligible_host_pool(
    today: NaiveDate,
    people: &[people::Model],
    dinners: &[dinners::Model],
    lifetime_counts: &HashMap<i32, u64>,
) -> EligiblePool {
    let hosted_this_year: HashSet<i32> = dinners
        .iter()
        .filter(|d| {
            d.date
                .is_some_and(|date| date.year() == today.year() && date <= today)
        })
        .map(|d| d.host_id)
        .collect();

    let mut active: Vec<&people::Model> = people.iter().filter(|p| p.is_active).collect();
    active.sort_by(|a, b| by_name(a, b));

    let strict: Vec<PoolEntry> = active
        .iter()
        .filter(|p| !hosted_this_year.contains(&p.id))
        .map(|p| PoolEntry {
            person: (*p).clone(),
            all_time_hosted: None,
        })
        .collect();

    // Zero active people is vacuously strict
    if !strict.is_empty() || active.is_empty() {
        return EligiblePool {
            members: strict,
            is_strict: true,
        };
    }

    let mut fallback: Vec<PoolEntry> = active
        .into_iter()
        .map(|p| PoolEntry {
            person: p.clone(),
            all_time_hosted: Some(lifetime_counts.get(&p.id).copied().unwrap_or_default()),
        })
        .collect();
    fallback.sort_by(|a, b| {
        a.all_time_hosted
            .cmp(&b.all_time_hosted)
            .then_with(|| by_name(&a.person, &b.person))
    });

    EligiblePool {
        members: fallback,
        is_strict: false,
    }
}

/// A person's hosting record, derived from dinner history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostStanding {
    pub person: people::Model,
    /// All dinners hosted, placeholders and future dinners included
    pub hosted_count: u64,
    /// Latest dinner hosted on or before the reference day
    pub last_hosted: Option<NaiveDate>,
}

impl HostStanding {
    pub fn never_hosted(&self) -> bool {
        self.last_hosted.is_none()
    }
}

/// Projects every person's hosting record out of `dinners`.
pub fn host_standings(
    today: NaiveDate,
    people: &[people::Model],
    dinners: &[dinners::Model],
) -> Vec<HostStanding> {
    let mut counts: HashMap<i32, u64> = HashMap::new();
    let mut last: HashMap<i32, NaiveDate> = HashMap::new();
    for dinner in dinners {
        *counts.entry(dinner.host_id).or_default() += 1;
        if let Some(date) = dinner.date.filter(|date| *date <= today) {
            last.entry(dinner.host_id)
                .and_modify(|seen| *seen = (*seen).max(date))
                .or_insert(date);
        }
    }

    people
        .iter()
        .map(|p| HostStanding {
            person: p.clone(),
            hosted_count: counts.get(&p.id).copied().unwrap_or_default(),
            last_hosted: last.get(&p.id).copied(),
        })
        .collect()
}

/// Total order for recommending a single next host: never hosted first, then
/// oldest last-hosted date, fewest dinners hosted, highest reliability, name.
/// Id is the last resort so identical people still order reproducibly.
pub fn next_host_order(a: &HostStanding, b: &HostStanding) -> Ordering {
    b.never_hosted()
        .cmp(&a.never_hosted())
        .then_with(|| a.last_hosted.cmp(&b.last_hosted))
        .then_with(|| a.hosted_count.cmp(&b.hosted_count))
        .then_with(|| b.person.reliability.total_cmp(&a.person.reliability))
        .then_with(|| by_name(&a.person, &b.person))
}

pub fn rank_next_hosts(mut standings: Vec<HostStanding>) -> Vec<HostStanding> {
    standings.sort_by(next_host_order);
    standings
}

pub fn pick_next_host(standings: &[HostStanding]) -> Option<&HostStanding> {
    standings.iter().min_by(|a, b| next_host_order(a, b))
}

fn by_name(a: &people::Model, b: &people::Model) -> Ordering {
    a.name.cmp(&b.name).then(a.id.cmp(&b.id))
}

/// What a countdown is measured from. The two are not interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadlineBasis {
    /// Date of the latest scheduled dinner
    DinnerCadence,
    /// Creation of the placeholder dinner
    PlaceholderDecision,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub basis: DeadlineBasis,
    pub base_date: NaiveDate,
    pub deadline: NaiveDate,
    /// Negative once the deadline has passed
    pub days_left: i64,
}

impl Countdown {
    pub fn is_overdue(&self) -> bool {
        self.days_left < 0
    }
}

pub fn decision_deadline(base_date: NaiveDate) -> NaiveDate {
    base_date + Duration::days(DECISION_WINDOW_DAYS)
}

pub fn days_left(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

/// Countdown from the most recent dated dinner, or from `today` if there is none.
pub fn cycle_countdown(last_dated_dinner: Option<&dinners::Model>, today: NaiveDate) -> Countdown {
    let base_date = last_dated_dinner.and_then(|d| d.date).unwrap_or(today);
    let deadline = decision_deadline(base_date);
    Countdown {
        basis: DeadlineBasis::DinnerCadence,
        base_date,
        deadline,
        days_left: days_left(deadline, today),
    }
}

/// The calendar day the outer surfaces evaluate rules on. Taken in UTC so it
/// lines up with `dinners.created_at`, which the placeholder countdown reads.
pub fn current_day() -> NaiveDate {
    Utc::now().date_naive()
}

/// Countdown from when the placeholder was created. `None` without a
/// placeholder, or when the given dinner already has a date.
pub fn placeholder_countdown(
    placeholder: Option<&dinners::Model>,
    today: NaiveDate,
) -> Option<Countdown> {
    let placeholder = placeholder.filter(|d| d.is_placeholder())?;
    Some(countdown_from_created(placeholder.created_at, today))
}

fn countdown_from_created(created_at: DateTime<Utc>, today: NaiveDate) -> Countdown {
    let base_date = created_at.date_naive();
    let deadline = decision_deadline(base_date);
    Countdown {
        basis: DeadlineBasis::PlaceholderDecision,
        base_date,
        deadline,
        days_left: days_left(deadline, today),
    }
}
