mod common;

use common::{add_dinner, add_person, store, ymd};
use hostroll::entity::helpers::{self, PersonChanges};
use hostroll::rotation::overview::{load_cycle_countdown, load_eligible_pool, load_host_ranking};
use hostroll::rotation::{
    DECISION_WINDOW_DAYS, DeadlineBasis, NextDinner, assign_next_host, current_day,
    dashboard_overview, home_overview,
};

#[tokio::test]
async fn pool_skips_people_who_hosted_this_year() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let cal = add_person(db, "Cal").await;
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;
    add_dinner(db, &ben, Some(ymd(2024, 2, 1))).await;
    add_dinner(db, &abe, Some(ymd(2023, 11, 1))).await;

    let pool = load_eligible_pool(db, today).await.unwrap();

    assert!(pool.is_strict);
    assert_eq!(pool.person_ids(), vec![abe.id, cal.id]);
}

#[tokio::test]
async fn pool_falls_back_when_everyone_hosted() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;
    let retired = add_person(db, "Rex").await;
    helpers::set_person_active(db, retired.id, false).await.unwrap();
    add_dinner(db, &abe, Some(ymd(2022, 2, 1))).await;
    add_dinner(db, &abe, Some(ymd(2024, 2, 1))).await;
    add_dinner(db, &ben, Some(ymd(2024, 3, 1))).await;

    let pool = load_eligible_pool(db, today).await.unwrap();

    assert!(!pool.is_strict);
    assert_eq!(pool.person_ids(), vec![ben.id, abe.id]);
    let counts: Vec<_> = pool.members.iter().map(|e| e.all_time_hosted).collect();
    assert_eq!(counts, vec![Some(1), Some(2)]);
}

#[tokio::test]
async fn ranking_prefers_people_who_never_hosted() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;
    let cal = add_person(db, "Cal").await;
    add_dinner(db, &abe, Some(ymd(2024, 1, 1))).await;
    add_dinner(db, &ben, Some(ymd(2023, 1, 1))).await;

    let ranking: Vec<_> = load_host_ranking(db, today)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.person.id)
        .collect();

    assert_eq!(ranking, vec![cal.id, ben.id, abe.id]);
}

#[tokio::test]
async fn cycle_countdown_uses_latest_dated_dinner() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    add_dinner(db, &abe, Some(ymd(2023, 12, 1))).await;
    add_dinner(db, &abe, Some(ymd(2024, 1, 1))).await;
    // a placeholder has no date and does not move the baseline
    add_dinner(db, &abe, None).await;

    let countdown = load_cycle_countdown(db, ymd(2024, 1, 10)).await.unwrap();

    assert_eq!(countdown.basis, DeadlineBasis::DinnerCadence);
    assert_eq!(countdown.deadline, ymd(2024, 1, 8));
    assert_eq!(countdown.days_left, -2);
}

#[tokio::test]
async fn home_offers_the_pool_only_when_nothing_is_planned() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;
    let last = add_dinner(db, &abe, Some(ymd(2024, 5, 1))).await;

    let idle = home_overview(db, today).await.unwrap();
    assert!(idle.upcoming.is_none());
    assert!(idle.next_placeholder.is_none());
    assert!(idle.placeholder_countdown.is_none());
    assert_eq!(idle.last_dinner, Some(last));
    let pool = idle.eligible_pool.expect("pool offered");
    assert!(!pool.is_strict);

    let placeholder = add_dinner(db, &abe, None).await;
    let committed = home_overview(db, placeholder.created_at.date_naive())
        .await
        .unwrap();
    assert_eq!(committed.next_placeholder, Some(placeholder));
    assert!(committed.eligible_pool.is_none());
    let countdown = committed.placeholder_countdown.expect("placeholder countdown");
    assert_eq!(countdown.basis, DeadlineBasis::PlaceholderDecision);
    assert_eq!(countdown.days_left, 7);
}

#[tokio::test]
async fn dashboard_collects_history_and_recommendation() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;
    for month in 1..=4 {
        add_dinner(db, &abe, Some(ymd(2024, month, 1))).await;
    }

    let dashboard = dashboard_overview(db, today, 3).await.unwrap();

    assert!(dashboard.eligible_pool.is_strict);
    assert_eq!(dashboard.eligible_pool.person_ids(), vec![ben.id]);
    assert_eq!(dashboard.history.len(), 3);
    assert_eq!(dashboard.history[0].date, Some(ymd(2024, 4, 1)));
    assert_eq!(dashboard.last_dinner.and_then(|d| d.date), Some(ymd(2024, 4, 1)));
    assert_eq!(dashboard.hosted_this_year.len(), 1);
    assert_eq!(dashboard.hosted_this_year[0].times_hosted, 4);
    assert_eq!(dashboard.recommended_host.map(|s| s.person.id), Some(ben.id));
}

#[tokio::test]
async fn home_reports_the_next_dinner_state() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;

    assert_eq!(home_overview(db, today).await.unwrap().next_dinner, NextDinner::None);

    let placeholder = add_dinner(db, &abe, None).await;
    let committed = home_overview(db, today).await.unwrap();
    assert_eq!(committed.next_dinner, NextDinner::Placeholder(placeholder));

    let upcoming = add_dinner(db, &abe, Some(ymd(2024, 6, 20))).await;
    let scheduled = home_overview(db, today).await.unwrap();
    assert_eq!(scheduled.next_dinner, NextDinner::Scheduled(upcoming));
}

#[tokio::test]
async fn recommendation_follows_reliability_edits() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;

    let before = dashboard_overview(db, today, 30).await.unwrap();
    assert_eq!(before.recommended_host.map(|s| s.person.id), Some(abe.id));

    let shaky = PersonChanges {
        reliability: Some(0.2),
        ..Default::default()
    };
    helpers::update_person(db, abe.id, shaky).await.unwrap();

    let after = dashboard_overview(db, today, 30).await.unwrap();
    assert_eq!(after.recommended_host.map(|s| s.person.id), Some(ben.id));
    let ranking = load_host_ranking(db, today).await.unwrap();
    assert_eq!(ranking[0].person.id, ben.id);
}

#[tokio::test]
async fn fresh_placeholder_has_the_full_window_on_the_current_day() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;

    assign_next_host(db, Some(abe.id.to_string().as_str()))
        .await
        .unwrap();

    let home = home_overview(db, current_day()).await.unwrap();
    let countdown = home.placeholder_countdown.expect("placeholder countdown");
    assert_eq!(countdown.days_left, DECISION_WINDOW_DAYS);
}
