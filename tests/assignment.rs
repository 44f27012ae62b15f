mod common;

use common::{add_dinner, add_person, store, ymd};
use hostroll::entity::helpers;
use hostroll::rotation::{AssignmentOutcome, Destination, NextDinner, assign_next_host, next_dinner};

#[tokio::test]
async fn assigning_twice_creates_one_placeholder() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    let id = abe.id.to_string();

    let first = assign_next_host(db, Some(id.as_str())).await.unwrap();
    let second = assign_next_host(db, Some(id.as_str())).await.unwrap();

    let AssignmentOutcome::Created(created) = &first else {
        panic!("expected a new placeholder, got {first:?}");
    };
    assert_eq!(second, AssignmentOutcome::Unchanged(created.clone()));
    assert_eq!(first.destination(), Destination::Home);
    assert_eq!(second.destination(), Destination::Home);

    let dinners = helpers::all_dinners(db).await.unwrap();
    assert_eq!(dinners.len(), 1);
    assert_eq!(dinners[0].host_id, abe.id);
    assert!(dinners[0].is_placeholder());
}

#[tokio::test]
async fn retargeting_reuses_the_same_row() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    let ben = add_person(db, "Ben").await;

    let first = assign_next_host(db, Some(abe.id.to_string().as_str())).await.unwrap();
    let placeholder_id = first.placeholder().unwrap().id;

    let outcome = assign_next_host(db, Some(ben.id.to_string().as_str())).await.unwrap();

    match outcome {
        AssignmentOutcome::Retargeted {
            dinner,
            previous_host_id,
        } => {
            assert_eq!(dinner.id, placeholder_id);
            assert_eq!(dinner.host_id, ben.id);
            assert_eq!(previous_host_id, abe.id);
        }
        other => panic!("expected retarget, got {other:?}"),
    }
    assert_eq!(helpers::placeholder_count(db).await.unwrap(), 1);
    assert_eq!(helpers::all_dinners(db).await.unwrap().len(), 1);
}

#[tokio::test]
async fn bad_person_ids_change_nothing() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    let gone = add_person(db, "Gus").await;
    helpers::set_person_active(db, gone.id, false).await.unwrap();
    let scheduled = add_dinner(db, &abe, Some(ymd(2024, 5, 1))).await;

    let missing = (gone.id + 100).to_string();
    let inactive = gone.id.to_string();
    for raw in [None, Some(""), Some("abc"), Some(missing.as_str()), Some(inactive.as_str())] {
        let outcome = assign_next_host(db, raw).await.unwrap();
        assert_eq!(outcome, AssignmentOutcome::Rejected, "input {raw:?}");
        assert_eq!(outcome.destination(), Destination::Dashboard);
    }

    assert_eq!(helpers::all_dinners(db).await.unwrap(), vec![scheduled]);
}

#[tokio::test]
async fn rejected_retarget_keeps_existing_placeholder() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    let placeholder = add_dinner(db, &abe, None).await;

    let outcome = assign_next_host(db, Some("9999")).await.unwrap();

    assert_eq!(outcome, AssignmentOutcome::Rejected);
    assert_eq!(helpers::placeholder_dinner(db).await.unwrap(), Some(placeholder));
}

#[tokio::test]
async fn whitespace_around_the_id_is_accepted() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;

    let outcome = assign_next_host(db, Some(format!(" {} ", abe.id).as_str())).await.unwrap();

    assert!(matches!(outcome, AssignmentOutcome::Created(_)));
}

#[tokio::test]
async fn next_dinner_moves_from_none_to_placeholder_to_scheduled() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let today = ymd(2024, 6, 1);
    let abe = add_person(db, "Abe").await;

    assert_eq!(next_dinner(db, today).await.unwrap(), NextDinner::None);

    let outcome = assign_next_host(db, Some(abe.id.to_string().as_str())).await.unwrap();
    let placeholder = outcome.placeholder().unwrap().clone();
    assert_eq!(
        next_dinner(db, today).await.unwrap(),
        NextDinner::Placeholder(placeholder.clone())
    );

    let scheduled = helpers::schedule_dinner(db, placeholder.id, ymd(2024, 6, 20), None)
        .await
        .unwrap();
    assert_eq!(
        next_dinner(db, today).await.unwrap(),
        NextDinner::Scheduled(scheduled)
    );

    // with the placeholder scheduled, the next assignment starts a fresh one
    let fresh = assign_next_host(db, Some(abe.id.to_string().as_str())).await.unwrap();
    assert!(matches!(fresh, AssignmentOutcome::Created(ref d) if d.id != placeholder.id));
}

#[tokio::test]
async fn past_dinners_are_not_the_next_dinner() {
    let connector = store().await;
    let db = connector.connection().unwrap();
    let abe = add_person(db, "Abe").await;
    add_dinner(db, &abe, Some(ymd(2024, 5, 1))).await;

    assert_eq!(next_dinner(db, ymd(2024, 6, 1)).await.unwrap(), NextDinner::None);
}
