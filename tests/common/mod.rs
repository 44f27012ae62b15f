#![allow(dead_code)]

use chrono::NaiveDate;
use hostroll::data::configuration::Configuration;
use hostroll::data::dbconnector::SQLConnector;
use hostroll::entity::helpers::{self, NewDinner, NewPerson};
use hostroll::entity::{dinners, people};
use sea_orm::DatabaseConnection;

/// Fresh, initialized in-memory store with no members.
pub async fn store() -> SQLConnector {
    SQLConnector::in_memory()
        .open(&Configuration::default())
        .await
        .expect("in-memory store")
}

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub async fn add_person(db: &DatabaseConnection, name: &str) -> people::Model {
    helpers::create_person(
        db,
        NewPerson {
            name: name.to_string(),
            nickname: String::new(),
            birthday: None,
            reliability: 1.0,
        },
    )
    .await
    .unwrap()
}

pub async fn add_dinner(
    db: &DatabaseConnection,
    host: &people::Model,
    date: Option<NaiveDate>,
) -> dinners::Model {
    helpers::create_dinner(
        db,
        NewDinner {
            date,
            restaurant: String::from("Trattoria"),
            host_id: host.id,
        },
    )
    .await
    .unwrap()
}
