use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::attendance::Status;
use crate::rotation::{Countdown, HostStanding};

#[derive(Debug, Deserialize)]
pub struct CreatePersonRequest {
    pub name: String,
    #[serde(default)]
    pub nickname: String,
    pub birthday: Option<NaiveDate>,
    pub reliability: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i32,
}

/// Tells an explicit `null` (`Some(None)`) apart from an absent field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePersonRequest {
    pub name: Option<String>,
    pub nickname: Option<String>,
    /// `null` clears the birthday
    #[serde(default, deserialize_with = "present")]
    pub birthday: Option<Option<NaiveDate>>,
    pub reliability: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDinnerRequest {
    pub host_id: i32,
    /// Omit to create the placeholder
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub restaurant: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateDinnerRequest {
    /// `null` turns the dinner back into the placeholder
    #[serde(default, deserialize_with = "present")]
    pub date: Option<Option<NaiveDate>>,
    pub restaurant: Option<String>,
    pub host_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAttendanceRequest {
    pub person_id: i32,
    #[serde(default)]
    pub status: Status,
}

#[derive(Debug, Serialize)]
pub struct AttendanceResponse {
    pub id: i32,
    pub person_id: i32,
    pub name: String,
    pub status: Status,
}

/// Form posted by the "assign next host" button. Kept as text so a bad value
/// reaches the workflow instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct AssignForm {
    pub person_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HostRankingResponse {
    pub recommended: Option<HostStanding>,
    pub ranking: Vec<HostStanding>,
}

#[derive(Debug, Serialize)]
pub struct DeadlineResponse {
    pub cycle: Countdown,
    pub placeholder: Option<Countdown>,
}
