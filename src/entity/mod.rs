pub mod attendance;
pub mod dinners;
pub mod helpers;
pub mod people;
