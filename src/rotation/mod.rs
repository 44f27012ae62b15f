//! Rotation logic: who may host, who should host, and the committed next host.

pub mod assignment;
pub mod overview;
pub mod rules;

pub use assignment::{
    AssignmentOutcome, Destination, NextDinner, assign_next_host, next_dinner,
};
pub use overview::{DashboardOverview, HomeOverview, dashboard_overview, home_overview};
pub use rules::{
    Countdown, DECISION_WINDOW_DAYS, DeadlineBasis, EligiblePool, HostStanding, PoolEntry,
    current_day,
};
