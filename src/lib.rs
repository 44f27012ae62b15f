//! Dinner rotation tracker: records who hosted and who came, and decides who
//! hosts next.

pub mod cli;
pub mod data;
pub mod entity;
pub mod error;
pub mod rotation;
pub mod server;

pub use error::{RotationError, RotationResult};
