//! Weekly class timetable generation.
//!
//! [`solver::generate`] assigns every class five periods a day, six days a
//! week, choosing randomly among offerings whose teacher is still free in that
//! period. The remaining modules render, persist and serve the result.

pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod render;
pub mod server;
pub mod solver;
