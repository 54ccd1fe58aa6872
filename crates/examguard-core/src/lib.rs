//! examguard-core — Proctored quiz session engine.
//!
//! This crate owns the data model and the session state machine that run a
//! timed quiz attempt: countdown, answer tracking, integrity monitoring,
//! capture deterrence, and the exactly-once submission path.

pub mod answers;
pub mod guard;
pub mod model;
pub mod monitor;
pub mod parser;
pub mod report;
pub mod session;
pub mod timer;
pub mod traits;
