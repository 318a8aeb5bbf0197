//! daily-planner CLI library
//!
//! The terminal front end of the planner: every command opens the persisted
//! planner, runs the same page-load step and reports through
//! [`TerminalFeedback`].

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::multiple_crate_versions)]

pub mod cli;
pub mod commands;
pub mod display;
pub mod feedback;
pub mod session;

pub use feedback::TerminalFeedback;
pub use session::PlannerSession;
