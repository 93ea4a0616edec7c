//! Terminal front end for the Groqmate coach.
//!
//! [`repl`] reads learner input, [`command`] parses it, [`app`] dispatches it
//! against the core session and tutor, and [`config`] persists provider
//! settings between runs.

pub mod app;
pub mod command;
pub mod config;
pub mod repl;
