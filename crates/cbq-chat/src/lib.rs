//! cbioquery chat: library crate for the interactive front end.
//!
//! Re-exports all modules so external crates (e.g. `cbq-e2e-tests`) can
//! drive the dispatcher, handler and conversation loop directly.

pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod format;
pub mod handler;
pub mod repl;
