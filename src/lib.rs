//! Task Board Library
//!
//! A single-user kanban board: an entity store, a pure reducer over typed
//! commands, a facade that assigns ids and notifies subscribers, and a
//! snapshot bridge for persistence.

pub mod cli;
pub mod command;
pub mod config;
pub mod drag;
pub mod error;
pub mod export;
pub mod facade;
pub mod format;
pub mod ids;
pub mod ingest;
pub mod logging;
pub mod persistence;
pub mod reducer;
pub mod store;
pub mod subscriptions;
pub mod types;
pub mod validate;
