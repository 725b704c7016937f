//! Core library for clawmon — usage monitoring for the OpenClaw CLI.
//!
//! One monitoring cycle is fetch → parse → evaluate → log → advise:
//! [`usage::StatusClient`] runs the external status command,
//! [`usage::parser`] turns the captured text into a [`usage::UsageRecord`],
//! [`monitor::check_cost`] compares the cost against the configured ceiling,
//! [`store::UsageLog`] appends the record, and [`advisor::suggest_model`]
//! derives a model-sizing recommendation. [`monitor::UsageMonitor`] ties the
//! sequence together.
//!
//! No failure here is fatal to a long-running monitor: every failure is
//! scoped to a single cycle (see [`error`]).

pub mod advisor;
pub mod config;
pub mod error;
pub mod monitor;
pub mod store;
pub mod usage;
