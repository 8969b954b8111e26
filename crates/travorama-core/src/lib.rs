//! Core Travorama library (login flow, auth client, config, telemetry).

pub mod auth;
pub mod config;
pub mod flow;
pub mod telemetry;
