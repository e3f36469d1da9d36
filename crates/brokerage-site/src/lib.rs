//! Contact form lifecycle and route guarding for the brokerage marketing site.

pub mod auth;
pub mod config;
pub mod contact;
pub mod error;
pub mod presentation;
pub mod telemetry;
