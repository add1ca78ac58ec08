//! Gratuity Engine library crate.
//!
//! This crate exposes the statutory gratuity calculation engine and its
//! HTTP surface as reusable modules.  External applications may depend
//! on `gratuity_engine` and call [`engine::evaluate`] or
//! [`engine::evaluate_batch`] directly, or embed the API via
//! [`api::build_router`].

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod rules;
pub mod table;
pub mod telemetry;
