//! Outreach - email outreach sequences, leads and campaigns
//!
//! Library half of the `outreach` binary: the sequence builder
//! (`sequence`), API and hosted-backend clients (`api`, `baas`), the
//! terminal editor (`ui`, `app`) and the ambient config/logging layers.

pub mod api;
pub mod app;
pub mod baas;
pub mod columns;
pub mod config;
pub mod logging;
pub mod sequence;
pub mod ui;
