//! Roof inspection backend: branch-scoped customers, buildings and reports,
//! autosaved drafts, offers and roof measurement.

#[cfg(feature = "api")]
pub mod api;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod db;
pub mod drafts;
pub mod errors;
pub mod geocoding;
pub mod geometry;
pub mod models;
pub mod notifications;
pub mod offers;
pub mod reporting;
pub mod storage;
pub mod utils;
pub mod validation;
