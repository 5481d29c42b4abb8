//! Localized content service for the MLM software marketing site.
//!
//! Serves locale-prefixed page content, the privacy policy and the plan
//! simulator, and exposes admin endpoints for the localized services and FAQ
//! collections.

pub mod api;
pub mod config;
pub mod content;
pub mod error;
pub mod fanout;
pub mod i18n;
pub mod models;
pub mod security;
pub mod simulator;
pub mod store;
