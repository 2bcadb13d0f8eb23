//! Vitrine: content-access layer for a catalog site.
//!
//! The crate owns one concern: giving every consumer of a content-driven site
//! (home, listing, detail and admin views) a consistent picture of the remote
//! article and product collections without redundant fetches.
//!
//! - [`cache`] holds the process-wide snapshot slot and its state machine.
//! - [`application`] exposes the consumer surfaces: the shared accessor, the
//!   read-through detail lookup, and the admin mutation service.
//! - [`infra`] provides the HTTP adapter for the remote content API plus
//!   telemetry bootstrap.
//! - [`config`] resolves layered settings (file → env → CLI).

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
