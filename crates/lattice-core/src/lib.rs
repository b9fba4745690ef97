//! Core infrastructure for the Lattice server.
//!
//! This crate contains shared infrastructure modules that are used by the
//! feature crates: the application state, the visibility resolver, the
//! notification bus, the outbound discovery client, and the auth extractor.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod extract;
pub mod notify;
pub mod prelude;
pub mod request;
pub mod visibility;

// Re-export commonly used types
pub use app::{App, AppBuilderOpts, AppState};
pub use extract::Auth;
pub use notify::{NotificationEvent, Notifier};

// vim: ts=4
