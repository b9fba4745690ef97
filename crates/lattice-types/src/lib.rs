//! Shared types, adapter traits, and core utilities for the Lattice server.
//!
//! This crate contains the foundational types that are shared between the
//! server crate and all adapter implementations. Extracting these into a
//! separate crate allows adapter crates to compile in parallel with the
//! server's feature modules.

pub mod error;
pub mod meta_adapter;
pub mod prelude;
pub mod principal;
pub mod profile_client;
pub mod type_uri;
pub mod types;
pub mod utils;

// vim: ts=4
