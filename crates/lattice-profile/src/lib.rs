//! Profile subsystem. Profile info documents describe this server's
//! entity, one per type base; every update is mirrored as a post so
//! followers with matching subscriptions learn about it through the
//! ordinary dispatch path.

pub mod handler;
pub mod read;
pub mod update;

mod prelude;

pub use update::{PROFILE_UPDATE_POST_TYPE, update_profile};

// vim: ts=4
