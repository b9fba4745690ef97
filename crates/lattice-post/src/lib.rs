//! Post subsystem. Posts are typed content documents published by this
//! server's entity; creating one fans out notification events to the
//! followers whose subscriptions and grants match.

pub mod dispatch;
pub mod handler;
pub mod perm;
pub mod store;

mod prelude;

pub use dispatch::dispatch_post;
pub use perm::clone_permissions;

// vim: ts=4
