//! Follower subsystem. A follower is a remote entity this server pushes
//! content to; it comes into existence only through the discovery and
//! registration protocol and carries the credentials and subscriptions
//! that drive notification dispatch.

pub mod handler;
pub mod register;
pub mod subscription;
pub mod update;

mod prelude;

pub use register::{RegisterFollowerRequest, register_follower};
pub use subscription::{SubscriptionDiff, set_subscriptions};

// vim: ts=4
