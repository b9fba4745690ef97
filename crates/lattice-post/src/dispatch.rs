//! Notification dispatcher.
//!
//! On post creation: enumerate the followers subscribed to the post's type
//! base, check `can_notify` per candidate, and emit exactly one event per
//! passing follower. Recipients are computed from the permission rows as
//! they stand at dispatch time; dispatch is a set operation with no
//! ordering guarantee, and delivery is the bus consumer's concern.

use lattice_core::notify::NotificationEvent;
use lattice_core::visibility::{Resource, can_notify};
use lattice_types::meta_adapter::Post;
use lattice_types::principal::{FollowerIdentity, Principal};

use crate::prelude::*;

/// Returns the number of events emitted. A failure for one recipient is
/// logged and skipped; it never suppresses events to the others.
pub async fn dispatch_post(app: &App, post: &Post) -> LtResult<usize> {
	let candidates = app.meta_adapter.list_subscribed_followers(&post.typ.base).await?;
	let mut emitted = 0;

	for candidate in candidates {
		let follower = &candidate.follower;
		let principal = Principal::Follower(FollowerIdentity {
			follower_id: follower.follower_id,
			groups: follower.groups.to_vec(),
			profile_info_types: follower.profile_info_types.to_vec(),
		});

		match can_notify(app.meta_adapter.as_ref(), Resource::Post(post), &principal).await {
			Ok(true) => {
				let event = NotificationEvent {
					typ: post.typ.clone(),
					post_id: post.public_id.clone(),
					follower_id: follower.follower_id,
					view: candidate.view,
				};
				match app.notifier.emit(event) {
					Ok(()) => emitted += 1,
					Err(err) => {
						warn!(
							"Failed to emit notification for follower {}: {}",
							follower.follower_id, err
						);
					}
				}
			}
			Ok(false) => {}
			Err(err) => {
				warn!(
					"Skipping follower {} in dispatch of {}: {}",
					follower.follower_id, post.public_id, err
				);
			}
		}
	}

	debug!("Dispatched {} as {} events", post.public_id, emitted);
	Ok(emitted)
}

// vim: ts=4
