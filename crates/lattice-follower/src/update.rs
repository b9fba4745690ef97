//! Field-level authorized follower updates.
//!
//! Which fields a caller may mutate depends on who it is:
//!
//! - `write_followers` scope: licenses, entity, profile, public, groups
//! - plus `write_secrets`: the four MAC credential fields
//! - the follower itself: licenses only
//!
//! Disallowed fields present in a request are dropped, not an error; a
//! caller with no update rights at all is rejected. Subscription changes
//! (`types`) are not secret-sensitive and always route through the
//! subscription manager.

use serde::Deserialize;

use lattice_types::meta_adapter::{Follower, UpdateFollowerData};
use lattice_types::principal::{Principal, Scope};
use lattice_types::type_uri::TypeDescriptor;

use crate::prelude::*;
use crate::subscription::{SubscriptionDiff, set_subscriptions};

#[derive(Debug, Default, Deserialize)]
pub struct UpdateFollowerRequest {
	#[serde(flatten)]
	pub fields: UpdateFollowerData,
	/// Full replacement descriptor list for the notification subscriptions
	#[serde(default)]
	pub types: Option<Vec<Box<str>>>,
}

#[derive(Debug)]
pub struct UpdatedFollower {
	pub follower: Follower,
	pub subscription_diff: SubscriptionDiff,
}

/// Drop every field the principal may not mutate. Fails only when the
/// principal may not update this follower at all.
fn filter_fields(
	fields: &mut UpdateFollowerData,
	follower_id: i64,
	principal: &Principal,
) -> LtResult<()> {
	match principal {
		Principal::App(app) if app.has_scope(Scope::WriteFollowers) => {
			if !app.has_scope(Scope::WriteSecrets) {
				fields.mac_key_id.clear();
				fields.mac_key.clear();
				fields.mac_algorithm.clear();
				fields.mac_timestamp_delta.clear();
			}
			Ok(())
		}
		Principal::Follower(identity) if identity.follower_id == follower_id => {
			// Identity-based auth may not touch its own grants or credentials
			let licenses = std::mem::take(&mut fields.licenses);
			*fields = UpdateFollowerData { licenses, ..Default::default() };
			Ok(())
		}
		_ => Err(Error::PermissionDenied),
	}
}

pub async fn update_follower(
	app: &App,
	public_uid: &str,
	mut req: UpdateFollowerRequest,
	principal: &Principal,
) -> LtResult<UpdatedFollower> {
	let follower = app.meta_adapter.read_follower(public_uid).await?;

	filter_fields(&mut req.fields, follower.follower_id, principal)?;

	let follower = if req.fields.is_empty() {
		follower
	} else {
		app.meta_adapter.update_follower(follower.follower_id, &req.fields).await?
	};

	let subscription_diff = match &req.types {
		Some(types) => {
			let descriptors = TypeDescriptor::parse_all(types)?;
			set_subscriptions(app, follower.follower_id, &descriptors).await?
		}
		None => SubscriptionDiff::default(),
	};

	Ok(UpdatedFollower { follower, subscription_diff })
}


// vim: ts=4
