//! Follower discovery and registration protocol.
//!
//! A linear state machine, each step terminal on failure:
//!
//! 1. discover the profile link for the requested entity (HEAD)
//! 2. fetch the profile document (GET)
//! 3. verify the document's entity matches the requested entity
//! 4. issue fresh MAC credentials
//! 5. commit the follower row plus its seeded subscriptions atomically
//!
//! The protocol performs no retries of its own: a transient network
//! failure surfaces immediately as `DiscoveryFailed` so the caller
//! controls backoff. Up to the commit the flow holds no state, so a
//! caller aborting the request leaves nothing behind; the commit itself
//! is a single storage transaction.

use serde::{Deserialize, Serialize};

use lattice_types::meta_adapter::{CreateFollowerData, Follower, MAC_ALGORITHM};
use lattice_types::profile_client::core_info_entity;
use lattice_types::type_uri::TypeDescriptor;
use lattice_types::utils::{MAC_KEY_ID_LENGTH, MAC_KEY_LENGTH, canonical_entity, random_id};

use crate::prelude::*;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterFollowerRequest {
	pub entity: Box<str>,
	#[serde(default)]
	pub licenses: Vec<Box<str>>,
	/// Type descriptors to seed the subscription set from
	#[serde(default)]
	pub types: Vec<Box<str>>,
}

/// Registration response; the only place `mac_key` is disclosed in full
#[derive(Debug, Serialize)]
pub struct RegisteredFollower {
	pub id: Box<str>,
	pub mac_key_id: Box<str>,
	pub mac_key: Box<str>,
	pub mac_algorithm: Box<str>,
}

impl From<&Follower> for RegisteredFollower {
	fn from(follower: &Follower) -> Self {
		RegisteredFollower {
			id: follower.public_uid.clone(),
			mac_key_id: follower.mac_key_id.clone(),
			mac_key: follower.mac_key.clone(),
			mac_algorithm: follower.mac_algorithm.clone(),
		}
	}
}

pub async fn register_follower(app: &App, req: &RegisterFollowerRequest) -> LtResult<Follower> {
	// Malformed descriptors fail before any network traffic
	let descriptors = TypeDescriptor::parse_all(&req.types)?;

	// 1. Discover
	let profile_url = app.profile_client.discover(&req.entity).await?;
	debug!("Discovered profile for {} at {}", req.entity, profile_url);

	// 2. Fetch profile
	let document = app.profile_client.fetch_profile(&profile_url).await?;

	// 3. Verify identity. Discovery can be redirected or spoofed; without
	// this check a caller could register under an entity it does not
	// control.
	let profile_entity = core_info_entity(&document).ok_or(Error::DiscoveryFailed)?;
	if canonical_entity(profile_entity) != canonical_entity(&req.entity) {
		warn!(
			"Registration identity mismatch: requested {}, profile claims {}",
			req.entity, profile_entity
		);
		return Err(Error::IdentityMismatch);
	}

	// 4. Issue credentials
	let mac_key_id = random_id(MAC_KEY_ID_LENGTH)?;
	let mac_key = random_id(MAC_KEY_LENGTH)?;

	// 5. Commit follower + seeded subscriptions in one transaction
	let data = CreateFollowerData {
		entity: req.entity.clone(),
		public: true,
		profile: serde_json::to_value(&document).ok(),
		licenses: req.licenses.clone(),
		groups: vec![],
		profile_info_types: vec![],
		mac_key_id: mac_key_id.into(),
		mac_key: mac_key.into(),
		mac_algorithm: MAC_ALGORITHM.into(),
	};
	let follower = app.meta_adapter.create_follower(&data, &descriptors).await?;

	info!(
		"Registered follower {} ({}) with {} subscriptions",
		follower.public_uid,
		follower.entity,
		descriptors.len()
	);
	Ok(follower)
}

// vim: ts=4
