//! Adapter that stores and queries posts, profile info, followers,
//! permissions, and notification subscriptions.
//!
//! Every storage backend implements this trait. Multi-row commits
//! (`create_follower`, `replace_subscriptions`) are required to be atomic:
//! either every row lands or none does. `followers.entity` carries a
//! uniqueness constraint so concurrent registrations for one entity cannot
//! both succeed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::fmt::Debug;

use crate::prelude::*;
use crate::type_uri::{TypeDescriptor, TypeUri};

/// MAC algorithm issued to newly registered followers
pub const MAC_ALGORITHM: &str = "hmac-sha-256";

/// Identifies a permissible resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceId {
	Post(i64),
	ProfileInfo(i64),
}

// Posts //
//*******//

#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
pub struct Post {
	pub post_id: i64,
	/// Opaque external identifier; row ids never leave the server
	pub public_id: Box<str>,
	pub entity: Box<str>,
	#[serde(rename = "type")]
	pub typ: TypeUri,
	pub licenses: Box<[Box<str>]>,
	pub content: serde_json::Value,
	pub public: bool,
	/// Whether the post originated at this server (false = re-share)
	pub original: bool,
	pub app_name: Option<Box<str>>,
	pub app_url: Option<Box<str>>,
	pub published_at: Timestamp,
	pub received_at: Timestamp,
	pub updated_at: Option<Timestamp>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostData {
	pub entity: Box<str>,
	#[serde(rename = "type")]
	pub typ: TypeUri,
	#[serde(default)]
	pub licenses: Vec<Box<str>>,
	#[serde(default)]
	pub content: serde_json::Value,
	#[serde(default)]
	pub public: bool,
	#[serde(default)]
	pub original: bool,
	#[serde(default)]
	pub app_name: Option<Box<str>>,
	#[serde(default)]
	pub app_url: Option<Box<str>>,
}

/// Partial post update; only the owner-mutable fields. `published_at`
/// and `received_at` are fixed at creation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePostData {
	#[serde(default, rename = "type")]
	pub typ: Patch<TypeUri>,
	#[serde(default)]
	pub licenses: Patch<Vec<Box<str>>>,
	#[serde(default)]
	pub content: Patch<serde_json::Value>,
	#[serde(default)]
	pub public: Patch<bool>,
}

impl UpdatePostData {
	pub fn is_empty(&self) -> bool {
		self.typ.is_undefined()
			&& self.licenses.is_undefined()
			&& self.content.is_undefined()
			&& self.public.is_undefined()
	}
}

#[derive(Debug, Default)]
pub struct ListPostOptions {
	/// Only posts published strictly after this time
	pub since_time: Option<Timestamp>,
	/// Only posts published strictly before this time
	pub before_time: Option<Timestamp>,
	/// Restrict to these full type URIs
	pub post_types: Option<Vec<Box<str>>>,
	pub entity: Option<Box<str>>,
	pub limit: Option<u32>,
}

// Profile info //
//**************//

#[derive(Debug, Clone, Serialize)]
pub struct ProfileInfo {
	pub info_id: i64,
	#[serde(rename = "type")]
	pub typ: TypeUri,
	pub public: bool,
	pub content: serde_json::Value,
	pub created_at: Timestamp,
	pub updated_at: Option<Timestamp>,
}

// Permissions //
//*************//

/// A grant record linking a resource to a group or a specific follower.
/// Neither set means "public within the owner's default policy".
#[derive(Debug, Clone)]
pub struct Permission {
	pub permission_id: i64,
	pub resource: ResourceId,
	pub group_id: Option<Box<str>>,
	pub follower_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct CreatePermission {
	pub group_id: Option<Box<str>>,
	pub follower_id: Option<i64>,
}

// Groups //
//********//

#[derive(Debug, Clone, Serialize)]
pub struct Group {
	pub group_id: Box<str>,
	pub name: Box<str>,
	pub created_at: Timestamp,
}

// Followers //
//***********//

#[derive(Debug, Clone)]
pub struct Follower {
	pub follower_id: i64,
	pub public_uid: Box<str>,
	pub entity: Box<str>,
	pub public: bool,
	/// Cached remote profile document
	pub profile: Option<serde_json::Value>,
	pub licenses: Box<[Box<str>]>,
	pub groups: Box<[Box<str>]>,
	/// Profile-info type bases this follower may see, `"all"` as wildcard
	pub profile_info_types: Box<[Box<str>]>,
	pub mac_key_id: Box<str>,
	pub mac_key: Box<str>,
	pub mac_algorithm: Box<str>,
	pub mac_timestamp_delta: Option<i64>,
	pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateFollowerData {
	pub entity: Box<str>,
	pub public: bool,
	pub profile: Option<serde_json::Value>,
	pub licenses: Vec<Box<str>>,
	pub groups: Vec<Box<str>>,
	pub profile_info_types: Vec<Box<str>>,
	pub mac_key_id: Box<str>,
	pub mac_key: Box<str>,
	pub mac_algorithm: Box<str>,
}

/// Partial follower update. Field-level authorization happens above the
/// adapter: by the time this struct reaches storage, disallowed fields have
/// already been dropped to `Undefined`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFollowerData {
	#[serde(default)]
	pub entity: Patch<Box<str>>,
	#[serde(default)]
	pub profile: Patch<serde_json::Value>,
	#[serde(default)]
	pub public: Patch<bool>,
	#[serde(default)]
	pub groups: Patch<Vec<Box<str>>>,
	#[serde(default)]
	pub licenses: Patch<Vec<Box<str>>>,
	#[serde(default)]
	pub mac_key_id: Patch<Box<str>>,
	#[serde(default)]
	pub mac_key: Patch<Box<str>>,
	#[serde(default)]
	pub mac_algorithm: Patch<Box<str>>,
	#[serde(default)]
	pub mac_timestamp_delta: Patch<i64>,
}

impl UpdateFollowerData {
	/// True if no field carries a change
	pub fn is_empty(&self) -> bool {
		self.entity.is_undefined()
			&& self.profile.is_undefined()
			&& self.public.is_undefined()
			&& self.groups.is_undefined()
			&& self.licenses.is_undefined()
			&& self.mac_key_id.is_undefined()
			&& self.mac_key.is_undefined()
			&& self.mac_algorithm.is_undefined()
			&& self.mac_timestamp_delta.is_undefined()
	}
}

#[derive(Debug, Default)]
pub struct ListFollowerOptions {
	/// Restrict to followers with `public = true`
	pub public_only: bool,
	pub entity: Option<Box<str>>,
	pub limit: Option<u32>,
}

// Subscriptions //
//***************//

#[derive(Debug, Clone)]
pub struct NotificationSubscription {
	pub subscription_id: i64,
	pub follower_id: i64,
	pub type_base: Box<str>,
	pub type_version: Option<Box<str>>,
	pub view: View,
	pub created_at: Timestamp,
}

/// One dispatch candidate: a follower plus the view of its earliest
/// subscription matching the queried type base
#[derive(Debug, Clone)]
pub struct SubscribedFollower {
	pub follower: Follower,
	pub view: View,
}

/// A Lattice meta adapter
///
/// Every `MetaAdapter` implementation is required to implement this trait.
/// A `MetaAdapter` is responsible for storing and querying all content and
/// distribution metadata.
#[async_trait]
pub trait MetaAdapter: Debug + Send + Sync {
	/// # Posts
	async fn create_post(&self, data: &CreatePostData) -> LtResult<Post>;
	/// Reads a post by its public id
	async fn read_post(&self, public_id: &str) -> LtResult<Post>;
	async fn list_posts(&self, opts: &ListPostOptions) -> LtResult<Vec<Post>>;
	async fn update_post(&self, post_id: i64, data: &UpdatePostData) -> LtResult<Post>;
	/// Deletes a post and cascades its permission rows
	async fn delete_post(&self, post_id: i64) -> LtResult<()>;

	/// # Profile info
	async fn list_profile_info(&self) -> LtResult<Vec<ProfileInfo>>;
	/// Reads the info row for a type base
	async fn read_profile_info(&self, type_base: &str) -> LtResult<ProfileInfo>;
	/// Replace-updates the info row for `typ`'s base: supersedes any existing
	/// rows of the same base in the same transaction
	async fn update_profile_info(
		&self,
		typ: &TypeUri,
		public: bool,
		content: &serde_json::Value,
	) -> LtResult<ProfileInfo>;

	/// # Permissions
	async fn create_permission(
		&self,
		resource: ResourceId,
		grant: &CreatePermission,
	) -> LtResult<Permission>;
	async fn list_permissions(&self, resource: ResourceId) -> LtResult<Vec<Permission>>;
	/// True if any grant on `resource` names `follower_id` or one of `groups`
	async fn has_follower_permission(
		&self,
		resource: ResourceId,
		follower_id: i64,
		groups: &[Box<str>],
	) -> LtResult<bool>;

	/// # Groups
	async fn create_group(&self, name: &str) -> LtResult<Group>;
	async fn list_groups(&self) -> LtResult<Vec<Group>>;
	async fn delete_group(&self, group_id: &str) -> LtResult<()>;

	/// # Followers
	/// Creates the follower row and its seeded subscriptions in one
	/// transaction. A duplicate entity fails with `Error::Conflict` and
	/// leaves no rows behind.
	async fn create_follower(
		&self,
		data: &CreateFollowerData,
		subscriptions: &[TypeDescriptor],
	) -> LtResult<Follower>;
	/// Reads a follower by its public uid
	async fn read_follower(&self, public_uid: &str) -> LtResult<Follower>;
	async fn read_follower_by_id(&self, follower_id: i64) -> LtResult<Follower>;
	async fn list_followers(&self, opts: &ListFollowerOptions) -> LtResult<Vec<Follower>>;
	async fn update_follower(
		&self,
		follower_id: i64,
		data: &UpdateFollowerData,
	) -> LtResult<Follower>;
	/// Deletes a follower and cascades its subscriptions
	async fn delete_follower(&self, follower_id: i64) -> LtResult<()>;
	async fn count_followers(&self) -> LtResult<u32>;

	/// # Notification subscriptions
	async fn list_subscriptions(&self, follower_id: i64)
	-> LtResult<Vec<NotificationSubscription>>;
	/// Applies a subscription diff atomically: deletes `remove_ids`, inserts
	/// `add`. Any failure rolls the whole diff back.
	async fn replace_subscriptions(
		&self,
		follower_id: i64,
		remove_ids: &[i64],
		add: &[TypeDescriptor],
	) -> LtResult<()>;
	/// Followers holding at least one subscription for `type_base`, one row
	/// per follower (earliest subscription wins for the view)
	async fn list_subscribed_followers(&self, type_base: &str) -> LtResult<Vec<SubscribedFollower>>;
	async fn count_subscriptions(&self) -> LtResult<u32>;
}

// vim: ts=4
