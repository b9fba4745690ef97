//! Visibility resolution for posts and profile info.
//!
//! `can_see` gates direct reads; `can_notify` gates notification dispatch.
//! The two differ in exactly one rule: a follower is never *notified* of a
//! non-original post (re-shares are not pushed), while a matching grant
//! still lets it *read* one. Both checks are side-effect free and issue
//! only read-only permission queries, so the dispatcher can call them once
//! per candidate recipient.

use lattice_types::meta_adapter::{MetaAdapter, Post, ProfileInfo, ResourceId};
use lattice_types::principal::{AppAuthorization, FollowerIdentity, Principal, Scope, allows_type_base};
use lattice_types::type_uri::TypeUri;

use crate::prelude::*;

/// A permissible resource, borrowed from storage
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
	Post(&'a Post),
	ProfileInfo(&'a ProfileInfo),
}

impl Resource<'_> {
	pub fn is_public(&self) -> bool {
		match self {
			Resource::Post(post) => post.public,
			Resource::ProfileInfo(info) => info.public,
		}
	}

	pub fn resource_id(&self) -> ResourceId {
		match self {
			Resource::Post(post) => ResourceId::Post(post.post_id),
			Resource::ProfileInfo(info) => ResourceId::ProfileInfo(info.info_id),
		}
	}

	pub fn typ(&self) -> &TypeUri {
		match self {
			Resource::Post(post) => &post.typ,
			Resource::ProfileInfo(info) => &info.typ,
		}
	}
}

/// Whether `principal` may read `resource`
pub async fn can_see(
	adapter: &dyn MetaAdapter,
	resource: Resource<'_>,
	principal: &Principal,
) -> LtResult<bool> {
	check(adapter, resource, principal, false).await
}

/// Whether `principal` may be notified of `resource`
pub async fn can_notify(
	adapter: &dyn MetaAdapter,
	resource: Resource<'_>,
	principal: &Principal,
) -> LtResult<bool> {
	check(adapter, resource, principal, true).await
}

async fn check(
	adapter: &dyn MetaAdapter,
	resource: Resource<'_>,
	principal: &Principal,
	for_notify: bool,
) -> LtResult<bool> {
	if resource.is_public() {
		return Ok(true);
	}

	match principal {
		// Anonymous access is handled entirely by the public fast path
		Principal::Anonymous => Ok(false),
		Principal::App(app) => Ok(check_app(resource, app)),
		Principal::Follower(follower) => check_follower(adapter, resource, follower, for_notify).await,
	}
}

/// Scope OR allowlist. The OR is deliberate: an allowlist that excludes a
/// type does not override a granted blanket scope.
fn check_app(resource: Resource<'_>, app: &AppAuthorization) -> bool {
	match resource {
		Resource::Post(post) => {
			app.has_scope(Scope::ReadPosts) || app.post_types.contains(&post.typ)
		}
		Resource::ProfileInfo(info) => {
			app.has_scope(Scope::ReadProfile)
				|| allows_type_base(&app.profile_info_types, &info.typ.base)
		}
	}
}

async fn check_follower(
	adapter: &dyn MetaAdapter,
	resource: Resource<'_>,
	follower: &FollowerIdentity,
	for_notify: bool,
) -> LtResult<bool> {
	match resource {
		Resource::Post(post) => {
			// Re-shares are never pushed to followers
			if for_notify && !post.original {
				return Ok(false);
			}
			adapter
				.has_follower_permission(
					ResourceId::Post(post.post_id),
					follower.follower_id,
					&follower.groups,
				)
				.await
		}
		Resource::ProfileInfo(info) => {
			Ok(allows_type_base(&follower.profile_info_types, &info.typ.base))
		}
	}
}

// vim: ts=4
