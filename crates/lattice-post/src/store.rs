//! Visibility-aware post access.

use lattice_core::visibility::{Resource, can_see};
use lattice_types::meta_adapter::{ListPostOptions, Post};
use lattice_types::principal::Principal;

use crate::prelude::*;

/// Read a post, applying the visibility rules for `principal`. An
/// invisible post answers `NotFound`: unlike followers, posts carry no
/// scope that would justify revealing their existence.
pub async fn read_visible(app: &App, public_id: &str, principal: &Principal) -> LtResult<Post> {
	let post = app.meta_adapter.read_post(public_id).await?;
	if !can_see(app.meta_adapter.as_ref(), Resource::Post(&post), principal).await? {
		return Err(Error::NotFound);
	}
	Ok(post)
}

/// List posts matching `opts`, filtered down to what `principal` may see
pub async fn list_visible(
	app: &App,
	opts: &ListPostOptions,
	principal: &Principal,
) -> LtResult<Vec<Post>> {
	let posts = app.meta_adapter.list_posts(opts).await?;

	let mut visible = Vec::with_capacity(posts.len());
	for post in posts {
		if can_see(app.meta_adapter.as_ref(), Resource::Post(&post), principal).await? {
			visible.push(post);
		}
	}
	Ok(visible)
}

// vim: ts=4
