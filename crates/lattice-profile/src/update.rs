//! Profile info updates and their mirror posts.

use lattice_post::{clone_permissions, dispatch_post};
use lattice_types::meta_adapter::{CreatePostData, Post, ProfileInfo, ResourceId};
use lattice_types::type_uri::TypeUri;

use crate::prelude::*;

/// Type of the post that announces a profile info update
pub const PROFILE_UPDATE_POST_TYPE: &str = "https://tent.io/types/post/profile/v0.1.0";

/// Replace-update the info row for `typ`'s base, then announce the change:
/// a mirror post is created with a point-in-time copy of the info's
/// grants (so it is visible to exactly the parties the info is visible
/// to) and dispatched like any other post.
pub async fn update_profile(
	app: &App,
	typ: &TypeUri,
	public: bool,
	content: &serde_json::Value,
) -> LtResult<ProfileInfo> {
	let info = app.meta_adapter.update_profile_info(typ, public, content).await?;

	let post = create_update_post(app, &info).await?;
	info!("Profile info {} updated, announced as post {}", info.typ, post.public_id);

	Ok(info)
}

async fn create_update_post(app: &App, info: &ProfileInfo) -> LtResult<Post> {
	let typ = TypeUri::parse(PROFILE_UPDATE_POST_TYPE)?;
	let post = app
		.meta_adapter
		.create_post(&CreatePostData {
			entity: app.opts.entity.clone(),
			typ,
			licenses: vec![],
			content: serde_json::json!({
				"action": "update",
				"types": [info.typ.uri()],
			}),
			public: info.public,
			original: true,
			app_name: None,
			app_url: None,
		})
		.await?;

	clone_permissions(
		app,
		ResourceId::ProfileInfo(info.info_id),
		ResourceId::Post(post.post_id),
	)
	.await?;

	dispatch_post(app, &post).await?;
	Ok(post)
}

// vim: ts=4
