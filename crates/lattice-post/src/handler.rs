//! HTTP handlers for the posts surface.

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	routing::get,
};
use serde::Deserialize;

use lattice_core::extract::Auth;
use lattice_types::meta_adapter::{
	CreatePermission, CreatePostData, ListFollowerOptions, ListPostOptions, Post, ResourceId,
	UpdatePostData,
};
use lattice_types::principal::{Principal, Scope};
use lattice_types::type_uri::TypeUri;

use crate::dispatch::dispatch_post;
use crate::prelude::*;
use crate::store;

pub fn routes() -> Router<App> {
	Router::new()
		.route("/posts", get(get_posts).post(post_post))
		.route("/posts/{id}", get(get_post).put(put_post).delete(delete_post))
}

/// Grants to attach to a new post: group ids and/or follower entity URIs
#[derive(Debug, Default, Deserialize)]
pub struct PostPermissionsRequest {
	#[serde(default)]
	pub groups: Vec<Box<str>>,
	#[serde(default)]
	pub entities: Vec<Box<str>>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
	#[serde(rename = "type")]
	pub typ: TypeUri,
	#[serde(default)]
	pub licenses: Vec<Box<str>>,
	#[serde(default)]
	pub content: serde_json::Value,
	#[serde(default)]
	pub public: bool,
	#[serde(default)]
	pub permissions: Option<PostPermissionsRequest>,
}

/// External JSON shape of a post; row ids stay internal
fn post_json(post: &Post) -> serde_json::Value {
	serde_json::json!({
		"id": post.public_id,
		"entity": post.entity,
		"type": post.typ,
		"licenses": post.licenses,
		"content": post.content,
		"published_at": post.published_at,
		"app": { "name": post.app_name, "url": post.app_url },
		"permissions": { "public": post.public },
	})
}

/// POST /posts - create a post and fan out notifications
async fn post_post(
	State(app): State<App>,
	Auth(principal): Auth,
	Json(req): Json<CreatePostRequest>,
) -> LtResult<(StatusCode, Json<serde_json::Value>)> {
	if !principal.has_scope(Scope::WritePosts) {
		return Err(Error::PermissionDenied);
	}

	let data = CreatePostData {
		entity: app.opts.entity.clone(),
		typ: req.typ,
		licenses: req.licenses,
		content: req.content,
		public: req.public,
		original: true,
		app_name: None,
		app_url: None,
	};
	let post = app.meta_adapter.create_post(&data).await?;

	if let Some(permissions) = &req.permissions {
		apply_grants(&app, ResourceId::Post(post.post_id), permissions).await?;
	}

	let emitted = dispatch_post(&app, &post).await?;
	info!("Created post {} ({}), {} notifications", post.public_id, post.typ, emitted);

	Ok((StatusCode::OK, Json(post_json(&post))))
}

async fn apply_grants(
	app: &App,
	resource: ResourceId,
	permissions: &PostPermissionsRequest,
) -> LtResult<()> {
	for group_id in &permissions.groups {
		app.meta_adapter
			.create_permission(
				resource,
				&CreatePermission { group_id: Some(group_id.clone()), follower_id: None },
			)
			.await?;
	}

	for entity in &permissions.entities {
		let opts = ListFollowerOptions { entity: Some(entity.clone()), ..Default::default() };
		let followers = app.meta_adapter.list_followers(&opts).await?;
		let Some(follower) = followers.first() else {
			return Err(Error::ValidationError(format!("unknown follower entity '{}'", entity)));
		};
		app.meta_adapter
			.create_permission(
				resource,
				&CreatePermission { group_id: None, follower_id: Some(follower.follower_id) },
			)
			.await?;
	}

	Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct ListPostsQuery {
	since_time: Option<i64>,
	before_time: Option<i64>,
	/// Comma-separated full type URIs
	post_types: Option<String>,
	limit: Option<u32>,
}

/// GET /posts - list, visibility-filtered per principal
async fn get_posts(
	State(app): State<App>,
	Auth(principal): Auth,
	Query(query): Query<ListPostsQuery>,
) -> LtResult<Json<Vec<serde_json::Value>>> {
	let opts = ListPostOptions {
		since_time: query.since_time.map(Timestamp),
		before_time: query.before_time.map(Timestamp),
		post_types: query
			.post_types
			.map(|types| types.split(',').map(|t| t.trim().into()).collect()),
		entity: None,
		limit: query.limit,
	};

	let posts = store::list_visible(&app, &opts, &principal).await?;
	Ok(Json(posts.iter().map(post_json).collect()))
}

/// GET /posts/:id
async fn get_post(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
) -> LtResult<Json<serde_json::Value>> {
	let post = store::read_visible(&app, &id, &principal).await?;
	Ok(Json(post_json(&post)))
}

/// PUT /posts/:id - owner only; mutates content/type/licenses/public
async fn put_post(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
	Json(req): Json<UpdatePostData>,
) -> LtResult<Json<serde_json::Value>> {
	if !principal.has_scope(Scope::WritePosts) {
		return Err(Error::PermissionDenied);
	}

	let post = app.meta_adapter.read_post(&id).await?;
	let post = app.meta_adapter.update_post(post.post_id, &req).await?;
	Ok(Json(post_json(&post)))
}

/// DELETE /posts/:id - owner only; cascades permission rows
async fn delete_post(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
) -> LtResult<StatusCode> {
	if !principal.has_scope(Scope::WritePosts) {
		return Err(Error::PermissionDenied);
	}

	let post = app.meta_adapter.read_post(&id).await?;
	app.meta_adapter.delete_post(post.post_id).await?;
	info!("Deleted post {}", post.public_id);
	Ok(StatusCode::OK)
}

// vim: ts=4
