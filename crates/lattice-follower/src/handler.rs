//! HTTP handlers for the followers surface.
//!
//! Existence hiding: an unprivileged caller cannot distinguish a private
//! follower from a missing one; both answer 403. Only callers holding the
//! relevant scope get a real 404.

use axum::{
	Json, Router,
	extract::{Path, Query, State},
	http::StatusCode,
	routing::get,
};
use serde::Deserialize;

use lattice_core::extract::Auth;
use lattice_types::meta_adapter::{Follower, ListFollowerOptions};
use lattice_types::principal::{Principal, Scope};

use crate::prelude::*;
use crate::register::{RegisterFollowerRequest, RegisteredFollower, register_follower};
use crate::update::{UpdateFollowerRequest, update_follower};

pub fn routes() -> Router<App> {
	Router::new()
		.route("/followers", get(get_followers).post(post_follower))
		.route(
			"/followers/{id}",
			get(get_follower).put(put_follower).delete(delete_follower),
		)
}

/// How much of a follower a response may carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowerView {
	Public,
	Full,
	Secrets,
}

fn follower_json(follower: &Follower, view: FollowerView) -> serde_json::Value {
	let mut json = serde_json::json!({
		"id": follower.public_uid,
		"entity": follower.entity,
		"public": follower.public,
		"licenses": follower.licenses,
		"groups": follower.groups,
		"created_at": follower.created_at,
	});

	if view == FollowerView::Full || view == FollowerView::Secrets {
		json["profile"] = follower.profile.clone().unwrap_or(serde_json::Value::Null);
		json["mac_key_id"] = serde_json::json!(follower.mac_key_id);
		json["mac_algorithm"] = serde_json::json!(follower.mac_algorithm);
	}
	if view == FollowerView::Secrets {
		json["mac_key"] = serde_json::json!(follower.mac_key);
		json["mac_timestamp_delta"] = serde_json::json!(follower.mac_timestamp_delta);
	}

	json
}

/// The error for a lookup miss: real 404 only for holders of `scope`
fn hide_missing(principal: &Principal, scope: Scope) -> Error {
	if principal.has_scope(scope) { Error::NotFound } else { Error::PermissionDenied }
}

fn is_self(principal: &Principal, follower: &Follower) -> bool {
	matches!(principal, Principal::Follower(identity) if identity.follower_id == follower.follower_id)
}

/// POST /followers - run the registration protocol
async fn post_follower(
	State(app): State<App>,
	Json(req): Json<RegisterFollowerRequest>,
) -> LtResult<(StatusCode, Json<RegisteredFollower>)> {
	let follower = register_follower(&app, &req).await?;
	Ok((StatusCode::OK, Json(RegisteredFollower::from(&follower))))
}

/// GET /followers - list, filtered to public unless scoped
async fn get_followers(
	State(app): State<App>,
	Auth(principal): Auth,
) -> LtResult<Json<Vec<serde_json::Value>>> {
	let privileged = principal.has_scope(Scope::ReadFollowers);
	let opts = ListFollowerOptions { public_only: !privileged, ..Default::default() };
	let followers = app.meta_adapter.list_followers(&opts).await?;

	let view = if privileged { FollowerView::Full } else { FollowerView::Public };
	Ok(Json(followers.iter().map(|f| follower_json(f, view)).collect()))
}

#[derive(Debug, Default, Deserialize)]
struct ReadSecretsQuery {
	#[serde(default)]
	read_secrets: bool,
}

/// GET /followers/:id
async fn get_follower(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
	Query(query): Query<ReadSecretsQuery>,
) -> LtResult<Json<serde_json::Value>> {
	let follower = match app.meta_adapter.read_follower(&id).await {
		Ok(follower) => follower,
		Err(Error::NotFound) => return Err(hide_missing(&principal, Scope::ReadFollowers)),
		Err(err) => return Err(err),
	};

	let scoped = principal.has_scope(Scope::ReadFollowers);
	let own = is_self(&principal, &follower);
	if !follower.public && !scoped && !own {
		return Err(Error::PermissionDenied);
	}

	let view = if scoped && query.read_secrets && principal.has_scope(Scope::ReadSecrets) {
		FollowerView::Secrets
	} else if scoped || own {
		FollowerView::Full
	} else {
		FollowerView::Public
	};

	Ok(Json(follower_json(&follower, view)))
}

/// PUT /followers/:id - partial update per field-level authorization
async fn put_follower(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
	Json(req): Json<UpdateFollowerRequest>,
) -> LtResult<Json<serde_json::Value>> {
	let updated = match update_follower(&app, &id, req, &principal).await {
		Ok(updated) => updated,
		Err(Error::NotFound) => return Err(hide_missing(&principal, Scope::WriteFollowers)),
		Err(err) => return Err(err),
	};

	Ok(Json(follower_json(&updated.follower, FollowerView::Full)))
}

/// DELETE /followers/:id - cascades the follower's subscriptions
async fn delete_follower(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(id): Path<String>,
) -> LtResult<StatusCode> {
	let follower = match app.meta_adapter.read_follower(&id).await {
		Ok(follower) => follower,
		Err(Error::NotFound) => return Err(hide_missing(&principal, Scope::WriteFollowers)),
		Err(err) => return Err(err),
	};

	if !principal.has_scope(Scope::WriteFollowers) && !is_self(&principal, &follower) {
		return Err(Error::PermissionDenied);
	}

	app.meta_adapter.delete_follower(follower.follower_id).await?;
	info!("Deleted follower {} ({})", follower.public_uid, follower.entity);
	Ok(StatusCode::OK)
}

// vim: ts=4
