//! HTTP handlers for the profile surface.

use axum::{
	Json, Router,
	extract::{Path, State},
	http::StatusCode,
	routing::{get, put},
};
use serde::Deserialize;

use lattice_core::extract::Auth;
use lattice_types::principal::Scope;
use lattice_types::type_uri::TypeUri;

use crate::prelude::*;
use crate::read::visible_profile;
use crate::update::update_profile;

pub fn routes() -> Router<App> {
	Router::new()
		.route("/profile", get(get_profile))
		.route("/profile/{*type}", put(put_profile))
}

/// GET /profile - type-URI-keyed map of the visible info sections
async fn get_profile(
	State(app): State<App>,
	Auth(principal): Auth,
) -> LtResult<Json<serde_json::Map<String, serde_json::Value>>> {
	Ok(Json(visible_profile(&app, &principal).await?))
}

#[derive(Debug, Deserialize)]
struct UpdateProfileRequest {
	#[serde(default)]
	public: bool,
	#[serde(default)]
	content: serde_json::Value,
}

/// PUT /profile/:type - replace-update one info section
async fn put_profile(
	State(app): State<App>,
	Auth(principal): Auth,
	Path(typ): Path<String>,
	Json(req): Json<UpdateProfileRequest>,
) -> LtResult<(StatusCode, Json<serde_json::Value>)> {
	if !principal.has_scope(Scope::WriteProfile) {
		return Err(Error::PermissionDenied);
	}

	let typ = TypeUri::parse(&typ)?;
	let info = update_profile(&app, &typ, req.public, &req.content).await?;

	Ok((StatusCode::OK, Json(serde_json::json!(info))))
}

// vim: ts=4
