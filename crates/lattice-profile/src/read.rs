//! Visibility-aware profile reads.

use lattice_core::visibility::{Resource, can_see};
use lattice_types::meta_adapter::{ProfileInfo, ResourceId};
use lattice_types::principal::{Principal, Scope};

use crate::prelude::*;

/// The profile as `principal` may see it: a map keyed by full info type
/// URI. Permission detail (granted groups and follower entities) is
/// included only for holders of `read_permissions`.
pub async fn visible_profile(
	app: &App,
	principal: &Principal,
) -> LtResult<serde_json::Map<String, serde_json::Value>> {
	let infos = app.meta_adapter.list_profile_info().await?;
	let include_detail = principal.has_scope(Scope::ReadPermissions);

	let mut profile = serde_json::Map::new();
	for info in infos {
		if !can_see(app.meta_adapter.as_ref(), Resource::ProfileInfo(&info), principal).await? {
			continue;
		}

		let mut entry = match &info.content {
			serde_json::Value::Object(content) => content.clone(),
			_ => serde_json::Map::new(),
		};
		entry.insert("permissions".to_string(), permissions_json(app, &info, include_detail).await?);
		profile.insert(info.typ.uri(), serde_json::Value::Object(entry));
	}

	Ok(profile)
}

async fn permissions_json(
	app: &App,
	info: &ProfileInfo,
	include_detail: bool,
) -> LtResult<serde_json::Value> {
	if !include_detail {
		return Ok(serde_json::json!({ "public": info.public }));
	}

	let grants = app.meta_adapter.list_permissions(ResourceId::ProfileInfo(info.info_id)).await?;

	let mut groups = Vec::new();
	let mut entities = serde_json::Map::new();
	for grant in grants {
		if let Some(group_id) = grant.group_id {
			groups.push(serde_json::Value::String(group_id.to_string()));
		}
		if let Some(follower_id) = grant.follower_id {
			let follower = app.meta_adapter.read_follower_by_id(follower_id).await?;
			entities.insert(follower.entity.to_string(), serde_json::Value::Bool(true));
		}
	}

	Ok(serde_json::json!({
		"public": info.public,
		"groups": groups,
		"entities": entities,
	}))
}

// vim: ts=4
