//! Permission cloning.

use lattice_types::meta_adapter::{CreatePermission, ResourceId};

use crate::prelude::*;

/// Copy every grant on `from` onto `to` as a point-in-time snapshot.
/// The copies are independent rows: later permission changes on the
/// source do not propagate.
pub async fn clone_permissions(app: &App, from: ResourceId, to: ResourceId) -> LtResult<usize> {
	let grants = app.meta_adapter.list_permissions(from).await?;

	for grant in &grants {
		app.meta_adapter
			.create_permission(
				to,
				&CreatePermission {
					group_id: grant.group_id.clone(),
					follower_id: grant.follower_id,
				},
			)
			.await?;
	}

	Ok(grants.len())
}

// vim: ts=4
