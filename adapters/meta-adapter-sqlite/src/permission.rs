//! Permission grant storage

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use lattice::meta_adapter::*;
use lattice::prelude::*;

use crate::utils::*;

pub(crate) fn resource_kind(resource: ResourceId) -> (&'static str, i64) {
	match resource {
		ResourceId::Post(id) => ("P", id),
		ResourceId::ProfileInfo(id) => ("I", id),
	}
}

fn permission_from_row(row: &SqliteRow) -> Result<Permission, sqlx::Error> {
	let kind: &str = row.try_get("resource_kind")?;
	let resource_id: i64 = row.try_get("resource_id")?;
	let resource = match kind {
		"P" => ResourceId::Post(resource_id),
		"I" => ResourceId::ProfileInfo(resource_id),
		_ => return Err(sqlx::Error::RowNotFound),
	};
	Ok(Permission {
		permission_id: row.try_get("permission_id")?,
		resource,
		group_id: row.try_get("group_id")?,
		follower_id: row.try_get("follower_id")?,
	})
}

pub(crate) async fn create(
	db: &SqlitePool,
	resource: ResourceId,
	grant: &CreatePermission,
) -> LtResult<Permission> {
	let (kind, resource_id) = resource_kind(resource);

	let res = sqlx::query(
		"INSERT INTO permissions (resource_kind, resource_id, group_id, follower_id)
		VALUES (?, ?, ?, ?) RETURNING permission_id",
	)
	.bind(kind)
	.bind(resource_id)
	.bind(grant.group_id.as_deref())
	.bind(grant.follower_id)
	.fetch_one(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;
	let permission_id: i64 = res.try_get(0).map_err(|_| Error::DbError)?;

	Ok(Permission {
		permission_id,
		resource,
		group_id: grant.group_id.clone(),
		follower_id: grant.follower_id,
	})
}

pub(crate) async fn list(db: &SqlitePool, resource: ResourceId) -> LtResult<Vec<Permission>> {
	let (kind, resource_id) = resource_kind(resource);

	let res = sqlx::query(
		"SELECT permission_id, resource_kind, resource_id, group_id, follower_id
		FROM permissions WHERE resource_kind = ? AND resource_id = ?",
	)
	.bind(kind)
	.bind(resource_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(permission_from_row))
}

pub(crate) async fn has_follower_permission(
	db: &SqlitePool,
	resource: ResourceId,
	follower_id: i64,
	groups: &[Box<str>],
) -> LtResult<bool> {
	let (kind, resource_id) = resource_kind(resource);

	let mut query = sqlx::QueryBuilder::new(
		"SELECT COUNT(*) AS cnt FROM permissions WHERE resource_kind = ",
	);
	query.push_bind(kind);
	query.push(" AND resource_id = ").push_bind(resource_id);
	query.push(" AND (follower_id = ").push_bind(follower_id);
	if !groups.is_empty() {
		query.push(" OR group_id IN ");
		query = push_in(query, groups);
	}
	query.push(")");

	let res = query
		.build()
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	let count: i64 = res.try_get("cnt").map_err(|_| Error::DbError)?;

	Ok(count > 0)
}
