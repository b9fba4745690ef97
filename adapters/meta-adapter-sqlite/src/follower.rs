//! Follower storage
//!
//! `create` is the commit point of the registration protocol: the follower
//! row and its seeded subscriptions land in one transaction, so a failed
//! seeding unwinds the follower row and a duplicate entity surfaces as
//! `Conflict` with no rows behind.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use lattice::meta_adapter::*;
use lattice::prelude::*;
use lattice::type_uri::TypeDescriptor;
use lattice::utils::{PUBLIC_ID_LENGTH, random_id};

use crate::utils::*;

pub(crate) fn follower_from_row(row: &SqliteRow) -> Result<Follower, sqlx::Error> {
	let profile: Option<&str> = row.try_get("profile")?;
	let licenses: Option<&str> = row.try_get("licenses")?;
	let groups: Option<&str> = row.try_get("groups")?;
	let profile_info_types: Option<&str> = row.try_get("profile_info_types")?;
	Ok(Follower {
		follower_id: row.try_get("follower_id")?,
		public_uid: row.try_get("public_uid")?,
		entity: row.try_get("entity")?,
		public: row.try_get("public")?,
		profile: profile.and_then(|s| serde_json::from_str(s).ok()),
		licenses: parse_json_list(licenses),
		groups: parse_json_list(groups),
		profile_info_types: parse_json_list(profile_info_types),
		mac_key_id: row.try_get("mac_key_id")?,
		mac_key: row.try_get("mac_key")?,
		mac_algorithm: row.try_get("mac_algorithm")?,
		mac_timestamp_delta: row.try_get("mac_timestamp_delta")?,
		created_at: row.try_get("created_at").map(Timestamp)?,
	})
}

const FOLLOWER_COLUMNS: &str = "follower_id, public_uid, entity, public, profile, licenses,
	groups, profile_info_types, mac_key_id, mac_key, mac_algorithm, mac_timestamp_delta, created_at";

pub(crate) async fn create(
	db: &SqlitePool,
	data: &CreateFollowerData,
	subscriptions: &[TypeDescriptor],
) -> LtResult<Follower> {
	let public_uid = random_id(PUBLIC_ID_LENGTH)?;
	let now = Timestamp::now();

	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	let res = sqlx::query(
		"INSERT INTO followers (public_uid, entity, public, profile, licenses, groups,
		profile_info_types, mac_key_id, mac_key, mac_algorithm, created_at)
		VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING follower_id",
	)
	.bind(&public_uid)
	.bind(data.entity.as_ref())
	.bind(data.public)
	.bind(data.profile.as_ref().map(|p| p.to_string()))
	.bind(to_json_list(&data.licenses))
	.bind(to_json_list(&data.groups))
	.bind(to_json_list(&data.profile_info_types))
	.bind(data.mac_key_id.as_ref())
	.bind(data.mac_key.as_ref())
	.bind(data.mac_algorithm.as_ref())
	.bind(now.0)
	.fetch_one(&mut *tx)
	.await
	.map_err(|err| {
		if is_unique_violation(&err) {
			Error::Conflict
		} else {
			inspect(&err);
			Error::DbError
		}
	})?;
	let follower_id: i64 = res.try_get(0).map_err(|_| Error::DbError)?;

	for descriptor in subscriptions {
		sqlx::query(
			"INSERT INTO notification_subscriptions (follower_id, type_base, type_version, view, created_at)
			VALUES (?, ?, ?, ?, ?)",
		)
		.bind(follower_id)
		.bind(descriptor.uri.base.as_ref())
		.bind(descriptor.uri.version.as_deref())
		.bind(descriptor.view.as_str())
		.bind(now.0)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	}

	tx.commit().await.map_err(|_| Error::DbError)?;

	Ok(Follower {
		follower_id,
		public_uid: public_uid.into(),
		entity: data.entity.clone(),
		public: data.public,
		profile: data.profile.clone(),
		licenses: data.licenses.clone().into_boxed_slice(),
		groups: data.groups.clone().into_boxed_slice(),
		profile_info_types: data.profile_info_types.clone().into_boxed_slice(),
		mac_key_id: data.mac_key_id.clone(),
		mac_key: data.mac_key.clone(),
		mac_algorithm: data.mac_algorithm.clone(),
		mac_timestamp_delta: None,
		created_at: now,
	})
}

pub(crate) async fn read(db: &SqlitePool, public_uid: &str) -> LtResult<Follower> {
	let res = sqlx::query(&format!(
		"SELECT {} FROM followers WHERE public_uid = ?",
		FOLLOWER_COLUMNS
	))
	.bind(public_uid)
	.fetch_one(db)
	.await;

	map_res(res, |row| follower_from_row(&row))
}

pub(crate) async fn read_by_id(db: &SqlitePool, follower_id: i64) -> LtResult<Follower> {
	let res = sqlx::query(&format!(
		"SELECT {} FROM followers WHERE follower_id = ?",
		FOLLOWER_COLUMNS
	))
	.bind(follower_id)
	.fetch_one(db)
	.await;

	map_res(res, |row| follower_from_row(&row))
}

pub(crate) async fn list(db: &SqlitePool, opts: &ListFollowerOptions) -> LtResult<Vec<Follower>> {
	let mut query = sqlx::QueryBuilder::new(format!(
		"SELECT {} FROM followers WHERE 1=1",
		FOLLOWER_COLUMNS
	));

	if opts.public_only {
		query.push(" AND public = true");
	}
	if let Some(entity) = &opts.entity {
		query.push(" AND entity = ").push_bind(entity.as_ref());
	}

	query.push(" ORDER BY created_at, follower_id");
	query.push(" LIMIT ").push_bind(i64::from(opts.limit.unwrap_or(100)));

	let res = query
		.build()
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(follower_from_row))
}

pub(crate) async fn update(
	db: &SqlitePool,
	follower_id: i64,
	data: &UpdateFollowerData,
) -> LtResult<Follower> {
	if !data.is_empty() {
		let mut query = sqlx::QueryBuilder::new("UPDATE followers SET ");
		let mut has_updates = false;

		has_updates =
			push_patch!(query, has_updates, "entity", &data.entity, |v| v.as_ref().to_string());
		has_updates = push_patch!(query, has_updates, "profile", &data.profile, |v| v.to_string());
		has_updates = push_patch!(query, has_updates, "public", &data.public, |v| *v);
		has_updates = push_patch!(query, has_updates, "groups", &data.groups, |v| to_json_list(v));
		has_updates =
			push_patch!(query, has_updates, "licenses", &data.licenses, |v| to_json_list(v));
		has_updates = push_patch!(query, has_updates, "mac_key_id", &data.mac_key_id, |v| v
			.as_ref()
			.to_string());
		has_updates = push_patch!(query, has_updates, "mac_key", &data.mac_key, |v| v
			.as_ref()
			.to_string());
		has_updates = push_patch!(query, has_updates, "mac_algorithm", &data.mac_algorithm, |v| v
			.as_ref()
			.to_string());
		has_updates = push_patch!(
			query,
			has_updates,
			"mac_timestamp_delta",
			&data.mac_timestamp_delta,
			|v| *v
		);

		if has_updates {
			query.push(" WHERE follower_id = ").push_bind(follower_id);

			let res = query
				.build()
				.execute(db)
				.await
				.map_err(|err| {
					if is_unique_violation(&err) {
						Error::Conflict
					} else {
						inspect(&err);
						Error::DbError
					}
				})?;
			if res.rows_affected() == 0 {
				return Err(Error::NotFound);
			}
		}
	}

	read_by_id(db, follower_id).await
}

pub(crate) async fn delete(db: &SqlitePool, follower_id: i64) -> LtResult<()> {
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	sqlx::query("DELETE FROM notification_subscriptions WHERE follower_id = ?")
		.bind(follower_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	sqlx::query("DELETE FROM permissions WHERE follower_id = ?")
		.bind(follower_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	let res = sqlx::query("DELETE FROM followers WHERE follower_id = ?")
		.bind(follower_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}

	tx.commit().await.map_err(|_| Error::DbError)?;
	Ok(())
}

pub(crate) async fn count(db: &SqlitePool) -> LtResult<u32> {
	let res = sqlx::query("SELECT COUNT(*) AS cnt FROM followers")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	let count: i64 = res.try_get("cnt").map_err(|_| Error::DbError)?;
	Ok(count as u32)
}
