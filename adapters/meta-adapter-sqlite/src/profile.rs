//! Profile info storage
//!
//! At most one row per type base. Updates are replace-updates: the
//! surviving row keeps its id (so permission grants attached to it stay
//! valid) and any stray duplicate rows of the same base are destroyed in
//! the same transaction.

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use lattice::meta_adapter::*;
use lattice::prelude::*;
use lattice::type_uri::TypeUri;

use crate::utils::*;

fn info_from_row(row: &SqliteRow) -> Result<ProfileInfo, sqlx::Error> {
	let content: Option<&str> = row.try_get("content")?;
	Ok(ProfileInfo {
		info_id: row.try_get("info_id")?,
		typ: TypeUri {
			base: row.try_get("type_base")?,
			version: row.try_get("type_version")?,
		},
		public: row.try_get("public")?,
		content: content
			.and_then(|s| serde_json::from_str(s).ok())
			.unwrap_or(serde_json::Value::Null),
		created_at: row.try_get("created_at").map(Timestamp)?,
		updated_at: row.try_get::<Option<i64>, _>("updated_at")?.map(Timestamp),
	})
}

pub(crate) async fn list(db: &SqlitePool) -> LtResult<Vec<ProfileInfo>> {
	let res = sqlx::query(
		"SELECT info_id, type_base, type_version, public, content, created_at, updated_at
		FROM profile_info ORDER BY type_base",
	)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(info_from_row))
}

pub(crate) async fn read(db: &SqlitePool, type_base: &str) -> LtResult<ProfileInfo> {
	let res = sqlx::query(
		"SELECT info_id, type_base, type_version, public, content, created_at, updated_at
		FROM profile_info WHERE type_base = ?",
	)
	.bind(type_base)
	.fetch_one(db)
	.await;

	map_res(res, |row| info_from_row(&row))
}

pub(crate) async fn update(
	db: &SqlitePool,
	typ: &TypeUri,
	public: bool,
	content: &serde_json::Value,
) -> LtResult<ProfileInfo> {
	let now = Timestamp::now();
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	let existing = sqlx::query(
		"SELECT info_id, created_at FROM profile_info WHERE type_base = ?
		ORDER BY info_id LIMIT 1",
	)
	.bind(typ.base.as_ref())
	.fetch_optional(&mut *tx)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	let info = match existing {
		Some(row) => {
			let info_id: i64 = row.try_get("info_id").map_err(|_| Error::DbError)?;
			let created_at: i64 = row.try_get("created_at").map_err(|_| Error::DbError)?;

			// Stray duplicates of the same base are superseded
			sqlx::query("DELETE FROM profile_info WHERE type_base = ? AND info_id != ?")
				.bind(typ.base.as_ref())
				.bind(info_id)
				.execute(&mut *tx)
				.await
				.inspect_err(inspect)
				.map_err(|_| Error::DbError)?;

			sqlx::query(
				"UPDATE profile_info SET type_version = ?, public = ?, content = ?, updated_at = ?
				WHERE info_id = ?",
			)
			.bind(typ.version.as_deref())
			.bind(public)
			.bind(content.to_string())
			.bind(now.0)
			.bind(info_id)
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;

			ProfileInfo {
				info_id,
				typ: typ.clone(),
				public,
				content: content.clone(),
				created_at: Timestamp(created_at),
				updated_at: Some(now),
			}
		}
		None => {
			let res = sqlx::query(
				"INSERT INTO profile_info (type_base, type_version, public, content, created_at)
				VALUES (?, ?, ?, ?, ?) RETURNING info_id",
			)
			.bind(typ.base.as_ref())
			.bind(typ.version.as_deref())
			.bind(public)
			.bind(content.to_string())
			.bind(now.0)
			.fetch_one(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|_| Error::DbError)?;
			let info_id: i64 = res.try_get(0).map_err(|_| Error::DbError)?;

			ProfileInfo {
				info_id,
				typ: typ.clone(),
				public,
				content: content.clone(),
				created_at: now,
				updated_at: None,
			}
		}
	};

	tx.commit().await.map_err(|_| Error::DbError)?;
	Ok(info)
}
