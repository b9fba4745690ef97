//! Group storage

use sqlx::{Row, SqlitePool};

use lattice::meta_adapter::*;
use lattice::prelude::*;
use lattice::utils::{PUBLIC_ID_LENGTH, random_id};

use crate::utils::*;

pub(crate) async fn create(db: &SqlitePool, name: &str) -> LtResult<Group> {
	let group_id = random_id(PUBLIC_ID_LENGTH)?;
	let now = Timestamp::now();

	sqlx::query("INSERT INTO groups (group_id, name, created_at) VALUES (?, ?, ?)")
		.bind(&group_id)
		.bind(name)
		.bind(now.0)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	Ok(Group { group_id: group_id.into(), name: name.into(), created_at: now })
}

pub(crate) async fn list(db: &SqlitePool) -> LtResult<Vec<Group>> {
	let res = sqlx::query("SELECT group_id, name, created_at FROM groups ORDER BY name")
		.fetch_all(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(|row| {
		Ok(Group {
			group_id: row.try_get("group_id")?,
			name: row.try_get("name")?,
			created_at: row.try_get("created_at").map(Timestamp)?,
		})
	}))
}

pub(crate) async fn delete(db: &SqlitePool, group_id: &str) -> LtResult<()> {
	let res = sqlx::query("DELETE FROM groups WHERE group_id = ?")
		.bind(group_id)
		.execute(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	if res.rows_affected() == 0 {
		return Err(Error::NotFound);
	}
	Ok(())
}
