//! Notification subscription storage

use sqlx::{Row, SqlitePool, sqlite::SqliteRow};

use lattice::meta_adapter::*;
use lattice::prelude::*;
use lattice::type_uri::TypeDescriptor;

use crate::follower::follower_from_row;
use crate::utils::*;

fn view_from_str(s: &str) -> Result<View, sqlx::Error> {
	match s {
		"full" => Ok(View::Full),
		"meta" => Ok(View::Meta),
		_ => Err(sqlx::Error::RowNotFound),
	}
}

fn subscription_from_row(row: &SqliteRow) -> Result<NotificationSubscription, sqlx::Error> {
	let view: &str = row.try_get("view")?;
	Ok(NotificationSubscription {
		subscription_id: row.try_get("subscription_id")?,
		follower_id: row.try_get("follower_id")?,
		type_base: row.try_get("type_base")?,
		type_version: row.try_get("type_version")?,
		view: view_from_str(view)?,
		created_at: row.try_get("created_at").map(Timestamp)?,
	})
}

pub(crate) async fn list(
	db: &SqlitePool,
	follower_id: i64,
) -> LtResult<Vec<NotificationSubscription>> {
	let res = sqlx::query(
		"SELECT subscription_id, follower_id, type_base, type_version, view, created_at
		FROM notification_subscriptions WHERE follower_id = ?
		ORDER BY subscription_id",
	)
	.bind(follower_id)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(subscription_from_row))
}

/// Apply a subscription diff atomically: any failure rolls back the whole
/// diff, so a half-applied descriptor list cannot be observed.
pub(crate) async fn replace(
	db: &SqlitePool,
	follower_id: i64,
	remove_ids: &[i64],
	add: &[TypeDescriptor],
) -> LtResult<()> {
	let now = Timestamp::now();
	let mut tx = db.begin().await.map_err(|_| Error::DbError)?;

	for subscription_id in remove_ids {
		sqlx::query(
			"DELETE FROM notification_subscriptions WHERE subscription_id = ? AND follower_id = ?",
		)
		.bind(subscription_id)
		.bind(follower_id)
		.execute(&mut *tx)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	}

	for descriptor in add {
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
	Ok(())
}

/// One row per follower; SQLite's bare-column semantics with MIN() make
/// the earliest subscription's view the one that is returned.
pub(crate) async fn list_subscribed_followers(
	db: &SqlitePool,
	type_base: &str,
) -> LtResult<Vec<SubscribedFollower>> {
	let res = sqlx::query(
		"SELECT f.follower_id, f.public_uid, f.entity, f.public, f.profile, f.licenses,
		f.groups, f.profile_info_types, f.mac_key_id, f.mac_key, f.mac_algorithm,
		f.mac_timestamp_delta, f.created_at, ns.view, MIN(ns.subscription_id)
		FROM followers f
		JOIN notification_subscriptions ns ON ns.follower_id = f.follower_id
		WHERE ns.type_base = ?
		GROUP BY f.follower_id",
	)
	.bind(type_base)
	.fetch_all(db)
	.await
	.inspect_err(inspect)
	.map_err(|_| Error::DbError)?;

	collect_res(res.iter().map(|row| {
		let view: &str = row.try_get("view")?;
		Ok(SubscribedFollower { follower: follower_from_row(row)?, view: view_from_str(view)? })
	}))
}

pub(crate) async fn count(db: &SqlitePool) -> LtResult<u32> {
	let res = sqlx::query("SELECT COUNT(*) AS cnt FROM notification_subscriptions")
		.fetch_one(db)
		.await
		.inspect_err(inspect)
		.map_err(|_| Error::DbError)?;
	let count: i64 = res.try_get("cnt").map_err(|_| Error::DbError)?;
	Ok(count as u32)
}
