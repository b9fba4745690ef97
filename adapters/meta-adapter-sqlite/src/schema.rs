//! Database schema initialization
//!
//! Creates tables and indexes on startup. The UNIQUE constraint on
//! `followers.entity` is what makes concurrent registrations for one
//! entity race safely: the second writer fails cleanly inside its
//! transaction.

use sqlx::SqlitePool;

/// Initialize the database schema with all required tables and indexes
pub(crate) async fn init_db(db: &SqlitePool) -> Result<(), sqlx::Error> {
	let mut tx = db.begin().await?;

	// Posts
	//*******
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS posts (
		post_id integer PRIMARY KEY,
		public_id text NOT NULL UNIQUE,
		entity text NOT NULL,
		type_base text NOT NULL,
		type_version text,
		licenses json,
		content json,
		public boolean NOT NULL DEFAULT false,
		original boolean NOT NULL DEFAULT false,
		app_name text,
		app_url text,
		published_at datetime NOT NULL,
		received_at datetime NOT NULL,
		updated_at datetime
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_type_base ON posts(type_base)")
		.execute(&mut *tx)
		.await?;
	sqlx::query("CREATE INDEX IF NOT EXISTS idx_posts_published_at ON posts(published_at)")
		.execute(&mut *tx)
		.await?;

	// Profile info
	//**************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS profile_info (
		info_id integer PRIMARY KEY,
		type_base text NOT NULL,
		type_version text,
		public boolean NOT NULL DEFAULT false,
		content json,
		created_at datetime NOT NULL,
		updated_at datetime
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE UNIQUE INDEX IF NOT EXISTS idx_profile_info_type_base ON profile_info(type_base)",
	)
	.execute(&mut *tx)
	.await?;

	// Permissions
	//*************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS permissions (
		permission_id integer PRIMARY KEY,
		resource_kind char(1) NOT NULL,
		resource_id integer NOT NULL,
		group_id text,
		follower_id integer
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_permissions_resource ON permissions(resource_kind, resource_id)",
	)
	.execute(&mut *tx)
	.await?;

	// Groups
	//********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS groups (
		group_id text PRIMARY KEY,
		name text NOT NULL,
		created_at datetime NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Followers
	//***********
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS followers (
		follower_id integer PRIMARY KEY,
		public_uid text NOT NULL UNIQUE,
		entity text NOT NULL UNIQUE,
		public boolean NOT NULL DEFAULT false,
		profile json,
		licenses json,
		groups json,
		profile_info_types json,
		mac_key_id text NOT NULL,
		mac_key text NOT NULL,
		mac_algorithm text NOT NULL,
		mac_timestamp_delta integer,
		created_at datetime NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;

	// Notification subscriptions
	//****************************
	sqlx::query(
		"CREATE TABLE IF NOT EXISTS notification_subscriptions (
		subscription_id integer PRIMARY KEY,
		follower_id integer NOT NULL REFERENCES followers(follower_id),
		type_base text NOT NULL,
		type_version text,
		view text NOT NULL,
		created_at datetime NOT NULL
	)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_subscriptions_type_base ON notification_subscriptions(type_base)",
	)
	.execute(&mut *tx)
	.await?;
	sqlx::query(
		"CREATE INDEX IF NOT EXISTS idx_subscriptions_follower ON notification_subscriptions(follower_id)",
	)
	.execute(&mut *tx)
	.await?;

	tx.commit().await?;
	Ok(())
}
