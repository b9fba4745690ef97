//! SQLite implementation of the Lattice meta adapter.
//!
//! One module per aggregate; this file wires them into the `MetaAdapter`
//! trait. The pool runs in WAL mode so permission reads stay lock-free
//! while registration commits write transactionally.

use async_trait::async_trait;
use sqlx::sqlite::{self, SqlitePool};
use std::path::Path;

use lattice::meta_adapter::{self, MetaAdapter};
use lattice::prelude::*;
use lattice::type_uri::{TypeDescriptor, TypeUri};

mod follower;
mod group;
mod permission;
mod post;
mod profile;
mod schema;
mod subscription;
mod utils;

use schema::init_db;

#[derive(Debug)]
pub struct MetaAdapterSqlite {
	db: SqlitePool,
}

impl MetaAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> LtResult<Self> {
		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		init_db(&db)
			.await
			.inspect_err(|err| error!("DbError: {:#?}", err))
			.or(Err(Error::DbError))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl MetaAdapter for MetaAdapterSqlite {
	// Posts
	//*******
	async fn create_post(&self, data: &meta_adapter::CreatePostData) -> LtResult<meta_adapter::Post> {
		post::create(&self.db, data).await
	}

	async fn read_post(&self, public_id: &str) -> LtResult<meta_adapter::Post> {
		post::read(&self.db, public_id).await
	}

	async fn list_posts(
		&self,
		opts: &meta_adapter::ListPostOptions,
	) -> LtResult<Vec<meta_adapter::Post>> {
		post::list(&self.db, opts).await
	}

	async fn update_post(
		&self,
		post_id: i64,
		data: &meta_adapter::UpdatePostData,
	) -> LtResult<meta_adapter::Post> {
		post::update(&self.db, post_id, data).await
	}

	async fn delete_post(&self, post_id: i64) -> LtResult<()> {
		post::delete(&self.db, post_id).await
	}

	// Profile info
	//**************
	async fn list_profile_info(&self) -> LtResult<Vec<meta_adapter::ProfileInfo>> {
		profile::list(&self.db).await
	}

	async fn read_profile_info(&self, type_base: &str) -> LtResult<meta_adapter::ProfileInfo> {
		profile::read(&self.db, type_base).await
	}

	async fn update_profile_info(
		&self,
		typ: &TypeUri,
		public: bool,
		content: &serde_json::Value,
	) -> LtResult<meta_adapter::ProfileInfo> {
		profile::update(&self.db, typ, public, content).await
	}

	// Permissions
	//*************
	async fn create_permission(
		&self,
		resource: meta_adapter::ResourceId,
		grant: &meta_adapter::CreatePermission,
	) -> LtResult<meta_adapter::Permission> {
		permission::create(&self.db, resource, grant).await
	}

	async fn list_permissions(
		&self,
		resource: meta_adapter::ResourceId,
	) -> LtResult<Vec<meta_adapter::Permission>> {
		permission::list(&self.db, resource).await
	}

	async fn has_follower_permission(
		&self,
		resource: meta_adapter::ResourceId,
		follower_id: i64,
		groups: &[Box<str>],
	) -> LtResult<bool> {
		permission::has_follower_permission(&self.db, resource, follower_id, groups).await
	}

	// Groups
	//********
	async fn create_group(&self, name: &str) -> LtResult<meta_adapter::Group> {
		group::create(&self.db, name).await
	}

	async fn list_groups(&self) -> LtResult<Vec<meta_adapter::Group>> {
		group::list(&self.db).await
	}

	async fn delete_group(&self, group_id: &str) -> LtResult<()> {
		group::delete(&self.db, group_id).await
	}

	// Followers
	//***********
	async fn create_follower(
		&self,
		data: &meta_adapter::CreateFollowerData,
		subscriptions: &[TypeDescriptor],
	) -> LtResult<meta_adapter::Follower> {
		follower::create(&self.db, data, subscriptions).await
	}

	async fn read_follower(&self, public_uid: &str) -> LtResult<meta_adapter::Follower> {
		follower::read(&self.db, public_uid).await
	}

	async fn read_follower_by_id(&self, follower_id: i64) -> LtResult<meta_adapter::Follower> {
		follower::read_by_id(&self.db, follower_id).await
	}

	async fn list_followers(
		&self,
		opts: &meta_adapter::ListFollowerOptions,
	) -> LtResult<Vec<meta_adapter::Follower>> {
		follower::list(&self.db, opts).await
	}

	async fn update_follower(
		&self,
		follower_id: i64,
		data: &meta_adapter::UpdateFollowerData,
	) -> LtResult<meta_adapter::Follower> {
		follower::update(&self.db, follower_id, data).await
	}

	async fn delete_follower(&self, follower_id: i64) -> LtResult<()> {
		follower::delete(&self.db, follower_id).await
	}

	async fn count_followers(&self) -> LtResult<u32> {
		follower::count(&self.db).await
	}

	// Notification subscriptions
	//****************************
	async fn list_subscriptions(
		&self,
		follower_id: i64,
	) -> LtResult<Vec<meta_adapter::NotificationSubscription>> {
		subscription::list(&self.db, follower_id).await
	}

	async fn replace_subscriptions(
		&self,
		follower_id: i64,
		remove_ids: &[i64],
		add: &[TypeDescriptor],
	) -> LtResult<()> {
		subscription::replace(&self.db, follower_id, remove_ids, add).await
	}

	async fn list_subscribed_followers(
		&self,
		type_base: &str,
	) -> LtResult<Vec<meta_adapter::SubscribedFollower>> {
		subscription::list_subscribed_followers(&self.db, type_base).await
	}

	async fn count_subscriptions(&self) -> LtResult<u32> {
		subscription::count(&self.db).await
	}
}

// vim: ts=4
