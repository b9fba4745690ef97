//! Shared test fixtures for the post subsystem.

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use lattice_core::app::{App, AppBuilderOpts, AppState};
use lattice_core::notify::{NotificationEvent, Notifier};
use lattice_meta_adapter_sqlite::MetaAdapterSqlite;
use lattice_types::error::{Error, LtResult};
use lattice_types::meta_adapter::{CreateFollowerData, MAC_ALGORITHM};
use lattice_types::profile_client::{ProfileClient, ProfileDocument};

/// The post subsystem never discovers; any outbound call is a test bug.
#[derive(Debug)]
pub struct NullProfileClient;

#[async_trait]
impl ProfileClient for NullProfileClient {
	async fn discover(&self, _entity: &str) -> LtResult<Box<str>> {
		Err(Error::DiscoveryFailed)
	}

	async fn fetch_profile(&self, _profile_url: &str) -> LtResult<ProfileDocument> {
		Err(Error::DiscoveryFailed)
	}
}

pub async fn test_app() -> (App, flume::Receiver<NotificationEvent>, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	let (notifier, rx) = Notifier::channel();
	let app = AppState::new(
		AppBuilderOpts { entity: "https://smith.example.com".into(), listen: "127.0.0.1:0".into() },
		Arc::new(adapter),
		Arc::new(NullProfileClient),
		notifier,
	);

	(app, rx, temp_dir)
}

pub fn follower_data(entity: &str, groups: &[&str]) -> CreateFollowerData {
	CreateFollowerData {
		entity: entity.into(),
		public: true,
		profile: None,
		licenses: vec![],
		groups: groups.iter().map(|g| (*g).into()).collect(),
		profile_info_types: vec![],
		mac_key_id: "k-1234".into(),
		mac_key: "s-abcdef".into(),
		mac_algorithm: MAC_ALGORITHM.into(),
	}
}

// vim: ts=4
