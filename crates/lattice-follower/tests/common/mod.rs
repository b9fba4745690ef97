//! Shared test fixtures: a tempdir-backed app and a scripted discovery
//! client standing in for the network.

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use lattice_core::app::{App, AppBuilderOpts, AppState};
use lattice_core::notify::{NotificationEvent, Notifier};
use lattice_meta_adapter_sqlite::MetaAdapterSqlite;
use lattice_types::error::{Error, LtResult};
use lattice_types::profile_client::{CORE_INFO_TYPE, ProfileClient, ProfileDocument};

/// Discovery client scripted per test: `None` at either step means that
/// step fails with `DiscoveryFailed`.
#[derive(Debug, Default)]
pub struct ScriptedProfileClient {
	pub profile_url: Option<Box<str>>,
	pub document: Option<ProfileDocument>,
}

#[async_trait]
impl ProfileClient for ScriptedProfileClient {
	async fn discover(&self, _entity: &str) -> LtResult<Box<str>> {
		self.profile_url.clone().ok_or(Error::DiscoveryFailed)
	}

	async fn fetch_profile(&self, _profile_url: &str) -> LtResult<ProfileDocument> {
		self.document.clone().ok_or(Error::DiscoveryFailed)
	}
}

/// Profile document whose core info section claims `entity`
pub fn profile_document(entity: &str) -> ProfileDocument {
	let mut doc = ProfileDocument::new();
	doc.insert(
		CORE_INFO_TYPE.into(),
		serde_json::json!({
			"entity": entity,
			"licenses": ["http://creativecommons.org/licenses/by/3.0/"],
			"servers": [format!("{}/tent", entity)],
		}),
	);
	doc
}

/// Discovery script for a well-behaved remote at `entity`
pub fn discoverable(entity: &str) -> ScriptedProfileClient {
	ScriptedProfileClient {
		profile_url: Some(format!("{}/tent/profile", entity).into()),
		document: Some(profile_document(entity)),
	}
}

pub async fn test_app(
	client: ScriptedProfileClient,
) -> (App, flume::Receiver<NotificationEvent>, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = MetaAdapterSqlite::new(temp_dir.path().join("meta.db"))
		.await
		.expect("Failed to create adapter");

	let (notifier, rx) = Notifier::channel();
	let app = AppState::new(
		AppBuilderOpts { entity: "https://smith.example.com".into(), listen: "127.0.0.1:0".into() },
		Arc::new(adapter),
		Arc::new(client),
		notifier,
	);

	(app, rx, temp_dir)
}

// vim: ts=4
