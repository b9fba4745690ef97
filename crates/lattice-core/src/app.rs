//! App state type

use std::sync::Arc;

use crate::notify::Notifier;
use crate::prelude::*;

use lattice_types::meta_adapter::MetaAdapter;
use lattice_types::profile_client::ProfileClient;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,
	pub notifier: Notifier,

	pub meta_adapter: Arc<dyn MetaAdapter>,
	pub profile_client: Arc<dyn ProfileClient>,
}

pub type App = Arc<AppState>;

impl AppState {
	pub fn new(
		opts: AppBuilderOpts,
		meta_adapter: Arc<dyn MetaAdapter>,
		profile_client: Arc<dyn ProfileClient>,
		notifier: Notifier,
	) -> App {
		Arc::new(AppState { opts, notifier, meta_adapter, profile_client })
	}
}

#[derive(Debug)]
pub struct AppBuilderOpts {
	/// The publishing entity URI this server serves
	pub entity: Box<str>,
	pub listen: Box<str>,
}

// vim: ts=4
