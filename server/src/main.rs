//! Lattice server binary.
//!
//! Wires the SQLite meta adapter, the reqwest discovery client, the
//! notification bus, and the feature routers into one axum process.
//! Configuration comes from the environment:
//!
//! - `ENTITY`      entity URI this server publishes as (required)
//! - `LISTEN`      listen address, default `127.0.0.1:8800`
//! - `DB_DIR`      database directory, default `./data`
//! - `AUTH_TOKENS` path to a bearer-token → principal JSON map (optional)
//! - `RUST_LOG`    tracing filter, default `info`

mod auth;

use axum::{Router, middleware};
use std::{env, path::PathBuf, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use lattice_core::app::{App, AppBuilderOpts, AppState};
use lattice_core::notify::Notifier;
use lattice_core::request::HttpProfileClient;
use lattice_meta_adapter_sqlite::MetaAdapterSqlite;
use lattice_types::error::{Error, LtResult};

struct Config {
	entity: Box<str>,
	listen: Box<str>,
	db_dir: PathBuf,
	auth_tokens: Option<PathBuf>,
}

impl Config {
	fn from_env() -> LtResult<Self> {
		let entity = env::var("ENTITY")
			.map_err(|_| Error::ValidationError("ENTITY must be set".to_string()))?;
		Ok(Config {
			entity: entity.into(),
			listen: env::var("LISTEN").unwrap_or_else(|_| "127.0.0.1:8800".to_string()).into(),
			db_dir: PathBuf::from(env::var("DB_DIR").unwrap_or_else(|_| "./data".to_string())),
			auth_tokens: env::var("AUTH_TOKENS").ok().map(PathBuf::from),
		})
	}
}

fn routes(app: App) -> Router {
	Router::new()
		.merge(lattice_follower::handler::routes())
		.merge(lattice_post::handler::routes())
		.merge(lattice_profile::handler::routes())
		.with_state(app)
}

async fn run() -> LtResult<()> {
	let config = Config::from_env()?;

	tokio::fs::create_dir_all(&config.db_dir).await?;
	let meta_adapter = MetaAdapterSqlite::new(config.db_dir.join("meta.db")).await?;
	let profile_client = HttpProfileClient::with_default_timeout()?;
	let (notifier, notifications) = Notifier::channel();

	let app = AppState::new(
		AppBuilderOpts { entity: config.entity.clone(), listen: config.listen.clone() },
		Arc::new(meta_adapter),
		Arc::new(profile_client),
		notifier,
	);

	// Bus consumer. Outbound inbox transport is deployment-specific; the
	// stock binary only records what would be delivered.
	tokio::spawn(async move {
		while let Ok(event) = notifications.recv_async().await {
			info!(
				"notify follower={} post={} type={} view={}",
				event.follower_id, event.post_id, event.typ, event.view
			);
		}
	});

	let tokens = auth::load_tokens(config.auth_tokens.as_deref()).await?;
	let router = routes(app).layer(middleware::from_fn_with_state(tokens, auth::principal_layer));

	info!("Lattice serving {} on {}", config.entity, config.listen);
	let listener = tokio::net::TcpListener::bind(config.listen.as_ref()).await?;
	axum::serve(listener, router).await?;

	Ok(())
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	if let Err(err) = run().await {
		error!("Fatal: {}", err);
		std::process::exit(1);
	}
}

// vim: ts=4
