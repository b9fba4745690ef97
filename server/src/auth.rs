//! Static bearer-token principal resolution.
//!
//! Token validation proper is a deployment concern; this layer implements
//! the capability in its simplest useful form: a JSON file mapping bearer
//! tokens to principals, loaded once at startup. Requests without a
//! recognized token stay anonymous.

use axum::{extract::Request, extract::State, middleware::Next, response::Response};
use std::{collections::HashMap, path::Path, sync::Arc};

use lattice_core::extract::Auth;
use lattice_types::prelude::*;
use lattice_types::principal::Principal;

pub type TokenMap = HashMap<String, Principal>;

/// Load the token → principal map; an absent file means all requests are
/// anonymous.
pub async fn load_tokens(path: Option<&Path>) -> LtResult<Arc<TokenMap>> {
	let Some(path) = path else {
		return Ok(Arc::new(TokenMap::new()));
	};

	let raw = tokio::fs::read_to_string(path).await?;
	let tokens: TokenMap = serde_json::from_str(&raw)?;
	info!("Loaded {} auth tokens from {}", tokens.len(), path.display());
	Ok(Arc::new(tokens))
}

fn bearer_token(req: &Request) -> Option<&str> {
	req.headers()
		.get(axum::http::header::AUTHORIZATION)?
		.to_str()
		.ok()?
		.strip_prefix("Bearer ")
}

/// Middleware: resolve the request's principal and stash it as an `Auth`
/// extension for the extractor.
pub async fn principal_layer(
	State(tokens): State<Arc<TokenMap>>,
	mut req: Request,
	next: Next,
) -> Response {
	if let Some(principal) = bearer_token(&req).and_then(|token| tokens.get(token)) {
		req.extensions_mut().insert(Auth(principal.clone()));
	}
	next.run(req).await
}


// vim: ts=4
