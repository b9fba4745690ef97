//! Custom extractors for Lattice-specific data

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::prelude::*;
use lattice_types::principal::Principal;

// Auth //
//******//
/// The request's validated principal. Token validation is an upstream
/// concern: whatever middleware performs it inserts an `Auth` extension;
/// requests without one are anonymous.
#[derive(Debug, Clone)]
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
	S: Send + Sync,
{
	type Rejection = Error;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		Ok(parts.extensions.get::<Auth>().cloned().unwrap_or(Auth(Principal::Anonymous)))
	}
}

// vim: ts=4
