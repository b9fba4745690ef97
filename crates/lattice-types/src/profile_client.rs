//! Outbound discovery capability.
//!
//! Follower registration needs two remote calls: a HEAD request against the
//! entity URI to find the profile link, and a GET of the linked profile
//! document. Both are behind this trait so the registration protocol can be
//! driven by a scripted client in tests; the reqwest-backed implementation
//! lives in lattice-core.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::prelude::*;

/// Media type of profile documents on the wire
pub const PROFILE_MEDIA_TYPE: &str = "application/vnd.tent.v0+json";

/// Type URI of the core info section every profile document must carry
pub const CORE_INFO_TYPE: &str = "https://tent.io/types/info/core/v0.1.0";

/// A profile document keyed by info type URI
pub type ProfileDocument = HashMap<Box<str>, serde_json::Value>;

/// Extract the `entity` field from the document's core info section
pub fn core_info_entity(doc: &ProfileDocument) -> Option<&str> {
	doc.get(CORE_INFO_TYPE)?.get("entity")?.as_str()
}

#[async_trait]
pub trait ProfileClient: Debug + Send + Sync {
	/// Resolve the profile URL for an entity via a HEAD request, following
	/// the `Link` header with `rel="profile"`. Any failure (remote
	/// unreachable, non-success status, missing link) is `DiscoveryFailed`.
	async fn discover(&self, entity: &str) -> LtResult<Box<str>>;

	/// Fetch a discovered profile document. Non-200 responses and malformed
	/// bodies are `DiscoveryFailed`.
	async fn fetch_profile(&self, profile_url: &str) -> LtResult<ProfileDocument>;
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_core_info_entity() {
		let doc: ProfileDocument = serde_json::from_str(
			r#"{"https://tent.io/types/info/core/v0.1.0":{"entity":"https://alex.example.org","servers":["https://alex.example.org/tent"]}}"#,
		)
		.unwrap();
		assert_eq!(core_info_entity(&doc), Some("https://alex.example.org"));
	}

	#[test]
	fn test_core_info_entity_missing() {
		let doc: ProfileDocument =
			serde_json::from_str(r#"{"https://tent.io/types/info/basic/v0.1.0":{}}"#).unwrap();
		assert_eq!(core_info_entity(&doc), None);
	}
}

// vim: ts=4
