//! Outbound discovery client.
//!
//! Implements the `ProfileClient` capability over reqwest with a bounded
//! per-request timeout, so a stalled remote cannot block unrelated
//! requests. No automatic retries: a transient failure surfaces as
//! `DiscoveryFailed` and the caller controls backoff.

use async_trait::async_trait;
use std::time::Duration;

use crate::prelude::*;
use lattice_types::profile_client::{PROFILE_MEDIA_TYPE, ProfileClient, ProfileDocument};

pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct HttpProfileClient {
	client: reqwest::Client,
}

impl HttpProfileClient {
	pub fn new(timeout: Duration) -> LtResult<Self> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.redirect(reqwest::redirect::Policy::limited(3))
			.build()
			.map_err(|err| Error::Internal(format!("http client init failed: {}", err)))?;
		Ok(HttpProfileClient { client })
	}

	pub fn with_default_timeout() -> LtResult<Self> {
		Self::new(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
	}
}

#[async_trait]
impl ProfileClient for HttpProfileClient {
	async fn discover(&self, entity: &str) -> LtResult<Box<str>> {
		let res = self.client.head(entity).send().await.map_err(|err| {
			warn!("Discovery HEAD {} failed: {}", entity, err);
			Error::DiscoveryFailed
		})?;

		if !res.status().is_success() {
			debug!("Discovery HEAD {} returned {}", entity, res.status());
			return Err(Error::DiscoveryFailed);
		}

		let link = res
			.headers()
			.get(reqwest::header::LINK)
			.and_then(|value| value.to_str().ok())
			.ok_or(Error::DiscoveryFailed)?;

		let profile_url = parse_profile_link(link).ok_or(Error::DiscoveryFailed)?;
		Ok(absolutize(entity, &profile_url).into())
	}

	async fn fetch_profile(&self, profile_url: &str) -> LtResult<ProfileDocument> {
		let res = self
			.client
			.get(profile_url)
			.header(reqwest::header::ACCEPT, PROFILE_MEDIA_TYPE)
			.send()
			.await
			.map_err(|err| {
				warn!("Profile fetch {} failed: {}", profile_url, err);
				Error::DiscoveryFailed
			})?;

		if !res.status().is_success() {
			debug!("Profile fetch {} returned {}", profile_url, res.status());
			return Err(Error::DiscoveryFailed);
		}

		res.json::<ProfileDocument>().await.map_err(|err| {
			warn!("Malformed profile document from {}: {}", profile_url, err);
			Error::DiscoveryFailed
		})
	}
}

/// Extract the target of the `rel="profile"` entry from a `Link` header
fn parse_profile_link(header: &str) -> Option<String> {
	for entry in header.split(',') {
		let mut parts = entry.split(';');
		let target = parts.next()?.trim();
		let target = target.strip_prefix('<')?.strip_suffix('>')?;

		for param in parts {
			let Some((key, value)) = param.split_once('=') else { continue };
			if key.trim() != "rel" {
				continue;
			}
			let value = value.trim().trim_matches('"');
			if value.split_ascii_whitespace().any(|rel| rel == "profile") {
				return Some(target.to_string());
			}
		}
	}
	None
}

/// Resolve a possibly server-relative link target against the entity URI
fn absolutize(entity: &str, target: &str) -> String {
	if target.contains("://") {
		return target.to_string();
	}
	let base = entity.strip_suffix('/').unwrap_or(entity);
	if target.starts_with('/') {
		// Relative to the entity's origin
		if let Some(scheme_end) = base.find("://") {
			if let Some(path_start) = base[scheme_end + 3..].find('/') {
				return format!("{}{}", &base[..scheme_end + 3 + path_start], target);
			}
		}
		return format!("{}{}", base, target);
	}
	format!("{}/{}", base, target)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_profile_link() {
		let header = r#"<https://alex.example.org/tent/profile>; rel="profile"; type="application/vnd.tent.v0+json""#;
		assert_eq!(
			parse_profile_link(header).as_deref(),
			Some("https://alex.example.org/tent/profile")
		);
	}

	#[test]
	fn test_parse_profile_link_multiple_entries() {
		let header = r#"<https://alex.example.org/css>; rel="stylesheet", </tent/profile>; rel="profile""#;
		assert_eq!(parse_profile_link(header).as_deref(), Some("/tent/profile"));
	}

	#[test]
	fn test_parse_profile_link_missing_rel() {
		let header = r#"<https://alex.example.org/tent/profile>; type="application/vnd.tent.v0+json""#;
		assert_eq!(parse_profile_link(header), None);
	}

	#[test]
	fn test_absolutize() {
		assert_eq!(
			absolutize("https://alex.example.org", "https://other.example.org/profile"),
			"https://other.example.org/profile"
		);
		assert_eq!(
			absolutize("https://alex.example.org/", "/tent/profile"),
			"https://alex.example.org/tent/profile"
		);
		assert_eq!(
			absolutize("https://alex.example.org", "tent/profile"),
			"https://alex.example.org/tent/profile"
		);
	}
}

// vim: ts=4
