//! Versioned content-type URIs and subscription type descriptors.
//!
//! A type URI identifies a content schema, e.g.
//! `https://tent.io/types/post/status/v0.1.0`. The *base* is the URI minus
//! its version segment and is what subscriptions match on, so a follower
//! subscribed to `.../status/v0.1.x` keeps receiving minor revisions.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, LtResult};
use crate::types::View;

/// A versioned type URI split into base and version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeUri {
	pub base: Box<str>,
	pub version: Option<Box<str>>,
}

impl TypeUri {
	/// Parse a type URI, splitting off a trailing version segment (`v0.1.0`,
	/// `v0.1.x`) when present.
	pub fn parse(s: &str) -> LtResult<Self> {
		if s.is_empty() {
			return Err(Error::ValidationError("type uri cannot be empty".to_string()));
		}
		if !s.contains("://") {
			return Err(Error::ValidationError(format!("invalid type uri '{}'", s)));
		}
		if s.contains('#') {
			return Err(Error::ValidationError(format!(
				"type uri '{}' must not carry a fragment",
				s
			)));
		}

		if let Some(pos) = s.rfind('/') {
			let segment = &s[pos + 1..];
			if is_version_segment(segment) {
				return Ok(TypeUri {
					base: s[..pos].into(),
					version: Some(segment.into()),
				});
			}
		}
		Ok(TypeUri { base: s.into(), version: None })
	}

	/// Full URI form (base plus version segment when present)
	pub fn uri(&self) -> String {
		match &self.version {
			Some(version) => format!("{}/{}", self.base, version),
			None => self.base.to_string(),
		}
	}
}

/// `v` followed by dotted numeric components, `x` allowed as a wildcard
fn is_version_segment(segment: &str) -> bool {
	let Some(rest) = segment.strip_prefix('v') else { return false };
	!rest.is_empty()
		&& rest.chars().all(|c| c.is_ascii_digit() || c == '.' || c == 'x')
		&& rest.chars().next().is_some_and(|c| c.is_ascii_digit())
}

impl std::fmt::Display for TypeUri {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match &self.version {
			Some(version) => write!(f, "{}/{}", self.base, version),
			None => f.write_str(&self.base),
		}
	}
}

impl Serialize for TypeUri {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.uri())
	}
}

impl<'de> Deserialize<'de> for TypeUri {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let s = String::deserialize(deserializer)?;
		TypeUri::parse(&s).map_err(serde::de::Error::custom)
	}
}

/// A subscription type descriptor: a type URI plus the requested view,
/// written as `<uri>#full` / `<uri>#meta`. An unsuffixed descriptor
/// defaults to `full`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDescriptor {
	pub uri: TypeUri,
	pub view: View,
}

impl TypeDescriptor {
	pub fn parse(s: &str) -> LtResult<Self> {
		let (uri_part, view) = match s.split_once('#') {
			Some((uri, fragment)) => (uri, fragment.parse::<View>()?),
			None => (s, View::Full),
		};
		Ok(TypeDescriptor { uri: TypeUri::parse(uri_part)?, view })
	}

	/// Parse a whole descriptor list, failing on the first malformed entry
	pub fn parse_all(descriptors: &[Box<str>]) -> LtResult<Vec<TypeDescriptor>> {
		descriptors.iter().map(|d| TypeDescriptor::parse(d)).collect()
	}
}

impl std::fmt::Display for TypeDescriptor {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}#{}", self.uri, self.view)
	}
}


// vim: ts=4
