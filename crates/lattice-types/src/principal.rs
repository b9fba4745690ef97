//! Principal model: who is asking.
//!
//! Every request is resolved by the authentication layer (out of scope
//! here) into one of three principal kinds before it reaches a handler.
//! Visibility decisions dispatch on the variant explicitly; there is no
//! open-ended dynamic dispatch.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::type_uri::TypeUri;

/// Named capability granted to an OAuth-authorized application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
	ReadPosts,
	WritePosts,
	ReadFollowers,
	WriteFollowers,
	ReadSecrets,
	WriteSecrets,
	ReadProfile,
	WriteProfile,
	ReadPermissions,
}

impl Scope {
	pub fn as_str(&self) -> &'static str {
		match self {
			Scope::ReadPosts => "read_posts",
			Scope::WritePosts => "write_posts",
			Scope::ReadFollowers => "read_followers",
			Scope::WriteFollowers => "write_followers",
			Scope::ReadSecrets => "read_secrets",
			Scope::WriteSecrets => "write_secrets",
			Scope::ReadProfile => "read_profile",
			Scope::WriteProfile => "write_profile",
			Scope::ReadPermissions => "read_permissions",
		}
	}
}

impl std::fmt::Display for Scope {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Post types an application may read or be notified of, independent of
/// its scope set. On the wire either the literal `"all"` or an explicit
/// list of type URIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeAllowlist {
	All,
	Only(HashSet<Box<str>>),
}

impl Serialize for TypeAllowlist {
	fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			TypeAllowlist::All => serializer.serialize_str("all"),
			TypeAllowlist::Only(types) => types.serialize(serializer),
		}
	}
}

impl<'de> Deserialize<'de> for TypeAllowlist {
	fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		#[derive(Deserialize)]
		#[serde(untagged)]
		enum Repr {
			Literal(Box<str>),
			List(HashSet<Box<str>>),
		}

		match Repr::deserialize(deserializer)? {
			Repr::Literal(s) if s.as_ref() == "all" => Ok(TypeAllowlist::All),
			Repr::Literal(s) => {
				Err(serde::de::Error::custom(format!("unknown allowlist literal '{}'", s)))
			}
			Repr::List(types) => Ok(TypeAllowlist::Only(types)),
		}
	}
}

impl TypeAllowlist {
	/// Exact full-URI match, or the wildcard
	pub fn contains(&self, typ: &TypeUri) -> bool {
		match self {
			TypeAllowlist::All => true,
			TypeAllowlist::Only(types) => types.contains(typ.uri().as_str()),
		}
	}

	pub fn is_empty(&self) -> bool {
		match self {
			TypeAllowlist::All => false,
			TypeAllowlist::Only(types) => types.is_empty(),
		}
	}
}

impl Default for TypeAllowlist {
	fn default() -> Self {
		TypeAllowlist::Only(HashSet::new())
	}
}

/// An OAuth-authorized application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppAuthorization {
	pub scopes: HashSet<Scope>,
	pub post_types: TypeAllowlist,
	/// Profile-info type bases this app may read, `"all"` as wildcard
	#[serde(default)]
	pub profile_info_types: Vec<Box<str>>,
}

impl AppAuthorization {
	pub fn has_scope(&self, scope: Scope) -> bool {
		self.scopes.contains(&scope)
	}
}

/// An authenticated follower acting under its own identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerIdentity {
	pub follower_id: i64,
	pub groups: Vec<Box<str>>,
	/// Profile-info type bases this follower may see, `"all"` as wildcard
	pub profile_info_types: Vec<Box<str>>,
}

/// The caller of a request, after token validation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Principal {
	#[default]
	Anonymous,
	App(AppAuthorization),
	Follower(FollowerIdentity),
}

impl Principal {
	pub fn is_anonymous(&self) -> bool {
		matches!(self, Principal::Anonymous)
	}

	/// Scope check; only app principals carry scopes
	pub fn has_scope(&self, scope: Scope) -> bool {
		match self {
			Principal::App(app) => app.has_scope(scope),
			_ => false,
		}
	}
}

/// `"all"`-aware membership test for profile-info type-base allowlists
pub fn allows_type_base(allowlist: &[Box<str>], type_base: &str) -> bool {
	allowlist.iter().any(|t| t.as_ref() == "all" || t.as_ref() == type_base)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scope_serde() {
		let json = serde_json::to_string(&Scope::ReadPosts).unwrap();
		assert_eq!(json, "\"read_posts\"");
		let scope: Scope = serde_json::from_str("\"write_secrets\"").unwrap();
		assert_eq!(scope, Scope::WriteSecrets);
	}

	#[test]
	fn test_allowlist_exact_match() {
		let typ = TypeUri::parse("https://tent.io/types/post/status/v0.1.0").unwrap();
		let list = TypeAllowlist::Only(
			["https://tent.io/types/post/status/v0.1.0".into()].into_iter().collect(),
		);
		assert!(list.contains(&typ));

		let other = TypeUri::parse("https://tent.io/types/post/photo/v0.1.0").unwrap();
		assert!(!list.contains(&other));
	}

	#[test]
	fn test_allowlist_wildcard() {
		let typ = TypeUri::parse("https://tent.io/types/post/status/v0.1.0").unwrap();
		assert!(TypeAllowlist::All.contains(&typ));
	}

	#[test]
	fn test_allowlist_serde() {
		let all: TypeAllowlist = serde_json::from_str("\"all\"").unwrap();
		assert_eq!(all, TypeAllowlist::All);

		let list: TypeAllowlist =
			serde_json::from_str(r#"["https://tent.io/types/post/status/v0.1.0"]"#).unwrap();
		assert!(matches!(list, TypeAllowlist::Only(_)));

		assert!(serde_json::from_str::<TypeAllowlist>("\"some\"").is_err());
		assert_eq!(serde_json::to_string(&TypeAllowlist::All).unwrap(), "\"all\"");
	}

	#[test]
	fn test_allows_type_base() {
		let list: Vec<Box<str>> = vec!["https://tent.io/types/info/core".into()];
		assert!(allows_type_base(&list, "https://tent.io/types/info/core"));
		assert!(!allows_type_base(&list, "https://tent.io/types/info/basic"));

		let all: Vec<Box<str>> = vec!["all".into()];
		assert!(allows_type_base(&all, "https://tent.io/types/info/basic"));
	}

	#[test]
	fn test_principal_scope_dispatch() {
		let anon = Principal::Anonymous;
		assert!(!anon.has_scope(Scope::ReadPosts));

		let app = Principal::App(AppAuthorization {
			scopes: [Scope::ReadPosts].into_iter().collect(),
			..Default::default()
		});
		assert!(app.has_scope(Scope::ReadPosts));
		assert!(!app.has_scope(Scope::WritePosts));
	}
}

// vim: ts=4
