//! Basic value types used across the workspace.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unix timestamp in seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Self {
		let secs = std::time::SystemTime::now()
			.duration_since(std::time::UNIX_EPOCH)
			.map(|d| d.as_secs() as i64)
			.unwrap_or(0);
		Timestamp(secs)
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Fidelity level a notification subscription requests for a content type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
	#[default]
	Full,
	Meta,
}

impl View {
	pub fn as_str(&self) -> &'static str {
		match self {
			View::Full => "full",
			View::Meta => "meta",
		}
	}
}

impl std::fmt::Display for View {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

impl std::str::FromStr for View {
	type Err = crate::error::Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"full" => Ok(View::Full),
			"meta" => Ok(View::Meta),
			other => Err(crate::error::Error::ValidationError(format!("unknown view '{}'", other))),
		}
	}
}

/// Three-state partial-update field: distinguishes an absent field from an
/// explicit null from a new value. Update structs mark every field
/// `#[serde(default)]` so a missing JSON key deserializes to `Undefined`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Patch<T> {
	#[default]
	Undefined,
	Null,
	Value(T),
}

impl<T> Patch<T> {
	pub fn is_undefined(&self) -> bool {
		matches!(self, Patch::Undefined)
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Patch::Null)
	}

	pub fn is_value(&self) -> bool {
		matches!(self, Patch::Value(_))
	}

	pub fn value(&self) -> Option<&T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}

	pub fn into_value(self) -> Option<T> {
		match self {
			Patch::Value(v) => Some(v),
			_ => None,
		}
	}

	/// `None` = leave unchanged, `Some(None)` = clear, `Some(Some(v))` = set
	pub fn as_option(&self) -> Option<Option<&T>> {
		match self {
			Patch::Undefined => None,
			Patch::Null => Some(None),
			Patch::Value(v) => Some(Some(v)),
		}
	}

	pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Patch<U> {
		match self {
			Patch::Undefined => Patch::Undefined,
			Patch::Null => Patch::Null,
			Patch::Value(v) => Patch::Value(f(v)),
		}
	}

	/// Drop the field: any pending change becomes `Undefined`
	pub fn clear(&mut self) {
		*self = Patch::Undefined;
	}
}

impl<T: Serialize> Serialize for Patch<T> {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self {
			Patch::Value(v) => v.serialize(serializer),
			// Undefined cannot be represented in plain JSON; both collapse to null
			Patch::Undefined | Patch::Null => serializer.serialize_none(),
		}
	}
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let opt = Option::<T>::deserialize(deserializer)?;
		Ok(match opt {
			None => Patch::Null,
			Some(v) => Patch::Value(v),
		})
	}
}

// vim: ts=4
