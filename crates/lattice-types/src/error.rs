//! Error type shared by every Lattice crate.

use axum::{Json, http::StatusCode, response::IntoResponse};

pub type LtResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Resource does not exist (reported only to privileged callers)
	NotFound,
	/// Principal lacks the required scope, grant, or ownership
	PermissionDenied,
	/// Uniqueness violation (e.g. second registration for the same entity)
	Conflict,
	/// Remote entity unreachable, malformed response, or missing profile link
	DiscoveryFailed,
	/// Fetched profile's entity differs from the requested entity
	IdentityMismatch,
	/// Malformed input (type descriptor, missing required field)
	ValidationError(String),
	/// Database level failure
	DbError,
	/// Parse failure in a wire format
	Parse,
	Internal(String),

	// externals
	Io(std::io::Error),
	Json(serde_json::Error),
}

impl From<std::io::Error> for Error {
	fn from(err: std::io::Error) -> Self {
		Self::Io(err)
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::Conflict => write!(f, "conflict"),
			Error::DiscoveryFailed => write!(f, "discovery failed"),
			Error::IdentityMismatch => write!(f, "entity identity mismatch"),
			Error::ValidationError(msg) => write!(f, "validation failed: {}", msg),
			Error::DbError => write!(f, "database error"),
			Error::Parse => write!(f, "parse error"),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Io(err) => write!(f, "io error: {}", err),
			Error::Json(err) => write!(f, "json error: {}", err),
		}
	}
}

impl std::error::Error for Error {}

#[derive(serde::Serialize)]
struct ErrorBody {
	error: String,
}

impl IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		let status = match &self {
			Error::NotFound | Error::DiscoveryFailed => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::Conflict | Error::IdentityMismatch => StatusCode::CONFLICT,
			Error::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
			_ => StatusCode::INTERNAL_SERVER_ERROR,
		};
		let body = ErrorBody { error: self.to_string() };
		(status, Json(body)).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display() {
		assert_eq!(Error::NotFound.to_string(), "not found");
		assert_eq!(
			Error::ValidationError("bad type".into()).to_string(),
			"validation failed: bad type"
		);
	}
}

// vim: ts=4
