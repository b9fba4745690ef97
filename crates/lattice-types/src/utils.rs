//! Utility functions

use crate::prelude::*;
use rand::RngExt;

pub const PUBLIC_ID_LENGTH: usize = 24;
pub const MAC_KEY_ID_LENGTH: usize = 16;
pub const MAC_KEY_LENGTH: usize = 48;

pub const SAFE: [char; 62] = [
	'0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i',
	'j', 'k', 'l', 'm', 'n', 'o', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'A', 'B',
	'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R', 'S', 'T', 'U',
	'V', 'W', 'X', 'Y', 'Z',
];

/// URL-safe random identifier of the given length
pub fn random_id(length: usize) -> LtResult<String> {
	let mut rng = rand::rng();
	let mut result = String::with_capacity(length);

	for _ in 0..length {
		result.push(SAFE[rng.random_range(0..SAFE.len())]);
	}
	Ok(result)
}

/// Canonicalize an entity URI for identity comparison: the scheme and host
/// are case-insensitive and a single trailing slash is insignificant; the
/// path and query are compared byte-exact.
pub fn canonical_entity(entity: &str) -> String {
	let trimmed = entity.strip_suffix('/').unwrap_or(entity);
	match trimmed.split_once("://") {
		Some((scheme, rest)) => {
			let (host, path) = match rest.find('/') {
				Some(pos) => (&rest[..pos], &rest[pos..]),
				None => (rest, ""),
			};
			format!("{}://{}{}", scheme.to_ascii_lowercase(), host.to_ascii_lowercase(), path)
		}
		None => trimmed.to_string(),
	}
}


// vim: ts=4
