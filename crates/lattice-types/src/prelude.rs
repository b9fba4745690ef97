pub use crate::error::{Error, LtResult};
pub use crate::types::{Patch, Timestamp, View};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
