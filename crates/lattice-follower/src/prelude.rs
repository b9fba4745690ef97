pub use lattice_core::app::App;
pub use lattice_types::error::{Error, LtResult};
pub use lattice_types::meta_adapter::MetaAdapter;
pub use lattice_types::profile_client::ProfileClient;
pub use lattice_types::types::{Patch, Timestamp, View};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
