//! The handoff object produced by a successful build: the materialized
//! bootstrap plus the accessor registry the runtime will query.
//!
//! This crate's involvement ends here — starting network serving from the
//! bootstrap is the runtime collaborator's job.

use std::sync::Arc;

use crate::bootstrap::Bootstrap;
use crate::registry::StringAccessorRegistry;

pub struct Engine {
    bootstrap: Bootstrap,
    registry: Arc<StringAccessorRegistry>,
}

impl Engine {
    pub(crate) fn new(bootstrap: Bootstrap, registry: Arc<StringAccessorRegistry>) -> Self {
        Self {
            bootstrap,
            registry,
        }
    }

    /// The structured configuration the runtime starts from.
    pub fn bootstrap(&self) -> &Bootstrap {
        &self.bootstrap
    }

    /// The accessor registry. Entries outlive individual render calls and
    /// are released when the engine is dropped.
    pub fn registry(&self) -> &Arc<StringAccessorRegistry> {
        &self.registry
    }
}
