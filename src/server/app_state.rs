use std::sync::Arc;

use crate::{
    configs::Config,
    relay::{StreamRelay, VideoResolver},
};

/// Top-level application state, built once at startup and shared read-only
/// by every request.
pub struct AppState {
    pub config: Config,
    pub relay: StreamRelay,
}

impl AppState {
    pub fn new(config: Config, resolver: Arc<dyn VideoResolver>) -> Self {
        let relay = StreamRelay::new(resolver, config.relay.clone());
        Self { config, relay }
    }
}
