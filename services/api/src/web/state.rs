//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use docsmith_core::ports::{DocumentStore, TextGenerationService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
/// There is no cross-request coordination beyond these handles; concurrent
/// mutation of the same section is last-write-wins.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub generator: Arc<dyn TextGenerationService>,
    pub config: Arc<Config>,
}
