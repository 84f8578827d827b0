use scanlog_reports::ExecutionKey;
use std::collections::HashMap;

use crate::artifact::ArtifactFileInfo;

/// What the artifact panel of one execution is showing.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BrowserState {
    #[default]
    Listing,
    Viewing(ArtifactFileInfo),
}

impl BrowserState {
    pub fn select(self, file: ArtifactFileInfo) -> Self {
        Self::Viewing(file)
    }

    pub fn back(self) -> Self {
        Self::Listing
    }

    pub fn viewing(&self) -> Option<&ArtifactFileInfo> {
        match self {
            Self::Viewing(file) => Some(file),
            Self::Listing => None,
        }
    }
}

static LISTING: BrowserState = BrowserState::Listing;

/// Per-session browser state, namespaced by `(model, execution id)` so two
/// executions never clobber each other's selection.
#[derive(Debug, Clone, Default)]
pub struct SelectionStore {
    states: HashMap<ExecutionKey, BrowserState>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state for `key`; contexts never touched are `Listing`.
    pub fn state(&self, key: &ExecutionKey) -> &BrowserState {
        self.states.get(key).unwrap_or(&LISTING)
    }

    pub fn select(&mut self, key: &ExecutionKey, file: ArtifactFileInfo) {
        let state = self.states.remove(key).unwrap_or_default();
        self.states.insert(key.clone(), state.select(file));
    }

    /// Return `key` to `Listing`. Returns whether a file was being viewed.
    pub fn back(&mut self, key: &ExecutionKey) -> bool {
        let Some(state) = self.states.remove(key) else {
            return false;
        };
        let was_viewing = state.viewing().is_some();
        self.states.insert(key.clone(), state.back());
        was_viewing
    }

    /// Drop every context, e.g. when the session switches results roots.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}
