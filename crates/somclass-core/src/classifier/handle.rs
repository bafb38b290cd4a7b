//! Shared model handle.
//!
//! Installed once at startup, read by every request, torn down on shutdown.
//! Readers clone the inner `Arc` and release the lock before inference, so
//! a long prediction never blocks other requests from reaching the model.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use super::SequenceClassifier;

/// Lifecycle holder for the loaded classifier.
#[derive(Default)]
pub struct ModelHandle {
    model: RwLock<Option<Arc<dyn SequenceClassifier>>>,
}

impl ModelHandle {
    /// Creates a handle with no model (not ready).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a handle that is ready immediately.
    pub fn ready(model: Arc<dyn SequenceClassifier>) -> Self {
        Self {
            model: RwLock::new(Some(model)),
        }
    }

    /// Installs a model. Returns false if one is already installed, in which
    /// case the existing model is kept.
    pub fn install(&self, model: Arc<dyn SequenceClassifier>) -> bool {
        let mut slot = self.model.write().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return false;
        }
        info!(classifier = model.name(), "Model installed");
        *slot = Some(model);
        true
    }

    /// Removes the model, returning it. Requests already holding a clone keep
    /// running; new ones see the handle as not ready.
    pub fn teardown(&self) -> Option<Arc<dyn SequenceClassifier>> {
        let taken = self
            .model
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if taken.is_some() {
            info!("Model torn down");
        }
        taken
    }

    /// Returns the model if one is installed.
    pub fn get(&self) -> Option<Arc<dyn SequenceClassifier>> {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true if a model is installed.
    pub fn is_ready(&self) -> bool {
        self.model
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("ready", &self.is_ready())
            .finish()
    }
}
