//! Known-valid flag for the selected provider credential.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whether the currently selected credential is believed to work.
///
/// Cleared when the provider rejects the key; set again when the user
/// selects a credential. Cloning shares the flag.
#[derive(Debug, Clone, Default)]
pub struct CredentialState {
    valid: Arc<AtomicBool>,
}

impl CredentialState {
    pub fn new(known_valid: bool) -> Self {
        Self {
            valid: Arc::new(AtomicBool::new(known_valid)),
        }
    }

    pub fn is_known_valid(&self) -> bool {
        self.valid.load(Ordering::SeqCst)
    }

    pub fn mark_valid(&self) {
        self.valid.store(true, Ordering::SeqCst);
    }

    pub fn invalidate(&self) {
        self.valid.store(false, Ordering::SeqCst);
    }
}
