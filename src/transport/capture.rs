//! In-memory transport.
//!
//! Records every job instead of printing it. Clones share the same buffer,
//! so a test can hand one clone to a session and inspect the other.

use std::sync::{Arc, Mutex};

use super::Transport;
use crate::error::PrintError;

#[derive(Debug, Clone, Default)]
pub struct Capture {
    jobs: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Capture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every job sent so far, oldest first.
    pub fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// All bytes sent so far, concatenated.
    pub fn bytes(&self) -> Vec<u8> {
        self.jobs().concat()
    }
}

impl Transport for Capture {
    fn send(&mut self, data: &[u8]) -> Result<(), PrintError> {
        self.jobs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(data.to_vec());
        Ok(())
    }
}
