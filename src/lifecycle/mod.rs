//! Scoped acquisition and release of transient session resources.
//!
//! Decoded target pixels are owned by [`DecodedImageSet`](crate::assets::loader::DecodedImageSet)
//! and freed when it drops. This module covers what outlives a single call: object handles to
//! artifact bytes and the audio output context.

use std::{collections::HashMap, sync::Arc};

use crate::{
    audio::output::AudioOutput,
    foundation::error::{PanelError, PanelResult},
};

/// Temporary handle (`blob:` URI) to in-memory artifact bytes.
#[derive(Clone, Debug)]
pub struct ObjectHandle {
    uri: String,
    bytes: Arc<Vec<u8>>,
}

impl ObjectHandle {
    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Issues and revokes [`ObjectHandle`]s.
#[derive(Debug, Default)]
pub struct HandleRegistry {
    live: HashMap<String, Arc<Vec<u8>>>,
    created: u64,
    revoked: u64,
}

impl HandleRegistry {
    pub fn create(&mut self, bytes: Vec<u8>) -> ObjectHandle {
        let uri = format!("blob:panelcast/{}", uuid::Uuid::new_v4());
        let bytes = Arc::new(bytes);
        self.live.insert(uri.clone(), bytes.clone());
        self.created += 1;
        tracing::debug!(uri = %uri, bytes = bytes.len(), "object handle created");
        ObjectHandle { uri, bytes }
    }

    /// Bytes behind a live handle.
    pub fn resolve(&self, uri: &str) -> Option<Arc<Vec<u8>>> {
        self.live.get(uri).cloned()
    }

    /// Revoke a handle. Revoking an already revoked handle is a no-op and returns `false`.
    pub fn revoke(&mut self, handle: &ObjectHandle) -> bool {
        if self.live.remove(&handle.uri).is_none() {
            return false;
        }
        self.revoked += 1;
        tracing::debug!(uri = %handle.uri, "object handle revoked");
        true
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn created_count(&self) -> u64 {
        self.created
    }

    pub fn revoked_count(&self) -> u64 {
        self.revoked
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Unopened,
    Open,
    Closed,
}

/// Tracks the audio output context for one session: opened at most once, closed at most once.
#[derive(Debug)]
pub struct AudioContextSlot {
    state: SlotState,
    opens: u32,
    closes: u32,
}

impl Default for AudioContextSlot {
    fn default() -> Self {
        Self {
            state: SlotState::Unopened,
            opens: 0,
            closes: 0,
        }
    }
}

impl AudioContextSlot {
    /// Open the context on first use; later calls reuse it. Fails once the slot was closed.
    pub fn ensure_open(&mut self, out: &mut dyn AudioOutput, sample_rate: u32) -> PanelResult<()> {
        match self.state {
            SlotState::Open => Ok(()),
            SlotState::Closed => Err(PanelError::engine(
                "audio context already released for this session",
            )),
            SlotState::Unopened => {
                out.open(sample_rate)?;
                self.state = SlotState::Open;
                self.opens += 1;
                Ok(())
            }
        }
    }

    /// Close the context if it was opened. Idempotent.
    pub fn close(&mut self, out: &mut dyn AudioOutput) {
        if self.state == SlotState::Open {
            out.close();
            self.closes += 1;
        }
        self.state = SlotState::Closed;
    }

    /// Start a fresh session on the same output.
    pub fn reset(&mut self) {
        self.state = SlotState::Unopened;
    }

    pub fn is_open(&self) -> bool {
        self.state == SlotState::Open
    }

    pub fn open_count(&self) -> u32 {
        self.opens
    }

    pub fn close_count(&self) -> u32 {
        self.closes
    }
}

/// Object handles owned by one recognition session.
#[derive(Debug, Default)]
pub struct ResourceScope {
    registry: HandleRegistry,
    artifact: Option<ObjectHandle>,
    released: bool,
}

impl ResourceScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a handle for `bytes`, revoking the one it replaces.
    pub fn replace_artifact_handle(&mut self, bytes: Vec<u8>) -> ObjectHandle {
        if let Some(old) = self.artifact.take() {
            self.registry.revoke(&old);
        }
        let handle = self.registry.create(bytes);
        self.artifact = Some(handle.clone());
        self.released = false;
        handle
    }

    pub fn artifact_handle(&self) -> Option<&ObjectHandle> {
        self.artifact.as_ref()
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }

    /// Revoke everything the scope holds. Returns `false` when there was nothing left to release.
    pub fn release(&mut self) -> bool {
        if self.released {
            return false;
        }
        if let Some(handle) = self.artifact.take() {
            self.registry.revoke(&handle);
        }
        self.released = true;
        true
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/mod.rs"]
mod tests;
