//! Scene persistence.
//!
//! [`SceneStore`] is the seam the pipeline and the CLI talk to. Two implementations ship with the
//! crate: an in-memory store for tests and embedding, and a directory of JSON records.

mod fs;
mod memory;

pub use fs::FsSceneStore;
pub use memory::InMemorySceneStore;

use crate::{
    foundation::error::PanelResult,
    scene::model::{CompiledScene, SceneSummary},
};

/// Key-value store of compiled scenes.
pub trait SceneStore {
    /// Persist `scene`, replacing any record with the same id. Validates before writing.
    fn save(&mut self, scene: &CompiledScene) -> PanelResult<()>;

    /// Summaries in store order (first saved first).
    fn list(&self) -> PanelResult<Vec<SceneSummary>>;

    /// Fetch a full record.
    fn get(&self, id: &str) -> PanelResult<Option<CompiledScene>>;

    /// Delete a record. Returns whether it existed.
    fn delete(&mut self, id: &str) -> PanelResult<bool>;
}
