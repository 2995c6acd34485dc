use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    foundation::error::{PanelError, PanelResult},
    scene::model::{CompiledScene, SceneSummary},
    store::SceneStore,
};

const INDEX_FILE: &str = "index.json";

/// Directory-backed store: one `<id>.json` record per scene plus an `index.json` that keeps
/// store order.
#[derive(Clone, Debug)]
pub struct FsSceneStore {
    root: PathBuf,
}

impl FsSceneStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> PanelResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create scene store dir '{}'", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &str) -> PanelResult<PathBuf> {
        check_id(id)?;
        Ok(self.root.join(format!("{id}.json")))
    }

    fn read_index(&self) -> PanelResult<Vec<String>> {
        let path = self.root.join(INDEX_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let f = File::open(&path)
            .with_context(|| format!("open scene index '{}'", path.display()))?;
        let ids: Vec<String> = serde_json::from_reader(BufReader::new(f))?;
        Ok(ids)
    }

    fn write_index(&self, ids: &[String]) -> PanelResult<()> {
        write_json_atomic(&self.root.join(INDEX_FILE), &ids)
    }
}

impl SceneStore for FsSceneStore {
    fn save(&mut self, scene: &CompiledScene) -> PanelResult<()> {
        scene.validate()?;
        let path = self.record_path(&scene.id)?;
        write_json_atomic(&path, scene)?;

        let mut ids = self.read_index()?;
        if !ids.iter().any(|id| id == &scene.id) {
            ids.push(scene.id.clone());
            self.write_index(&ids)?;
        }
        tracing::debug!(scene = %scene.id, path = %path.display(), "saved scene");
        Ok(())
    }

    fn list(&self) -> PanelResult<Vec<SceneSummary>> {
        let mut out = Vec::new();
        for id in self.read_index()? {
            match self.get(&id)? {
                Some(scene) => out.push(scene.summary()),
                None => tracing::warn!(scene = %id, "index entry without a record; skipping"),
            }
        }
        Ok(out)
    }

    fn get(&self, id: &str) -> PanelResult<Option<CompiledScene>> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }
        let f = File::open(&path).with_context(|| format!("open scene '{}'", path.display()))?;
        let scene: CompiledScene = serde_json::from_reader(BufReader::new(f))?;
        Ok(Some(scene))
    }

    fn delete(&mut self, id: &str) -> PanelResult<bool> {
        let path = self.record_path(id)?;
        let existed = path.exists();
        if existed {
            std::fs::remove_file(&path)
                .with_context(|| format!("remove scene '{}'", path.display()))?;
        }

        let mut ids = self.read_index()?;
        let before = ids.len();
        ids.retain(|x| x != id);
        if ids.len() != before {
            self.write_index(&ids)?;
        }
        Ok(existed)
    }
}

/// Scene ids become file names; keep them to a conservative charset.
fn check_id(id: &str) -> PanelResult<()> {
    let ok = !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !ok {
        return Err(PanelError::store(format!("invalid scene id '{id}'")));
    }
    Ok(())
}

fn write_json_atomic<T: serde::Serialize + ?Sized>(path: &Path, value: &T) -> PanelResult<()> {
    let tmp = path.with_extension("json.tmp");
    let f = File::create(&tmp).with_context(|| format!("create '{}'", tmp.display()))?;
    serde_json::to_writer_pretty(f, value)?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("move '{}' into place", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/store/fs.rs"]
mod tests;
