use crate::{
    foundation::error::PanelResult,
    scene::model::{CompiledScene, SceneSummary},
    store::SceneStore,
};

#[derive(Clone, Debug, Default)]
pub struct InMemorySceneStore {
    scenes: Vec<CompiledScene>,
}

impl InMemorySceneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.scenes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenes.is_empty()
    }
}

impl SceneStore for InMemorySceneStore {
    fn save(&mut self, scene: &CompiledScene) -> PanelResult<()> {
        scene.validate()?;
        match self.scenes.iter_mut().find(|s| s.id == scene.id) {
            Some(existing) => *existing = scene.clone(),
            None => self.scenes.push(scene.clone()),
        }
        Ok(())
    }

    fn list(&self) -> PanelResult<Vec<SceneSummary>> {
        Ok(self.scenes.iter().map(CompiledScene::summary).collect())
    }

    fn get(&self, id: &str) -> PanelResult<Option<CompiledScene>> {
        Ok(self.scenes.iter().find(|s| s.id == id).cloned())
    }

    fn delete(&mut self, id: &str) -> PanelResult<bool> {
        let before = self.scenes.len();
        self.scenes.retain(|s| s.id != id);
        Ok(before != self.scenes.len())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/memory.rs"]
mod tests;
