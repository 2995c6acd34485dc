use std::collections::HashSet;

use crate::{
    assets::transport,
    foundation::core::Vec3,
    foundation::error::{PanelError, PanelResult},
};

/// Kind of AR-anchored media attached to a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ContentKind {
    #[serde(rename = "IMAGE")]
    Image,
    #[serde(rename = "VIDEO")]
    Video,
    #[serde(rename = "MODEL_3D")]
    Model3d,
    #[serde(rename = "AUDIO")]
    Audio,
}

impl ContentKind {
    /// Scale applied when content is first attached. 3D models are authored much larger than a
    /// target's unit plane.
    pub fn default_scale(self) -> Vec3 {
        match self {
            Self::Model3d => Vec3::splat(0.1),
            Self::Image | Self::Video | Self::Audio => Vec3::ONE,
        }
    }
}

/// Overlay shown when the page's target is tracked. Immutable once attached to a page.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayContent {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    #[serde(rename = "src")]
    pub source_ref: String,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
    #[serde(default)]
    pub position: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

impl OverlayContent {
    /// Attach-time constructor: fresh id, kind default scale, zero position/rotation.
    pub fn new(kind: ContentKind, source_ref: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            source_ref: source_ref.into(),
            scale: kind.default_scale(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_video(&self) -> bool {
        self.kind == ContentKind::Video
    }

    pub fn validate(&self) -> PanelResult<()> {
        if self.source_ref.trim().is_empty() {
            return Err(PanelError::validation(format!(
                "content '{}' has an empty source",
                self.id
            )));
        }
        if !self.scale.is_finite() || !self.position.is_finite() || !self.rotation.is_finite() {
            return Err(PanelError::validation(format!(
                "content '{}' has a non-finite transform",
                self.id
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AiAnalysis {
    pub title: String,
    pub description: String,
}

/// Authoring-time page record. Ids are optional; the assembler fills the missing ones.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub page_number: u32,
    #[serde(rename = "targetImageSrc")]
    pub target_image_source: String,
    #[serde(default)]
    pub content: Option<OverlayContent>,
    #[serde(
        default,
        rename = "narrationAudioSrc",
        skip_serializing_if = "Option::is_none"
    )]
    pub narration_audio_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl PageDraft {
    pub fn new(page_number: u32, target_image_source: impl Into<String>) -> Self {
        Self {
            id: None,
            page_number,
            target_image_source: target_image_source.into(),
            content: None,
            narration_audio_source: None,
            ai_analysis: None,
        }
    }
}

/// One page of a compiled scene.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicPage {
    pub id: String,
    pub page_number: u32,
    #[serde(rename = "targetImageSrc")]
    pub target_image_source: String,
    pub content: Option<OverlayContent>,
    #[serde(
        default,
        rename = "narrationAudioSrc",
        skip_serializing_if = "Option::is_none"
    )]
    pub narration_audio_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAnalysis>,
}

impl ComicPage {
    /// Title shown for the active page: the analysis title, else `Page <n>`.
    pub fn display_title(&self) -> String {
        match &self.ai_analysis {
            Some(a) if !a.title.trim().is_empty() => a.title.clone(),
            _ => format!("Page {}", self.page_number),
        }
    }

    pub fn has_narration(&self) -> bool {
        self.narration_audio_source
            .as_deref()
            .is_some_and(|s| !s.trim().is_empty())
    }

    pub fn has_video(&self) -> bool {
        self.content.as_ref().is_some_and(OverlayContent::is_video)
    }
}

/// Persisted scene record.
///
/// `compiled_target_artifact` indexes `pages` by position: the recognizer's target index `i`
/// always refers to `pages[i]`, never to a page with `page_number == i`. Reordering `pages` after
/// compilation invalidates the artifact.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CompiledScene {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "compiledTargetBuffer")]
    pub compiled_target_artifact: Option<String>,
    pub pages: Vec<ComicPage>,
}

impl CompiledScene {
    /// Page bound to recognizer target `target_index`, if in bounds.
    pub fn page_for_target(&self, target_index: usize) -> Option<&ComicPage> {
        self.pages.get(target_index)
    }

    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            page_count: self.pages.len(),
        }
    }

    /// Decode the stored artifact back to bytes.
    pub fn decode_artifact(&self) -> PanelResult<Vec<u8>> {
        let text = self
            .compiled_target_artifact
            .as_deref()
            .ok_or_else(|| PanelError::artifact_decode("scene has no compiled target artifact"))?;
        let bytes = transport::decode_text(text)?;
        if bytes.is_empty() {
            return Err(PanelError::artifact_decode(
                "compiled target artifact is empty",
            ));
        }
        Ok(bytes)
    }

    pub fn validate(&self) -> PanelResult<()> {
        if self.id.trim().is_empty() {
            return Err(PanelError::validation("scene id must be non-empty"));
        }
        if self.pages.is_empty() {
            return Err(PanelError::validation("scene must have at least one page"));
        }
        self.decode_artifact()
            .map_err(|e| PanelError::validation(e.to_string()))?;

        let mut ids = HashSet::new();
        for (idx, page) in self.pages.iter().enumerate() {
            if page.id.trim().is_empty() {
                return Err(PanelError::validation(format!(
                    "page at position {idx} has an empty id"
                )));
            }
            if !ids.insert(page.id.as_str()) {
                return Err(PanelError::validation(format!(
                    "duplicate page id '{}'",
                    page.id
                )));
            }
            if page.page_number == 0 {
                return Err(PanelError::validation(format!(
                    "page '{}' has page number 0 (page numbers are 1-based)",
                    page.id
                )));
            }
            if page.target_image_source.trim().is_empty() {
                return Err(PanelError::validation(format!(
                    "page '{}' has no target image",
                    page.id
                )));
            }
            if let Some(content) = &page.content {
                content.validate()?;
            }
        }
        Ok(())
    }
}

/// Lightweight listing entry returned by scene stores.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub page_count: usize,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
