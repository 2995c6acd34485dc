use std::{fs::File, io::BufReader, path::Path};

use crate::{
    foundation::core::Vec3,
    foundation::error::{PanelError, PanelResult},
    scene::{
        dsl::{PageBuilder, SceneBuilder},
        model::{ContentKind, OverlayContent, PageDraft},
    },
};

/// Hand-written scene description, the input of `panelcast compile`.
///
/// ```json
/// {
///   "name": "My AR comic",
///   "pages": [{
///     "targetImageSrc": "pages/01.png",
///     "content": { "type": "MODEL_3D", "src": "models/hero.gltf", "scale": { "x": 0.005, "y": 0.005, "z": 0.005 } },
///     "title": "The Beginning",
///     "description": "A 3D model demo scene."
///   }]
/// }
/// ```
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SceneManifest {
    pub name: String,
    pub pages: Vec<ManifestPage>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestPage {
    /// Informational only; page numbers are reassigned densely in list order.
    #[serde(default)]
    pub page_number: Option<u32>,
    #[serde(rename = "targetImageSrc")]
    pub target_image_source: String,
    #[serde(default)]
    pub content: Option<ManifestContent>,
    #[serde(default, rename = "narrationAudioSrc")]
    pub narration_audio_source: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ManifestContent {
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub src: String,
    #[serde(default)]
    pub scale: Option<Vec3>,
    #[serde(default)]
    pub position: Option<Vec3>,
    #[serde(default)]
    pub rotation: Option<Vec3>,
}

impl ManifestContent {
    fn to_overlay(&self) -> OverlayContent {
        let mut c = OverlayContent::new(self.kind, self.src.clone());
        if let Some(scale) = self.scale {
            c.scale = scale;
        }
        if let Some(position) = self.position {
            c.position = position;
        }
        if let Some(rotation) = self.rotation {
            c.rotation = rotation;
        }
        c
    }
}

impl SceneManifest {
    pub fn from_reader<R: std::io::Read>(r: R) -> PanelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| PanelError::validation(format!("parse scene manifest JSON: {e}")))
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PanelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PanelError::validation(format!("open scene manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Authored page drafts in manifest order.
    pub fn into_drafts(self) -> PanelResult<(String, Vec<PageDraft>)> {
        let mut builder = SceneBuilder::new(self.name);
        for (idx, page) in self.pages.into_iter().enumerate() {
            let mut pb = PageBuilder::new().target_image(page.target_image_source);
            if let Some(content) = &page.content {
                pb = pb.content(content.to_overlay());
            }
            if let Some(audio) = page.narration_audio_source.filter(|s| !s.trim().is_empty()) {
                pb = pb.narration(audio);
            }
            if page.title.is_some() || page.description.is_some() {
                pb = pb.analysis(
                    page.title.unwrap_or_else(|| format!("Page {}", idx + 1)),
                    page.description.unwrap_or_default(),
                );
            }
            let assigned = builder.push_page(pb)?;
            if let Some(declared) = page.page_number.filter(|n| *n != assigned) {
                tracing::warn!(
                    declared,
                    assigned,
                    "manifest page number ignored; pages are numbered in order"
                );
            }
        }
        builder.build()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/manifest.rs"]
mod tests;
