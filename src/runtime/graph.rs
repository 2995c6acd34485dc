use std::fmt::Write as _;

use crate::{
    foundation::core::Vec3,
    scene::model::{CompiledScene, ContentKind},
};

/// Declarative scene graph handed to the recognition engine.
///
/// One [`TrackingEntity`] per page, in page order, so that `entities[i].target_index == i`.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneGraph {
    pub assets: Vec<GraphAsset>,
    pub entities: Vec<TrackingEntity>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphAsset {
    pub id: String,
    pub kind: ContentKind,
    pub source_ref: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TrackingEntity {
    pub id: String,
    pub target_index: usize,
    /// Visible overlay. `None` for pages without content (and for audio-only content).
    pub child: Option<EntityChild>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EntityChild {
    pub asset_id: String,
    pub shape: ChildShape,
    pub scale: Vec3,
    pub position: Vec3,
    pub rotation: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChildShape {
    /// glTF model spinning about Y once every `spin_period_ms`.
    Model { spin_period_ms: u32 },
    /// Looping video on a plane.
    VideoPlane { width: f64, height: f64 },
    ImagePlane { width: f64, height: f64, opacity: f64 },
}

const MODEL_SPIN_PERIOD_MS: u32 = 10_000;
const VIDEO_PLANE: (f64, f64) = (1.0, 0.552);
const IMAGE_OPACITY: f64 = 0.9;

pub fn asset_id(target_index: usize) -> String {
    format!("asset-page-{target_index}")
}

pub fn entity_id(target_index: usize) -> String {
    format!("target-{target_index}")
}

impl SceneGraph {
    pub fn build(scene: &CompiledScene) -> Self {
        let mut assets = Vec::new();
        let mut entities = Vec::with_capacity(scene.pages.len());

        for (idx, page) in scene.pages.iter().enumerate() {
            let child = page.content.as_ref().and_then(|c| {
                let shape = match c.kind {
                    ContentKind::Model3d => ChildShape::Model {
                        spin_period_ms: MODEL_SPIN_PERIOD_MS,
                    },
                    ContentKind::Video => ChildShape::VideoPlane {
                        width: VIDEO_PLANE.0,
                        height: VIDEO_PLANE.1,
                    },
                    ContentKind::Image => ChildShape::ImagePlane {
                        width: 1.0,
                        height: 1.0,
                        opacity: IMAGE_OPACITY,
                    },
                    ContentKind::Audio => return None,
                };
                assets.push(GraphAsset {
                    id: asset_id(idx),
                    kind: c.kind,
                    source_ref: c.source_ref.clone(),
                });
                Some(EntityChild {
                    asset_id: asset_id(idx),
                    shape,
                    scale: c.scale,
                    position: c.position,
                    rotation: c.rotation,
                })
            });
            entities.push(TrackingEntity {
                id: entity_id(idx),
                target_index: idx,
                child,
            });
        }

        Self { assets, entities }
    }

    pub fn target_count(&self) -> usize {
        self.entities.len()
    }

    pub fn entity(&self, target_index: usize) -> Option<&TrackingEntity> {
        self.entities.get(target_index)
    }

    /// A-Frame style markup of the graph, bound to the artifact at `artifact_uri`.
    pub fn to_markup(&self, artifact_uri: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "<a-scene mindar-image=\"imageTargetSrc: {}\">",
            escape_attr(artifact_uri)
        );
        out.push_str("  <a-assets>\n");
        for a in &self.assets {
            let (id, src) = (escape_attr(&a.id), escape_attr(&a.source_ref));
            let _ = match a.kind {
                ContentKind::Video => writeln!(
                    out,
                    "    <video id=\"{id}\" src=\"{src}\" loop=\"true\" preload=\"auto\" playsinline></video>"
                ),
                ContentKind::Image => {
                    writeln!(out, "    <img id=\"{id}\" src=\"{src}\">")
                }
                ContentKind::Model3d | ContentKind::Audio => writeln!(
                    out,
                    "    <a-asset-item id=\"{id}\" src=\"{src}\"></a-asset-item>"
                ),
            };
        }
        out.push_str("  </a-assets>\n");

        for e in &self.entities {
            let _ = write!(
                out,
                "  <a-entity mindar-image-target=\"targetIndex: {}\" id=\"{}\">",
                e.target_index,
                escape_attr(&e.id)
            );
            if let Some(c) = &e.child {
                out.push_str("\n    ");
                let common = format!(
                    "src=\"#{}\" position=\"{}\" rotation=\"{}\" scale=\"{}\"",
                    escape_attr(&c.asset_id),
                    c.position,
                    c.rotation,
                    c.scale
                );
                let _ = match c.shape {
                    ChildShape::Model { spin_period_ms } => write!(
                        out,
                        "<a-gltf-model {common} animation=\"property: rotation; to: 0 360 0; loop: true; dur: {spin_period_ms}; easing: linear\"></a-gltf-model>"
                    ),
                    ChildShape::VideoPlane { width, height } => write!(
                        out,
                        "<a-video {common} width=\"{width}\" height=\"{height}\"></a-video>"
                    ),
                    ChildShape::ImagePlane {
                        width,
                        height,
                        opacity,
                    } => write!(
                        out,
                        "<a-image {common} width=\"{width}\" height=\"{height}\" opacity=\"{opacity}\"></a-image>"
                    ),
                };
                out.push_str("\n  ");
            }
            out.push_str("</a-entity>\n");
        }
        out.push_str("</a-scene>\n");
        out
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/runtime/graph.rs"]
mod tests;
