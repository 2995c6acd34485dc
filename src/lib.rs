//! panelcast turns multi-page comic scenes into image-target artifacts and drives AR overlays from
//! recognition events.
//!
//! Two halves:
//!
//! - Authoring: build page drafts ([`SceneBuilder`] or a [`SceneManifest`]), then
//!   [`compile_scene`] loads the target images, compiles them through a [`TargetCompiler`] and
//!   assembles an immutable [`CompiledScene`] for a [`SceneStore`].
//! - Experience: a [`RecognitionRuntime`] mounts a compiled scene on a [`RecognitionEngine`] and
//!   routes its found/lost events to narration and video playback, releasing every resource on
//!   teardown.
//!
//! Recognizer target `i` always means `scene.pages[i]`.
#![forbid(unsafe_code)]

pub mod assets;
pub mod audio;
pub mod compile;
pub mod config;
pub mod content;
pub mod foundation;
pub mod lifecycle;
pub mod overlay;
pub mod runtime;
pub mod scene;
pub mod store;

pub use crate::audio::output::{AudioOutput, PlaybackId, RecordingAudioOutput};
pub use crate::audio::pcm::{NarrationClip, decode_narration, pcm16le_to_f32};
pub use crate::compile::assembler::{assemble, compile_scene};
pub use crate::compile::compiler::{
    CompileOpts, CompiledArtifact, DescriptorCompiler, TargetCompiler, TargetIndex,
    compile_targets,
};
pub use crate::config::{PanelConfig, SessionOpts};
pub use crate::content::{ContentGenerator, PageAnalysis, UnavailableContentGenerator};
pub use crate::foundation::core::Vec3;
pub use crate::foundation::error::{PanelError, PanelResult};
pub use crate::lifecycle::{AudioContextSlot, HandleRegistry, ObjectHandle, ResourceScope};
pub use crate::overlay::controller::{
    OverlayController, RecognitionSession, should_restart_narration,
};
pub use crate::overlay::video::{RecordingVideoControl, VideoControl};
pub use crate::runtime::engine::{EngineEvent, RecognitionEngine, ScriptedEngine, Subscription};
pub use crate::runtime::graph::SceneGraph;
pub use crate::runtime::session::{RecognitionRuntime, RuntimeState};
pub use crate::scene::dsl::{PageBuilder, SceneBuilder};
pub use crate::scene::manifest::SceneManifest;
pub use crate::scene::model::{
    AiAnalysis, ComicPage, CompiledScene, ContentKind, OverlayContent, PageDraft, SceneSummary,
};
pub use crate::store::{FsSceneStore, InMemorySceneStore, SceneStore};
