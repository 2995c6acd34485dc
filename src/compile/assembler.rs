use std::path::Path;

use crate::{
    assets::{loader, transport},
    compile::compiler::{CompiledArtifact, TargetCompiler, compile_targets},
    foundation::error::{PanelError, PanelResult},
    scene::model::{ComicPage, CompiledScene, PageDraft},
};

/// Combine page drafts and a compiled artifact into an immutable [`CompiledScene`].
///
/// Page order is preserved exactly: `pages[i]` is target `i` in `artifact`. Missing page and
/// content ids are filled with fresh UUIDs; the artifact is stored as a data URI.
pub fn assemble(
    name: impl Into<String>,
    drafts: &[PageDraft],
    artifact: &[u8],
) -> PanelResult<CompiledScene> {
    if drafts.is_empty() {
        return Err(PanelError::validation(
            "cannot assemble a scene from zero pages",
        ));
    }
    if artifact.is_empty() {
        return Err(PanelError::validation(
            "cannot assemble a scene without a compiled target artifact",
        ));
    }

    let pages = drafts.iter().map(finalize_page).collect::<Vec<_>>();
    let scene = CompiledScene {
        id: fresh_id(),
        name: name.into(),
        description: format!("{} interactive pages", pages.len()),
        compiled_target_artifact: Some(transport::encode_artifact(artifact)),
        pages,
    };
    scene.validate()?;
    Ok(scene)
}

fn finalize_page(draft: &PageDraft) -> ComicPage {
    let content = draft.content.clone().map(|mut c| {
        if c.id.trim().is_empty() {
            c.id = fresh_id();
        }
        c
    });
    ComicPage {
        id: draft
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(fresh_id),
        page_number: draft.page_number,
        target_image_source: draft.target_image_source.clone(),
        content,
        narration_audio_source: draft.narration_audio_source.clone(),
        ai_analysis: draft.ai_analysis.clone(),
    }
}

fn fresh_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Full authoring pipeline: load target images in draft order, compile them, release the
/// decoded pixels, then assemble the scene.
#[tracing::instrument(skip(name, drafts, root, compiler, on_progress), fields(pages = drafts.len()))]
pub fn compile_scene(
    name: impl Into<String>,
    drafts: &[PageDraft],
    root: &Path,
    compiler: &mut dyn TargetCompiler,
    on_progress: &mut dyn FnMut(u8),
) -> PanelResult<CompiledScene> {
    if drafts.is_empty() {
        return Err(PanelError::validation(
            "cannot compile a scene from zero pages",
        ));
    }

    let sources = drafts
        .iter()
        .map(|d| d.target_image_source.as_str())
        .collect::<Vec<_>>();
    let artifact = {
        let images = loader::load_images(&sources, root)?;
        compile_targets(compiler, &images, on_progress)?
    };
    check_alignment(&artifact, drafts.len())?;

    let scene = assemble(name, drafts, artifact.as_bytes())?;
    tracing::info!(scene = %scene.id, pages = scene.pages.len(), "assembled scene");
    Ok(scene)
}

fn check_alignment(artifact: &CompiledArtifact, pages: usize) -> PanelResult<()> {
    if artifact.target_count() != pages {
        return Err(PanelError::compile(format!(
            "artifact covers {} targets but the scene has {pages} pages",
            artifact.target_count()
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compile/assembler.rs"]
mod tests;
