//! Best-effort page enrichment through an external content-generation service.
//!
//! Nothing here is fatal. Analysis failures fall back to a placeholder, speech synthesis
//! failures just leave the page without narration.

use crate::{
    foundation::error::{PanelError, PanelResult},
    scene::model::{AiAnalysis, PageDraft},
};

pub const PLACEHOLDER_TITLE: &str = "New Comic Scene";
pub const PLACEHOLDER_DESCRIPTION: &str = "Auto-analysis failed. Please add details manually.";

/// Structured analysis of one target image.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PageAnalysis {
    pub title: String,
    pub description: String,
    /// Short voice-over script; empty when none was produced.
    pub narration_script: String,
}

impl PageAnalysis {
    pub fn placeholder() -> Self {
        Self {
            title: PLACEHOLDER_TITLE.to_string(),
            description: PLACEHOLDER_DESCRIPTION.to_string(),
            narration_script: String::new(),
        }
    }
}

/// External content-generation service.
pub trait ContentGenerator {
    /// Title, one-sentence description and narration script for an encoded target image.
    fn analyze(&mut self, image: &[u8]) -> PanelResult<PageAnalysis>;

    /// Raw 16-bit mono PCM at 24 kHz, base64 encoded. `Ok(None)` when the service returned no
    /// audio.
    fn synthesize_speech(&mut self, text: &str) -> PanelResult<Option<String>>;
}

/// Generator used when no service is configured; every call fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnavailableContentGenerator;

impl ContentGenerator for UnavailableContentGenerator {
    fn analyze(&mut self, _image: &[u8]) -> PanelResult<PageAnalysis> {
        Err(PanelError::content_generation(
            "no content generation service configured",
        ))
    }

    fn synthesize_speech(&mut self, _text: &str) -> PanelResult<Option<String>> {
        Err(PanelError::content_generation(
            "no content generation service configured",
        ))
    }
}

/// Parse a model's JSON answer, tolerating markdown code fences around it.
pub fn parse_analysis_response(text: &str) -> PanelResult<PageAnalysis> {
    let mut body = text.trim();
    if let Some(rest) = body.strip_prefix("```json") {
        body = rest;
    } else if let Some(rest) = body.strip_prefix("```") {
        body = rest;
    }
    body = body.trim();
    if let Some(rest) = body.strip_suffix("```") {
        body = rest.trim_end();
    }
    if body.is_empty() {
        return Err(PanelError::content_generation("empty analysis response"));
    }
    serde_json::from_str(body)
        .map_err(|e| PanelError::content_generation(format!("parse analysis response: {e}")))
}

pub fn analyze_or_placeholder(generator: &mut dyn ContentGenerator, image: &[u8]) -> PageAnalysis {
    match generator.analyze(image) {
        Ok(analysis) => analysis,
        Err(e) => {
            tracing::warn!(error = %e, "page analysis failed; using placeholder");
            PageAnalysis::placeholder()
        }
    }
}

/// Synthesized narration for `script`, or `None` on an empty script, no audio, or failure.
pub fn narration_or_none(generator: &mut dyn ContentGenerator, script: &str) -> Option<String> {
    if script.trim().is_empty() {
        return None;
    }
    match generator.synthesize_speech(script) {
        Ok(Some(audio)) if !audio.trim().is_empty() => Some(audio),
        Ok(_) => None,
        Err(e) => {
            tracing::warn!(error = %e, "speech synthesis failed; page keeps no narration");
            None
        }
    }
}

/// Fill `ai_analysis` and, when a script is available, narration on `draft`.
///
/// Fields already authored on the draft are kept.
pub fn enrich_draft(generator: &mut dyn ContentGenerator, draft: &mut PageDraft, image: &[u8]) {
    let analysis = analyze_or_placeholder(generator, image);
    if draft.ai_analysis.is_none() {
        draft.ai_analysis = Some(AiAnalysis {
            title: analysis.title.clone(),
            description: analysis.description.clone(),
        });
    }
    if draft.narration_audio_source.is_none() {
        draft.narration_audio_source = narration_or_none(generator, &analysis.narration_script);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/mod.rs"]
mod tests;
