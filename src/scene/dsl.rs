use crate::{
    foundation::error::{PanelError, PanelResult},
    scene::model::{AiAnalysis, OverlayContent, PageDraft},
};

/// Builder for the ordered page list of a scene under authoring.
///
/// Page numbers are assigned at append time as `current page count + 1`. Removing a page does not
/// renumber the remaining pages; the compiled artifact is indexed by position anyway.
#[derive(Clone, Debug)]
pub struct SceneBuilder {
    name: String,
    pages: Vec<PageDraft>,
}

impl SceneBuilder {
    /// Create a builder for a new scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pages: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn pages(&self) -> &[PageDraft] {
        &self.pages
    }

    /// Append a finished page. Returns the assigned page number.
    pub fn push_page(&mut self, page: PageBuilder) -> PanelResult<u32> {
        let page_number = u32::try_from(self.pages.len() + 1)
            .map_err(|_| PanelError::validation("too many pages"))?;
        let draft = page.finish(page_number)?;
        self.pages.push(draft);
        Ok(page_number)
    }

    /// Remove a page by id. Returns whether a page was removed.
    pub fn remove_page(&mut self, id: &str) -> bool {
        let before = self.pages.len();
        self.pages.retain(|p| p.id.as_deref() != Some(id));
        before != self.pages.len()
    }

    /// Consume the builder into `(name, drafts)` ready for compilation.
    pub fn build(self) -> PanelResult<(String, Vec<PageDraft>)> {
        if self.pages.is_empty() {
            return Err(PanelError::validation("scene must have at least one page"));
        }
        if self.name.trim().is_empty() {
            return Err(PanelError::validation("scene name must be non-empty"));
        }
        Ok((self.name, self.pages))
    }
}

/// Builder for one page. The target image is required; everything else is optional.
#[derive(Clone, Debug, Default)]
pub struct PageBuilder {
    target_image_source: Option<String>,
    content: Option<OverlayContent>,
    narration_audio_source: Option<String>,
    ai_analysis: Option<AiAnalysis>,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_image(mut self, source: impl Into<String>) -> Self {
        self.target_image_source = Some(source.into());
        self
    }

    /// Set the overlay. A page holds at most one; a later call replaces the earlier one.
    pub fn content(mut self, content: OverlayContent) -> Self {
        self.content = Some(content);
        self
    }

    pub fn clear_content(mut self) -> Self {
        self.content = None;
        self
    }

    pub fn narration(mut self, encoded_audio: impl Into<String>) -> Self {
        self.narration_audio_source = Some(encoded_audio.into());
        self
    }

    pub fn analysis(mut self, title: impl Into<String>, description: impl Into<String>) -> Self {
        self.ai_analysis = Some(AiAnalysis {
            title: title.into(),
            description: description.into(),
        });
        self
    }

    fn finish(self, page_number: u32) -> PanelResult<PageDraft> {
        let target_image_source = self
            .target_image_source
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| PanelError::validation("page requires a target image"))?;
        if let Some(c) = &self.content {
            c.validate()?;
        }
        Ok(PageDraft {
            id: Some(uuid::Uuid::new_v4().to_string()),
            page_number,
            target_image_source,
            content: self.content,
            narration_audio_source: self.narration_audio_source,
            ai_analysis: self.ai_analysis,
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/dsl.rs"]
mod tests;
