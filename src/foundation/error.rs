/// Convenience result type used across panelcast.
pub type PanelResult<T> = Result<T, PanelError>;

/// Top-level error taxonomy for the compile pipeline and the recognition runtime.
#[derive(thiserror::Error, Debug)]
pub enum PanelError {
    /// Invalid authored data (empty page set, missing artifact, bad ids).
    #[error("validation error: {0}")]
    Validation(String),

    /// A target image could not be fetched or decoded. Fatal to the in-progress compile.
    #[error("load failure for '{source_ref}': {cause}")]
    Load {
        /// The offending image source reference (path or truncated data URI).
        source_ref: String,
        /// Human-readable decode/fetch cause.
        cause: String,
    },

    /// The target compiler rejected its input (usually duplicate or low-feature images).
    #[error("compile failure: {0}")]
    Compile(String),

    /// A stored artifact is corrupt or missing.
    #[error("artifact decode failure: {0}")]
    ArtifactDecode(String),

    /// Camera, permission or engine runtime failure.
    #[error("engine error: {0}")]
    Engine(String),

    /// Analysis or speech synthesis failed. Callers recover locally.
    #[error("content generation failure: {0}")]
    ContentGeneration(String),

    /// Scene store failure.
    #[error("store error: {0}")]
    Store(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PanelError {
    /// Build a [`PanelError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PanelError::Load`] value.
    pub fn load(source_ref: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Load {
            source_ref: source_ref.into(),
            cause: cause.into(),
        }
    }

    /// Build a [`PanelError::Compile`] value.
    pub fn compile(msg: impl Into<String>) -> Self {
        Self::Compile(msg.into())
    }

    /// Build a [`PanelError::ArtifactDecode`] value.
    pub fn artifact_decode(msg: impl Into<String>) -> Self {
        Self::ArtifactDecode(msg.into())
    }

    /// Build a [`PanelError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`PanelError::ContentGeneration`] value.
    pub fn content_generation(msg: impl Into<String>) -> Self {
        Self::ContentGeneration(msg.into())
    }

    /// Build a [`PanelError::Store`] value.
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Build a [`PanelError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the failure is one the user fixes by editing input and retrying.
    pub fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Load { .. } | Self::Compile(_)
        )
    }
}

impl From<serde_json::Error> for PanelError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
