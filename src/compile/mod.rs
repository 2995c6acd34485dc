//! Authoring pipeline: images to target artifact, artifact plus pages to [`CompiledScene`].
//!
//! [`CompiledScene`]: crate::scene::model::CompiledScene

/// Scene assembly and the end-to-end `compile_scene` pipeline.
pub mod assembler;
/// Target compiler seam, progress gating and the built-in descriptor compiler.
pub mod compiler;
