//! Scene data model and authoring surfaces.

/// Builder for authoring scenes page by page.
pub mod dsl;
/// JSON manifest input for the CLI.
pub mod manifest;
/// Persisted records: pages, overlays and compiled scenes.
pub mod model;
