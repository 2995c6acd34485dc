//! Recognition runtime: one session per compiled scene, driven by engine events.

/// Recognition engine seam and a scripted engine.
pub mod engine;
/// Declarative scene graph built from a compiled scene.
pub mod graph;
/// Session state machine and release sequence.
pub mod session;
