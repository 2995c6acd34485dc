//! Per-page side effects of recognition: narration and video playback.

pub mod controller;
pub mod video;
