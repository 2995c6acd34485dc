//! Narration audio: PCM decoding and the output device seam.

pub mod output;
pub mod pcm;
