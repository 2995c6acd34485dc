use std::sync::Arc;

use crate::{
    assets::transport,
    foundation::error::{PanelError, PanelResult},
};

/// Sample rate of synthesized narration (16-bit mono PCM).
pub const NARRATION_SAMPLE_RATE: u32 = 24_000;

/// Decoded narration ready for playback: mono `f32` samples in `[-1.0, 1.0]`.
#[derive(Clone, Debug, PartialEq)]
pub struct NarrationClip {
    pub sample_rate: u32,
    pub samples: Arc<Vec<f32>>,
}

impl NarrationClip {
    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Convert little-endian signed 16-bit PCM to `f32` via `sample / 32768.0`.
///
/// A trailing odd byte is not a whole sample and is dropped.
pub fn pcm16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|c| f32::from(i16::from_le_bytes([c[0], c[1]])) / 32768.0)
        .collect()
}

/// Decode a base64 narration payload (optionally a data URI) into a clip.
pub fn decode_narration(encoded: &str, sample_rate: u32) -> PanelResult<NarrationClip> {
    if sample_rate == 0 {
        return Err(PanelError::validation("narration sample rate must be > 0"));
    }
    let bytes = transport::decode_text(encoded)
        .map_err(|e| PanelError::validation(format!("narration payload: {e}")))?;
    Ok(NarrationClip {
        sample_rate,
        samples: Arc::new(pcm16le_to_f32(&bytes)),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/audio/pcm.rs"]
mod tests;
