use std::{fs::File, io::BufReader, path::Path, time::Duration};

use crate::{
    audio::pcm::NARRATION_SAMPLE_RATE,
    compile::compiler::CompileOpts,
    foundation::error::{PanelError, PanelResult},
};

/// Options controlling a `RecognitionRuntime` session.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionOpts {
    /// How long after mount the runtime waits for an explicit `Loaded` event before asking the
    /// engine whether it loaded anyway.
    pub loaded_grace_period_ms: u64,
    /// Sample rate of narration payloads and of the audio output context.
    pub narration_sample_rate: u32,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            loaded_grace_period_ms: 3_000,
            narration_sample_rate: NARRATION_SAMPLE_RATE,
        }
    }
}

impl SessionOpts {
    pub fn loaded_grace_period(&self) -> Duration {
        Duration::from_millis(self.loaded_grace_period_ms)
    }
}

/// Top-level configuration file. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub compile: CompileOpts,
    pub session: SessionOpts,
}

impl PanelConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> PanelResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| PanelError::validation(format!("parse config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> PanelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PanelError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn validate(&self) -> PanelResult<()> {
        self.compile.validate()?;
        if self.session.narration_sample_rate == 0 {
            return Err(PanelError::validation(
                "session.narration_sample_rate must be > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
