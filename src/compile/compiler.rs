use crate::{
    assets::loader::{DecodedImage, DecodedImageSet},
    foundation::error::{PanelError, PanelResult},
};

/// Black-box image target compiler.
///
/// Implementations index targets by their position in `images`. `export_data` returns one
/// contiguous buffer encoding all targets; its layout is opaque to the rest of the crate.
pub trait TargetCompiler {
    /// Extract features for every image, reporting progress in percent (`0..=100`).
    fn compile_image_targets(
        &mut self,
        images: &[DecodedImage],
        on_progress: &mut dyn FnMut(f64),
    ) -> PanelResult<()>;

    /// Serialize the compiled targets.
    fn export_data(&mut self) -> PanelResult<Vec<u8>>;
}

/// Binary artifact produced by [`compile_targets`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompiledArtifact {
    bytes: Vec<u8>,
    target_count: usize,
}

impl CompiledArtifact {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of images the artifact was compiled from.
    pub fn target_count(&self) -> usize {
        self.target_count
    }
}

/// Forwards compiler progress as whole percents, never decreasing, ending at exactly one `100`.
struct ProgressGate<'a> {
    sink: &'a mut dyn FnMut(u8),
    last: Option<u8>,
}

impl<'a> ProgressGate<'a> {
    fn new(sink: &'a mut dyn FnMut(u8)) -> Self {
        Self { sink, last: None }
    }

    fn report(&mut self, percent: f64) {
        if !percent.is_finite() {
            return;
        }
        let v = percent.clamp(0.0, 100.0).round() as u8;
        if self.last.is_some_and(|last| v <= last) {
            return;
        }
        self.last = Some(v);
        (self.sink)(v);
    }

    fn finish(&mut self) {
        self.report(100.0);
    }
}

/// Compile `images` into a single artifact through `compiler`.
///
/// Structural checks only: the image set must be non-empty and the exported buffer must be
/// non-empty. Content quality (texture, near-duplicates) is the compiler's business; its
/// rejections surface as [`PanelError::Compile`].
#[tracing::instrument(skip_all, fields(targets = images.len()))]
pub fn compile_targets(
    compiler: &mut dyn TargetCompiler,
    images: &DecodedImageSet,
    on_progress: &mut dyn FnMut(u8),
) -> PanelResult<CompiledArtifact> {
    if images.is_empty() {
        return Err(PanelError::compile("no target images to compile"));
    }

    let mut gate = ProgressGate::new(on_progress);
    compiler
        .compile_image_targets(images.images(), &mut |p| gate.report(p))
        .map_err(into_compile_failure)?;
    let bytes = compiler.export_data().map_err(into_compile_failure)?;
    if bytes.is_empty() {
        return Err(PanelError::compile("compiler exported an empty artifact"));
    }
    gate.finish();

    tracing::info!(bytes = bytes.len(), "compiled image targets");
    Ok(CompiledArtifact {
        bytes,
        target_count: images.len(),
    })
}

fn into_compile_failure(e: PanelError) -> PanelError {
    match e {
        e @ PanelError::Compile(_) => e,
        other => PanelError::compile(other.to_string()),
    }
}

const MAGIC: &[u8; 4] = b"PCT1";
const HEADER_LEN: usize = 12;

/// Options for the built-in [`DescriptorCompiler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CompileOpts {
    /// Side of the difference-hash grid. Descriptors are `side * side` bits.
    pub descriptor_side: u32,
}

impl Default for CompileOpts {
    fn default() -> Self {
        Self { descriptor_side: 16 }
    }
}

impl CompileOpts {
    pub const MIN_DESCRIPTOR_SIDE: u32 = 2;
    pub const MAX_DESCRIPTOR_SIDE: u32 = 256;

    pub fn validate(&self) -> PanelResult<()> {
        let side = self.descriptor_side;
        if !(Self::MIN_DESCRIPTOR_SIDE..=Self::MAX_DESCRIPTOR_SIDE).contains(&side) {
            return Err(PanelError::validation(format!(
                "descriptor_side must be in {}..={}, got {side}",
                Self::MIN_DESCRIPTOR_SIDE,
                Self::MAX_DESCRIPTOR_SIDE
            )));
        }
        Ok(())
    }
}

/// Deterministic reference compiler.
///
/// Each target becomes a difference-hash descriptor of its downscaled luma plus its dimensions.
/// This is enough to detect indistinguishable targets and to give the runtime a well-formed,
/// index-aligned artifact; it is not a feature matcher.
///
/// Layout: `b"PCT1"`, `u32 LE` target count, `u32 LE` descriptor length, then per target
/// `u32 LE` width, `u32 LE` height and the descriptor bytes.
#[derive(Debug, Default)]
pub struct DescriptorCompiler {
    opts: CompileOpts,
    targets: Vec<TargetDescriptor>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetDescriptor {
    pub width: u32,
    pub height: u32,
    pub descriptor: Vec<u8>,
}

impl DescriptorCompiler {
    pub fn new(opts: CompileOpts) -> Self {
        Self {
            opts,
            targets: Vec::new(),
        }
    }

    fn describe(&self, img: &DecodedImage) -> PanelResult<TargetDescriptor> {
        let side = self.opts.descriptor_side;
        let small = image::imageops::resize(
            img.luma(),
            side + 1,
            side,
            image::imageops::FilterType::Triangle,
        );

        let bits = (side as usize) * (side as usize);
        let mut descriptor = vec![0u8; bits.div_ceil(8)];
        let mut bit = 0usize;
        for y in 0..side {
            for x in 0..side {
                let left = small.get_pixel(x, y).0[0];
                let right = small.get_pixel(x + 1, y).0[0];
                if left < right {
                    descriptor[bit / 8] |= 1 << (bit % 8);
                }
                bit += 1;
            }
        }
        Ok(TargetDescriptor {
            width: img.width(),
            height: img.height(),
            descriptor,
        })
    }
}

impl TargetCompiler for DescriptorCompiler {
    fn compile_image_targets(
        &mut self,
        images: &[DecodedImage],
        on_progress: &mut dyn FnMut(f64),
    ) -> PanelResult<()> {
        self.opts.validate()?;
        self.targets.clear();
        let total = images.len().max(1) as f64;
        for (idx, img) in images.iter().enumerate() {
            let target = self.describe(img)?;
            if let Some(dup) = self.targets.iter().position(|t| *t == target) {
                self.targets.clear();
                return Err(PanelError::compile(format!(
                    "targets {dup} and {idx} are indistinguishable; use distinct images"
                )));
            }
            self.targets.push(target);
            on_progress((idx + 1) as f64 / total * 100.0);
        }
        Ok(())
    }

    fn export_data(&mut self) -> PanelResult<Vec<u8>> {
        if self.targets.is_empty() {
            return Err(PanelError::compile("nothing compiled"));
        }
        let desc_len = self.targets[0].descriptor.len();
        let mut out = Vec::with_capacity(HEADER_LEN + self.targets.len() * (8 + desc_len));
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(self.targets.len() as u32).to_le_bytes());
        out.extend_from_slice(&(desc_len as u32).to_le_bytes());
        for t in &self.targets {
            out.extend_from_slice(&t.width.to_le_bytes());
            out.extend_from_slice(&t.height.to_le_bytes());
            out.extend_from_slice(&t.descriptor);
        }
        Ok(out)
    }
}

/// Parsed view of a [`DescriptorCompiler`] artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetIndex {
    pub targets: Vec<TargetDescriptor>,
}

impl TargetIndex {
    pub fn parse(bytes: &[u8]) -> PanelResult<Self> {
        if bytes.len() < HEADER_LEN || &bytes[..4] != MAGIC {
            return Err(PanelError::artifact_decode("not a PCT1 target artifact"));
        }
        let count = read_u32(bytes, 4) as usize;
        let desc_len = read_u32(bytes, 8) as usize;
        let stride = 8 + desc_len;
        let expected = count
            .checked_mul(stride)
            .and_then(|n| n.checked_add(HEADER_LEN))
            .ok_or_else(|| PanelError::artifact_decode("target artifact header overflows"))?;
        if bytes.len() != expected {
            return Err(PanelError::artifact_decode(format!(
                "target artifact length {} does not match header (expected {expected})",
                bytes.len()
            )));
        }

        let targets = bytes[HEADER_LEN..]
            .chunks_exact(stride)
            .map(|chunk| TargetDescriptor {
                width: read_u32(chunk, 0),
                height: read_u32(chunk, 4),
                descriptor: chunk[8..].to_vec(),
            })
            .collect();
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
